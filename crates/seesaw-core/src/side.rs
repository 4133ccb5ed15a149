//! Long/short side identity and per-side valuation ledger.

use crate::decimal::{floor_scaled, Price, Shares, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two sides of a leveraged pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// Returns the opposite side.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Long => Self::Short,
            Self::Short => Self::Long,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => write!(f, "long"),
            Self::Short => write!(f, "short"),
        }
    }
}

/// Valuation of one pool side: total collateral value and outstanding
/// share supply. The per-share price is derived, never stored.
///
/// A wiped-out side keeps its supply with value zero, so its share price
/// reads zero until fresh value is minted in. A mint into a side whose
/// share price is zero (fresh pool, or wiped) issues shares 1:1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideLedger {
    value: Value,
    supply: Shares,
}

impl SideLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(value: Value, supply: Shares) -> Self {
        Self { value, supply }
    }

    #[inline]
    pub fn value(&self) -> Value {
        self.value
    }

    #[inline]
    pub fn supply(&self) -> Shares {
        self.supply
    }

    /// Derived per-share price, floored to the pool scale.
    ///
    /// Zero supply reads as price zero; callers minting into that state
    /// use the 1:1 bootstrap rule instead of dividing.
    #[must_use]
    pub fn share_price(&self) -> Price {
        if self.supply.is_zero() {
            return Price::ZERO;
        }
        match self.value.inner().checked_div(self.supply.inner()) {
            Some(px) => Price::new(floor_scaled(px)),
            None => Price::ZERO,
        }
    }

    /// Replace the side's value with a settled amount.
    pub fn set_value(&mut self, value: Value) {
        self.value = value;
    }

    /// Add `amount` of collateral and issue shares at the current share
    /// price (1:1 when the price is zero). Returns the shares issued, or
    /// `None` on arithmetic overflow.
    pub fn mint(&mut self, amount: Value) -> Option<Shares> {
        let px = self.share_price();
        let issue_px = if px.is_positive() { px } else { Price::ONE };
        let issued = amount.to_shares_at(issue_px)?;
        self.value = self.value.checked_add(amount)?;
        self.supply = self.supply + issued;
        Some(issued)
    }

    /// Remove `shares` from supply and deduct their redemption value,
    /// floored and clamped at the side's full value. Returns the value
    /// redeemed, or `None` on arithmetic overflow.
    pub fn burn(&mut self, shares: Shares) -> Option<Value> {
        let burned = shares.min(self.supply);
        let redemption = burned.redeem_at(self.share_price())?.min(self.value);
        self.supply = self.supply.saturating_sub(burned);
        self.value = self.value.saturating_sub(redemption);
        Some(redemption)
    }
}
