//! Precision-safe decimal types for pool accounting.
//!
//! Uses `rust_decimal` for exact decimal arithmetic. All pool quantities
//! carry a fixed scale of [`VALUE_SCALE`] decimal places, and every
//! operation that can lose precision rounds DOWN to that scale so that
//! repeated settlement can never create value out of rounding.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Number of decimal places carried by all pool quantities.
pub const VALUE_SCALE: u32 = 8;

/// Truncate a decimal to [`VALUE_SCALE`] places, rounding toward zero.
///
/// Pool quantities are non-negative, so toward-zero is a floor.
#[inline]
#[must_use]
pub fn floor_scaled(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(VALUE_SCALE, RoundingStrategy::ToZero)
}

/// Raise a price ratio to a small integer power by repeated multiplication.
///
/// Returns `None` on overflow. Leverage exponents are single digits in
/// practice, so the loop is cheaper than a general pow and keeps the
/// arithmetic checked end to end.
#[must_use]
pub fn ratio_pow(base: Decimal, exp: u32) -> Option<Decimal> {
    let mut acc = Decimal::ONE;
    for _ in 0..exp {
        acc = acc.checked_mul(base)?;
    }
    Some(acc)
}

/// Reference price with exact decimal precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);
    pub const ONE: Self = Self(Decimal::ONE);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Ratio of this price over a base price.
    ///
    /// Returns `None` when the base is not strictly positive.
    #[inline]
    pub fn ratio_over(&self, base: Price) -> Option<Decimal> {
        if !base.is_positive() {
            return None;
        }
        self.0.checked_div(base.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Price {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

/// Collateral value held by a pool side, or committed by a user.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Value(pub Decimal);

impl Value {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    #[inline]
    pub fn min(self, other: Value) -> Value {
        Self(self.0.min(other.0))
    }

    #[inline]
    pub fn checked_add(self, other: Value) -> Option<Value> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Subtract, clamping at zero. Used where a deduction has already been
    /// capped at the side's full value and floor dust must not go negative.
    #[inline]
    pub fn saturating_sub(self, other: Value) -> Value {
        let diff = self.0 - other.0;
        if diff.is_sign_negative() {
            Self::ZERO
        } else {
            Self(diff)
        }
    }

    /// Multiply by a raw factor, flooring the result to [`VALUE_SCALE`].
    #[inline]
    pub fn mul_floor(self, factor: Decimal) -> Option<Value> {
        self.0.checked_mul(factor).map(floor_scaled).map(Self)
    }

    /// Shares issued for this value at a given per-share price, floored.
    #[inline]
    pub fn to_shares_at(self, price: Price) -> Option<Shares> {
        self.0
            .checked_div(price.0)
            .map(floor_scaled)
            .map(Shares::new)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Value {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Value {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Value {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

/// Outstanding pool-share supply, or a share quantity in a burn request.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Shares(pub Decimal);

impl Shares {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn min(self, other: Shares) -> Shares {
        Self(self.0.min(other.0))
    }

    #[inline]
    pub fn saturating_sub(self, other: Shares) -> Shares {
        let diff = self.0 - other.0;
        if diff.is_sign_negative() {
            Self::ZERO
        } else {
            Self(diff)
        }
    }

    /// Redemption value of these shares at a per-share price, floored.
    #[inline]
    pub fn redeem_at(self, price: Price) -> Option<Value> {
        self.0.checked_mul(price.0).map(floor_scaled).map(Value::new)
    }
}

impl fmt::Display for Shares {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Shares {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Shares {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Shares {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Shares {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}
