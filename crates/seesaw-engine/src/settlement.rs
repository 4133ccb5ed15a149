//! Interval settlement: leveraged value transfer and fee accrual.
//!
//! Each settlement consumes one (old price, new price, elapsed) record
//! and redistributes value between the long and short sides. Fees come
//! off both sides first, proportionally to their value; the leveraged
//! transfer then moves `min(long, short) * |r^leverage - 1|` from the
//! losing side to the winning side, where `r` is the price ratio. A
//! transfer larger than the losing side's value is clamped at a full
//! wipeout, which is flagged but never an error.
//!
//! Every multiplication and division is checked and floored to the pool
//! scale, so repeated settlement can only lose rounding dust, never mint
//! value from it.

use rust_decimal::Decimal;
use seesaw_core::{floor_scaled, ratio_pow, Price, Side, Value};

use crate::error::SettlementError;

/// Seconds in the fee-accrual year.
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

/// Result of settling one interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub long_value: Value,
    pub short_value: Value,
    /// Total fee taken off the two sides this interval.
    pub fee: Value,
    /// Side whose value was fully consumed by the transfer, if any.
    pub wiped: Option<Side>,
}

/// Pure settlement calculator for one pool.
#[derive(Debug, Clone)]
pub struct SettlementEngine {
    leverage: u32,
    fee_rate_annual: Decimal,
}

impl SettlementEngine {
    #[must_use]
    pub fn new(leverage: u32, fee_rate_annual: Decimal) -> Self {
        Self {
            leverage,
            fee_rate_annual,
        }
    }

    #[must_use]
    pub fn leverage(&self) -> u32 {
        self.leverage
    }

    /// Settle one interval.
    ///
    /// Fails with `InvalidPrice` when either price is not strictly
    /// positive or the arithmetic overflows; the caller must then leave
    /// the side valuations untouched and retry next interval.
    pub fn settle(
        &self,
        old_price: Price,
        new_price: Price,
        long_value: Value,
        short_value: Value,
        elapsed_secs: u64,
    ) -> Result<Settlement, SettlementError> {
        if !old_price.is_positive() {
            return Err(SettlementError::InvalidPrice(format!(
                "old price {old_price} is not positive"
            )));
        }
        if !new_price.is_positive() {
            return Err(SettlementError::InvalidPrice(format!(
                "new price {new_price} is not positive"
            )));
        }

        // Fees accrue on each side proportionally, before the transfer.
        let long_fee = self
            .accrue_fee(long_value, elapsed_secs)
            .ok_or_else(overflow)?;
        let short_fee = self
            .accrue_fee(short_value, elapsed_secs)
            .ok_or_else(overflow)?;
        let mut long = long_value.saturating_sub(long_fee);
        let mut short = short_value.saturating_sub(short_fee);
        let fee = long_fee.checked_add(short_fee).ok_or_else(overflow)?;

        let ratio = new_price.ratio_over(old_price).ok_or_else(overflow)?;
        let powered = ratio_pow(ratio, self.leverage).ok_or_else(overflow)?;

        let mut wiped = None;
        if ratio != Decimal::ONE {
            let magnitude = long
                .min(short)
                .mul_floor((powered - Decimal::ONE).abs())
                .ok_or_else(overflow)?;
            let loser = if ratio > Decimal::ONE {
                Side::Short
            } else {
                Side::Long
            };
            let loser_value = match loser {
                Side::Long => long,
                Side::Short => short,
            };
            let transfer = magnitude.min(loser_value);
            if magnitude >= loser_value && transfer.is_positive() {
                wiped = Some(loser);
            }
            match loser {
                Side::Long => {
                    long = long.saturating_sub(transfer);
                    short = short.checked_add(transfer).ok_or_else(overflow)?;
                }
                Side::Short => {
                    short = short.saturating_sub(transfer);
                    long = long.checked_add(transfer).ok_or_else(overflow)?;
                }
            }
        }

        Ok(Settlement {
            long_value: long,
            short_value: short,
            fee,
            wiped,
        })
    }

    /// Fee owed by one side over `elapsed_secs`, floored and capped at
    /// the side's value.
    fn accrue_fee(&self, value: Value, elapsed_secs: u64) -> Option<Value> {
        let gross = value
            .inner()
            .checked_mul(self.fee_rate_annual)?
            .checked_mul(Decimal::from(elapsed_secs))?
            .checked_div(Decimal::from(SECONDS_PER_YEAR))?;
        Some(Value::new(floor_scaled(gross)).min(value))
    }
}

fn overflow() -> SettlementError {
    SettlementError::InvalidPrice("arithmetic overflow during settlement".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn px(d: Decimal) -> Price {
        Price::new(d)
    }

    fn val(d: Decimal) -> Value {
        Value::new(d)
    }

    #[test]
    fn test_rejects_non_positive_old_price() {
        let engine = SettlementEngine::new(1, Decimal::ZERO);
        let err = engine
            .settle(Price::ZERO, px(dec!(100)), val(dec!(1)), val(dec!(1)), 60)
            .unwrap_err();
        assert!(matches!(err, SettlementError::InvalidPrice(_)));
    }

    #[test]
    fn test_rejects_non_positive_new_price() {
        let engine = SettlementEngine::new(1, Decimal::ZERO);
        let err = engine
            .settle(px(dec!(100)), Price::ZERO, val(dec!(1)), val(dec!(1)), 60)
            .unwrap_err();
        assert!(matches!(err, SettlementError::InvalidPrice(_)));
    }

    #[test]
    fn test_unchanged_price_moves_nothing() {
        let engine = SettlementEngine::new(3, Decimal::ZERO);
        let out = engine
            .settle(
                px(dec!(100)),
                px(dec!(100)),
                val(dec!(2000)),
                val(dec!(3000)),
                3600,
            )
            .unwrap();
        assert_eq!(out.long_value, val(dec!(2000)));
        assert_eq!(out.short_value, val(dec!(3000)));
        assert_eq!(out.fee, Value::ZERO);
        assert_eq!(out.wiped, None);
    }

    #[test]
    fn test_leverage_one_transfer_up() {
        let engine = SettlementEngine::new(1, Decimal::ZERO);
        // r = 1.5: short pays min(2000, 2000) * 0.5 = 1000 to long.
        let out = engine
            .settle(
                px(dec!(100)),
                px(dec!(150)),
                val(dec!(2000)),
                val(dec!(2000)),
                3600,
            )
            .unwrap();
        assert_eq!(out.long_value, val(dec!(3000)));
        assert_eq!(out.short_value, val(dec!(1000)));
        assert_eq!(out.wiped, None);
    }

    #[test]
    fn test_leverage_one_transfer_down() {
        let engine = SettlementEngine::new(1, Decimal::ZERO);
        // r = 0.5: long pays min * 0.5 = 500 to short.
        let out = engine
            .settle(
                px(dec!(100)),
                px(dec!(50)),
                val(dec!(1000)),
                val(dec!(4000)),
                3600,
            )
            .unwrap();
        assert_eq!(out.long_value, val(dec!(500)));
        assert_eq!(out.short_value, val(dec!(4500)));
    }

    #[test]
    fn test_leverage_amplifies_transfer() {
        let engine = SettlementEngine::new(2, Decimal::ZERO);
        // r = 1.2, r^2 = 1.44: transfer = 1000 * 0.44 = 440.
        let out = engine
            .settle(
                px(dec!(100)),
                px(dec!(120)),
                val(dec!(1000)),
                val(dec!(5000)),
                3600,
            )
            .unwrap();
        assert_eq!(out.long_value, val(dec!(1440)));
        assert_eq!(out.short_value, val(dec!(4560)));
    }

    #[test]
    fn test_wipeout_clamps_to_exactly_zero() {
        let engine = SettlementEngine::new(2, Decimal::ZERO);
        // r = 1.5, r^2 = 2.25: transfer would be 2000 * 1.25 = 2500,
        // but short only holds 2000.
        let out = engine
            .settle(
                px(dec!(100)),
                px(dec!(150)),
                val(dec!(2000)),
                val(dec!(2000)),
                3600,
            )
            .unwrap();
        assert_eq!(out.short_value, Value::ZERO);
        assert_eq!(out.long_value, val(dec!(4000)));
        assert_eq!(out.wiped, Some(Side::Short));
    }

    #[test]
    fn test_fee_accrual_matches_annualized_rate() {
        let engine = SettlementEngine::new(1, dec!(0.1));
        // 0.1 * 200/31536000 on 4000 total, no price move.
        let out = engine
            .settle(
                px(dec!(100)),
                px(dec!(100)),
                val(dec!(2000)),
                val(dec!(2000)),
                200,
            )
            .unwrap();
        // Each side: floor(2000 * 0.1 * 200 / 31536000) = 0.00126839
        assert_eq!(out.fee, val(dec!(0.00253678)));
        assert_eq!(out.long_value, val(dec!(2000)) - val(dec!(0.00126839)));
        assert_eq!(out.short_value, out.long_value);
    }

    #[test]
    fn test_fee_deducted_before_transfer() {
        let engine = SettlementEngine::new(1, dec!(0.5));
        // Over a full year at 50%, each side pays exactly half.
        let out = engine
            .settle(
                px(dec!(100)),
                px(dec!(200)),
                val(dec!(1000)),
                val(dec!(1000)),
                SECONDS_PER_YEAR,
            )
            .unwrap();
        assert_eq!(out.fee, val(dec!(1000)));
        // Post-fee sides are 500/500; r = 2 transfers 500: short wiped.
        assert_eq!(out.long_value, val(dec!(1000)));
        assert_eq!(out.short_value, Value::ZERO);
        assert_eq!(out.wiped, Some(Side::Short));
    }

    #[test]
    fn test_no_value_creation_over_random_path() {
        let engine = SettlementEngine::new(1, Decimal::ZERO);
        // A zero-net price path: every step is later retraced.
        let path = [
            dec!(100),
            dec!(104.31),
            dec!(97.2),
            dec!(111.84),
            dec!(89.02),
            dec!(100.77),
            dec!(95.5),
            dec!(100),
        ];
        let mut long = val(dec!(2500));
        let mut short = val(dec!(1700));
        let initial_total = long.checked_add(short).unwrap();

        for pair in path.windows(2) {
            let out = engine
                .settle(px(pair[0]), px(pair[1]), long, short, 60)
                .unwrap();
            long = out.long_value;
            short = out.short_value;
            // Transfers conserve value exactly at every step.
            assert_eq!(long.checked_add(short).unwrap(), initial_total);
        }
    }

    #[test]
    fn test_fees_never_exceed_side_value() {
        let engine = SettlementEngine::new(1, dec!(2));
        // 200% annual over a full year would be double the value; the
        // accrual caps at the side's value instead of going negative.
        let out = engine
            .settle(
                px(dec!(100)),
                px(dec!(100)),
                val(dec!(100)),
                val(dec!(100)),
                SECONDS_PER_YEAR,
            )
            .unwrap();
        assert_eq!(out.long_value, Value::ZERO);
        assert_eq!(out.short_value, Value::ZERO);
        assert_eq!(out.fee, val(dec!(200)));
    }
}
