//! Simple-moving-average oracle over a rolling price window.
//!
//! Holds the last N raw samples in a fixed-capacity FIFO. The reported
//! price is the arithmetic mean of whatever is held: it ramps up while
//! fewer than N samples exist, then becomes a true sliding window. Before
//! any sample the price reads zero.

use std::collections::VecDeque;

use rust_decimal::Decimal;
use seesaw_core::{floor_scaled, Price};
use tracing::{debug, warn};

use crate::source::{FeedError, PriceSource};

/// Averaging oracle wrapping a raw [`PriceSource`].
pub struct SmaOracle {
    source: Box<dyn PriceSource + Send>,
    window: VecDeque<Price>,
    periods: usize,
    last_sequence: Option<u64>,
}

impl SmaOracle {
    /// Create an oracle averaging over the last `periods` samples.
    #[must_use]
    pub fn new(source: Box<dyn PriceSource + Send>, periods: usize) -> Self {
        Self {
            source,
            window: VecDeque::with_capacity(periods.max(1)),
            periods: periods.max(1),
            last_sequence: None,
        }
    }

    /// Poll the raw source once and return the updated mean.
    ///
    /// A source reporting [`FeedError::NoDataAvailable`] produces no
    /// sample this poll; the mean of the held window is returned
    /// unchanged. Other feed failures are logged and likewise skipped.
    pub fn poll(&mut self) -> Price {
        match self.source.sample() {
            Ok(sample) => {
                if self.window.len() == self.periods {
                    self.window.pop_front();
                }
                self.window.push_back(sample.price);
                self.last_sequence = Some(sample.sequence);
            }
            Err(FeedError::NoDataAvailable) => {
                debug!("price source has no data; skipping sample");
            }
            Err(err) => {
                warn!(error = %err, "price source failed; keeping previous window");
            }
        }
        self.mean()
    }

    /// Current mean without sampling. Zero while the window is empty.
    #[must_use]
    pub fn get_price(&self) -> Price {
        self.mean()
    }

    /// Number of samples currently held (at most `periods`).
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.window.len()
    }

    /// Configured window length.
    #[must_use]
    pub fn periods(&self) -> usize {
        self.periods
    }

    /// Sequence of the most recently ingested sample.
    #[must_use]
    pub fn last_sequence(&self) -> Option<u64> {
        self.last_sequence
    }

    fn mean(&self) -> Price {
        if self.window.is_empty() {
            return Price::ZERO;
        }
        let sum: Decimal = self.window.iter().map(Price::inner).sum();
        let count = Decimal::from(self.window.len() as u64);
        Price::new(floor_scaled(sum / count))
    }
}

impl std::fmt::Debug for SmaOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmaOracle")
            .field("periods", &self.periods)
            .field("held", &self.window.len())
            .field("last_sequence", &self.last_sequence)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{MockPriceSource, PriceSample, ScriptedSource};
    use rust_decimal_macros::dec;

    fn oracle_over(prices: Vec<Decimal>, periods: usize) -> SmaOracle {
        SmaOracle::new(Box::new(ScriptedSource::new(prices)), periods)
    }

    fn int_prices(range: std::ops::RangeInclusive<i64>) -> Vec<Decimal> {
        range.map(Decimal::from).collect()
    }

    #[test]
    fn test_zero_before_first_poll() {
        let oracle = oracle_over(vec![dec!(2)], 10);
        assert_eq!(oracle.get_price(), Price::ZERO);
    }

    #[test]
    fn test_spot_price_after_first_poll() {
        let mut oracle = oracle_over(vec![dec!(2)], 10);
        assert_eq!(oracle.poll(), Price::new(dec!(2)));
        assert_eq!(oracle.get_price(), Price::new(dec!(2)));
    }

    #[test]
    fn test_mean_of_two_entries() {
        let mut oracle = oracle_over(vec![dec!(2), dec!(3)], 10);
        oracle.poll();
        oracle.poll();
        assert_eq!(oracle.get_price(), Price::new(dec!(2.5)));
    }

    #[test]
    fn test_fully_ramped_window() {
        let mut oracle = oracle_over(int_prices(1..=10), 10);
        for _ in 0..10 {
            oracle.poll();
        }
        assert_eq!(oracle.sample_count(), 10);
        assert_eq!(oracle.get_price(), Price::new(dec!(5.5)));
    }

    #[test]
    fn test_oldest_sample_rolls_off() {
        let mut oracle = oracle_over(int_prices(1..=11), 10);
        for _ in 0..11 {
            oracle.poll();
        }
        // Sample 1 evicted; mean of 2..=11.
        assert_eq!(oracle.sample_count(), 10);
        assert_eq!(oracle.get_price(), Price::new(dec!(6.5)));
    }

    #[test]
    fn test_window_after_doubling_periods() {
        let mut oracle = oracle_over(int_prices(1..=24), 10);
        for _ in 0..24 {
            oracle.poll();
        }
        // Mean of 15..=24.
        assert_eq!(oracle.get_price(), Price::new(dec!(19.5)));

        let mut oracle = oracle_over(int_prices(1..=25), 10);
        for _ in 0..25 {
            oracle.poll();
        }
        // Mean of 16..=25.
        assert_eq!(oracle.get_price(), Price::new(dec!(20.5)));
    }

    #[test]
    fn test_no_data_is_a_noop_poll() {
        let mut source = MockPriceSource::new();
        let mut seq = 0u64;
        source.expect_sample().times(3).returning(move || {
            seq += 1;
            match seq {
                1 => Ok(PriceSample {
                    price: Price::new(dec!(4)),
                    sequence: 1,
                }),
                2 => Err(FeedError::NoDataAvailable),
                _ => Ok(PriceSample {
                    price: Price::new(dec!(6)),
                    sequence: 3,
                }),
            }
        });

        let mut oracle = SmaOracle::new(Box::new(source), 10);
        assert_eq!(oracle.poll(), Price::new(dec!(4)));
        // Dry poll: window unchanged.
        assert_eq!(oracle.poll(), Price::new(dec!(4)));
        assert_eq!(oracle.sample_count(), 1);
        assert_eq!(oracle.poll(), Price::new(dec!(5)));
        assert_eq!(oracle.last_sequence(), Some(3));
    }

    #[test]
    fn test_mean_floors_to_scale() {
        let mut oracle = oracle_over(vec![dec!(1), dec!(1), dec!(2)], 10);
        for _ in 0..3 {
            oracle.poll();
        }
        // 4/3 floored at 8 places.
        assert_eq!(oracle.get_price(), Price::new(dec!(1.33333333)));
    }
}
