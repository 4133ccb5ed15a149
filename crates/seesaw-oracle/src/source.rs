//! Raw price source boundary.

use rust_decimal::Decimal;
use seesaw_core::Price;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

/// Feed error types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeedError {
    /// The source has never been initialized with a value.
    #[error("no data available from price source")]
    NoDataAvailable,

    /// The source produced a value the oracle refuses to ingest.
    #[error("invalid feed data: {0}")]
    InvalidData(String),
}

pub type FeedResult<T> = Result<T, FeedError>;

/// One raw observation from the external feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceSample {
    /// Raw price, non-negative.
    pub price: Price,
    /// Monotonic sequence or timestamp identifying the observation.
    pub sequence: u64,
}

/// External raw price feed.
///
/// Implementations report the freshest observation they hold. A source
/// that has never been written returns [`FeedError::NoDataAvailable`];
/// the oracle treats that as "no sample this poll", not a fatal error.
#[cfg_attr(test, automock)]
pub trait PriceSource {
    fn sample(&mut self) -> FeedResult<PriceSample>;
}

/// Replays a fixed sequence of prices, then reports no data.
///
/// Used by tests and offline replay; each call consumes one price and
/// advances the sequence number.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    prices: Vec<Decimal>,
    cursor: usize,
}

impl ScriptedSource {
    #[must_use]
    pub fn new(prices: Vec<Decimal>) -> Self {
        Self { prices, cursor: 0 }
    }

    /// Number of prices not yet served.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.prices.len().saturating_sub(self.cursor)
    }
}

impl PriceSource for ScriptedSource {
    fn sample(&mut self) -> FeedResult<PriceSample> {
        let Some(px) = self.prices.get(self.cursor).copied() else {
            return Err(FeedError::NoDataAvailable);
        };
        if px.is_sign_negative() {
            return Err(FeedError::InvalidData(format!("negative price {px}")));
        }
        let sequence = self.cursor as u64;
        self.cursor += 1;
        Ok(PriceSample {
            price: Price::new(px),
            sequence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_scripted_source_replays_in_order() {
        let mut source = ScriptedSource::new(vec![dec!(1), dec!(2)]);
        assert_eq!(source.remaining(), 2);

        let first = source.sample().unwrap();
        assert_eq!(first.price, Price::new(dec!(1)));
        assert_eq!(first.sequence, 0);

        let second = source.sample().unwrap();
        assert_eq!(second.price, Price::new(dec!(2)));
        assert_eq!(second.sequence, 1);

        assert_eq!(source.sample(), Err(FeedError::NoDataAvailable));
    }

    #[test]
    fn test_scripted_source_rejects_negative() {
        let mut source = ScriptedSource::new(vec![dec!(-1)]);
        assert!(matches!(
            source.sample(),
            Err(FeedError::InvalidData(_))
        ));
    }
}
