//! Simulated raw price feed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use seesaw_core::Price;
use seesaw_oracle::{FeedResult, PriceSample, PriceSource};

/// Bounded random walk standing in for an external oracle.
///
/// Each sample moves the price by a uniform step of at most
/// `volatility_bps` basis points, never letting it reach zero. Seeded
/// walks are reproducible across runs.
#[derive(Debug)]
pub struct SimulatedFeed {
    price: Decimal,
    volatility_bps: u32,
    rng: StdRng,
    sequence: u64,
}

impl SimulatedFeed {
    #[must_use]
    pub fn new(start_price: Decimal, volatility_bps: u32, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            price: start_price,
            volatility_bps,
            rng,
            sequence: 0,
        }
    }
}

impl PriceSource for SimulatedFeed {
    fn sample(&mut self) -> FeedResult<PriceSample> {
        let limit = self.volatility_bps as i64;
        let step_bps = if limit == 0 {
            0
        } else {
            self.rng.gen_range(-limit..=limit)
        };
        let factor = Decimal::ONE + Decimal::new(step_bps, 4);
        let floor = Decimal::new(1, 4);
        self.price = (self.price * factor).max(floor);
        self.sequence += 1;
        Ok(PriceSample {
            price: Price::new(self.price),
            sequence: self.sequence,
        })
    }
}
