//! Thin upkeep orchestrator over a set of pools.
//!
//! The keeper owns no policy: it forwards a clock reading to every pool
//! and logs what each tick did. A failing pool (typically a transient
//! `InvalidPrice` from a misbehaving feed) never prevents the other
//! pools from settling.

use tracing::{debug, info, warn};

use crate::pool::{LeveragedPool, TickOutcome};
use crate::vault::Vault;

/// Drives upkeep for any number of independent pools.
pub struct Keeper<V: Vault> {
    pools: Vec<LeveragedPool<V>>,
}

impl<V: Vault> Keeper<V> {
    #[must_use]
    pub fn new(pools: Vec<LeveragedPool<V>>) -> Self {
        Self { pools }
    }

    #[must_use]
    pub fn pools(&self) -> &[LeveragedPool<V>] {
        &self.pools
    }

    #[must_use]
    pub fn pool_mut(&mut self, index: usize) -> Option<&mut LeveragedPool<V>> {
        self.pools.get_mut(index)
    }

    /// Tick every pool once against `now`. Returns how many settled.
    pub fn run_once(&mut self, now: i64) -> usize {
        let mut settled = 0;
        for pool in &mut self.pools {
            match pool.tick(now) {
                Ok(TickOutcome::NotDue) => {
                    debug!(pool = %pool.code(), "upkeep not due");
                }
                Ok(TickOutcome::Settled(summary)) => {
                    settled += 1;
                    info!(
                        pool = %pool.code(),
                        epoch = %summary.epoch,
                        old_price = %summary.old_price,
                        new_price = %summary.new_price,
                        long_value = %summary.long_value,
                        short_value = %summary.short_value,
                        fee = %summary.fee,
                        executed = summary.executed.len(),
                        "interval settled"
                    );
                }
                Err(err) => {
                    warn!(
                        pool = %pool.code(),
                        error = %err,
                        "upkeep failed; retrying next interval"
                    );
                }
            }
        }
        settled
    }
}
