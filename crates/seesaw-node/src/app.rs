//! Application wiring and the keeper run loop.

use std::time::Duration;

use chrono::Utc;
use seesaw_committer::CommitKind;
use seesaw_core::AccountId;
use seesaw_engine::{InMemoryVault, Keeper, LeveragedPool};
use seesaw_oracle::SmaOracle;
use tracing::info;

use crate::config::NodeConfig;
use crate::error::AppResult;
use crate::feed::SimulatedFeed;

/// One running node: a keeper over the configured pools.
pub struct Application {
    tick_interval: Duration,
    keeper: Keeper<InMemoryVault>,
}

impl Application {
    /// Build every configured pool, fund the bootstrap account and place
    /// its opening commits.
    pub fn new(config: NodeConfig) -> AppResult<Self> {
        let now = Utc::now().timestamp();
        let owner = AccountId::new(config.bootstrap.owner);

        let mut pools = Vec::with_capacity(config.pools.len());
        for entry in &config.pools {
            let feed = SimulatedFeed::new(
                entry.feed.start_price,
                entry.feed.volatility_bps,
                entry.feed.seed,
            );
            let oracle = SmaOracle::new(Box::new(feed), entry.oracle.periods);

            let mut vault = InMemoryVault::new();
            vault.fund(owner, config.bootstrap.funding);

            let mut pool = LeveragedPool::new(entry.pool.clone(), oracle, vault, now)?;
            pool.commit(CommitKind::LongMint, config.bootstrap.long_mint, owner)?;
            pool.commit(CommitKind::ShortMint, config.bootstrap.short_mint, owner)?;

            info!(
                pool = %pool.code(),
                leverage = entry.pool.leverage,
                interval_secs = entry.pool.update_interval_secs,
                oracle_periods = entry.oracle.periods,
                "pool initialized"
            );
            pools.push(pool);
        }

        Ok(Self {
            tick_interval: Duration::from_millis(config.tick_interval_ms),
            keeper: Keeper::new(pools),
        })
    }

    #[must_use]
    pub fn keeper(&self) -> &Keeper<InMemoryVault> {
        &self.keeper
    }

    /// Drive upkeep forever.
    pub async fn run(&mut self) -> AppResult<()> {
        info!(pools = self.keeper.pools().len(), "keeper loop started");
        let mut timer = tokio::time::interval(self.tick_interval);
        loop {
            timer.tick().await;
            self.keeper.run_once(Utc::now().timestamp());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeConfig;

    #[test]
    fn test_application_builds_default_pools() {
        let app = Application::new(NodeConfig::default()).unwrap();
        assert_eq!(app.keeper().pools().len(), 1);
        // Bootstrap commits are queued, awaiting the first interval.
        assert_eq!(app.keeper().pools()[0].queue().pending_len(), 2);
    }
}
