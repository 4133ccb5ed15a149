//! Node configuration.

use std::path::Path;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use seesaw_engine::PoolConfig;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Averaging oracle settings for one pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Number of samples in the rolling mean window.
    #[serde(default = "default_periods")]
    pub periods: usize,
}

fn default_periods() -> usize {
    10
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            periods: default_periods(),
        }
    }
}

/// Simulated raw feed settings for one pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Price the random walk starts from.
    #[serde(default = "default_start_price")]
    pub start_price: Decimal,
    /// Maximum per-sample move in basis points.
    #[serde(default = "default_volatility_bps")]
    pub volatility_bps: u32,
    /// Seed for a reproducible walk. Unset means entropy-seeded.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_start_price() -> Decimal {
    dec!(100)
}

fn default_volatility_bps() -> u32 {
    20
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            start_price: default_start_price(),
            volatility_bps: default_volatility_bps(),
            seed: None,
        }
    }
}

/// Demo commits placed at startup so the pool has two funded sides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Account that owns the bootstrap commits.
    #[serde(default = "default_owner")]
    pub owner: u64,
    /// Collateral the owner is seeded with.
    #[serde(default = "default_funding")]
    pub funding: Decimal,
    /// Initial long-mint commit amount.
    #[serde(default = "default_side_mint")]
    pub long_mint: Decimal,
    /// Initial short-mint commit amount.
    #[serde(default = "default_side_mint")]
    pub short_mint: Decimal,
}

fn default_owner() -> u64 {
    1
}

fn default_funding() -> Decimal {
    dec!(100000)
}

fn default_side_mint() -> Decimal {
    dec!(5000)
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            funding: default_funding(),
            long_mint: default_side_mint(),
            short_mint: default_side_mint(),
        }
    }
}

/// One pool with its oracle and feed settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoolEntry {
    pub pool: PoolConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub feed: FeedConfig,
}

/// Top-level node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// How often the keeper loop polls for due upkeep, in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Startup commits.
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
    /// Pools to run.
    #[serde(default = "default_pools")]
    pub pools: Vec<PoolEntry>,
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_pools() -> Vec<PoolEntry> {
    vec![PoolEntry::default()]
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            bootstrap: BootstrapConfig::default(),
            pools: default_pools(),
        }
    }
}

impl NodeConfig {
    /// Load configuration, falling back to defaults when the file is
    /// absent. The path comes from the CLI, the `SEESAW_CONFIG` env var,
    /// or `config/default.toml`, in that order.
    pub fn load(cli_path: Option<String>) -> AppResult<Self> {
        let path = cli_path
            .or_else(|| std::env::var("SEESAW_CONFIG").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        if Path::new(&path).exists() {
            Self::from_file(&path)
        } else {
            tracing::warn!(path = %path, "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("failed to parse config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_have_one_pool() {
        let config = NodeConfig::default();
        assert_eq!(config.pools.len(), 1);
        assert_eq!(config.pools[0].oracle.periods, 10);
        assert_eq!(config.tick_interval_ms, 1000);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            tick_interval_ms = 250

            [bootstrap]
            owner = 7
            funding = 50000
            long_mint = 2000
            short_mint = 3000

            [[pools]]
            [pools.pool]
            code = "SEE-3X"
            leverage = 3
            update_interval_secs = 60
            fee_rate_annual = 0.1
            fee_recipient = 900
            secondary_fee_recipient = 901
            secondary_fee_share = 0.1
            initial_price = 100

            [pools.pool.queue]
            min_amount = 0.01
            max_pending = 64

            [pools.oracle]
            periods = 5

            [pools.feed]
            start_price = 100
            volatility_bps = 50
            seed = 42
        "#;

        let config: NodeConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.tick_interval_ms, 250);
        assert_eq!(config.bootstrap.owner, 7);

        let entry = &config.pools[0];
        assert_eq!(entry.pool.code, "SEE-3X");
        assert_eq!(entry.pool.leverage, 3);
        assert_eq!(entry.pool.queue.max_pending, 64);
        assert_eq!(entry.oracle.periods, 5);
        assert_eq!(entry.feed.seed, Some(42));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let toml = r#"
            [[pools]]
            [pools.pool]
            code = "SEE-MIN"
            fee_recipient = 900
        "#;

        let config: NodeConfig = toml::from_str(toml).unwrap();
        let entry = &config.pools[0];
        assert_eq!(entry.pool.leverage, 1);
        assert_eq!(entry.pool.update_interval_secs, 3600);
        assert_eq!(entry.oracle.periods, 10);
        assert!(entry.feed.seed.is_none());
    }
}
