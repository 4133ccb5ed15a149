//! Settlement engine and pool state machine.
//!
//! One [`LeveragedPool`] owns the three subsystems the protocol is made
//! of (commit queue, settlement engine, averaging oracle) and wires
//! them into a single serialized state machine: every upkeep tick polls
//! the oracle, settles the long/short valuations against the price move,
//! then executes the queued commits of the closed epochs at the
//! post-settlement price. The [`Keeper`] drives any number of pools.

pub mod error;
pub mod keeper;
pub mod pool;
pub mod settlement;
pub mod vault;

pub use error::{PoolError, PoolResult, SettlementError, VaultError};
pub use keeper::Keeper;
pub use pool::{ExecutedCommit, LeveragedPool, PoolConfig, SettlementSummary, TickOutcome};
pub use settlement::{Settlement, SettlementEngine, SECONDS_PER_YEAR};
pub use vault::{InMemoryVault, Vault};
