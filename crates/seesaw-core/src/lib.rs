//! Core domain types for the seesaw leveraged pool.
//!
//! This crate provides the fundamental types used throughout the pool:
//! - `Price`, `Value`, `Shares`: precision-safe numeric types
//! - `AccountId`, `CommitId`, `Epoch`: identifier newtypes
//! - `Side`, `SideLedger`: the long/short sides and their valuations

pub mod decimal;
pub mod side;
pub mod types;

pub use decimal::{floor_scaled, ratio_pow, Price, Shares, Value, VALUE_SCALE};
pub use side::{Side, SideLedger};
pub use types::{AccountId, CommitId, Epoch};
