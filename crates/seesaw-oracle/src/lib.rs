//! Price feed boundary and averaging oracle.
//!
//! The raw feed is external: anything that can produce a timestamped
//! price implements [`PriceSource`]. The [`SmaOracle`] smooths that feed
//! over a rolling window and is the only price the settlement engine
//! ever sees.

pub mod sma;
pub mod source;

pub use sma::SmaOracle;
pub use source::{FeedError, FeedResult, PriceSample, PriceSource, ScriptedSource};
