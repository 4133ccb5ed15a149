//! Engine error types.

use rust_decimal::Decimal;
use seesaw_core::AccountId;
use seesaw_committer::CommitError;
use thiserror::Error;

/// Settlement failures. These abort the whole tick with no side-value
/// mutation; the interval is retried on the next tick with fresh input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettlementError {
    #[error("invalid price: {0}")]
    InvalidPrice(String),
}

/// Token collaborator failures, surfaced on escrow at submission.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VaultError {
    #[error("insufficient balance for {owner}: need {needed}, have {available}")]
    InsufficientBalance {
        owner: AccountId,
        needed: Decimal,
        available: Decimal,
    },
}

/// Failures of pool-level operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    #[error(transparent)]
    Commit(#[from] CommitError),

    #[error(transparent)]
    Settlement(#[from] SettlementError),

    #[error(transparent)]
    Vault(#[from] VaultError),
}

pub type PoolResult<T> = Result<T, PoolError>;
