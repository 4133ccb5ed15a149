//! Commit queue error types.

use rust_decimal::Decimal;
use seesaw_core::CommitId;
use thiserror::Error;

/// Failures surfaced by queue operations. Every failure leaves the queue
/// unchanged; callers may retry with corrected input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommitError {
    #[error("commit amount {amount} below minimum {minimum}")]
    InvalidAmount { amount: Decimal, minimum: Decimal },

    #[error("commit queue is full ({max_pending} pending)")]
    QueueFull { max_pending: usize },

    #[error("commit {0} is not pending")]
    NotPending(CommitId),

    #[error("commit {0} belongs to an epoch that has begun executing")]
    EpochAlreadyExecuting(CommitId),
}

pub type CommitResult<T> = Result<T, CommitError>;
