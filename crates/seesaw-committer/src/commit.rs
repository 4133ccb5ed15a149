//! Commit request types.

use rust_decimal::Decimal;
use seesaw_core::{AccountId, CommitId, Epoch, Side};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a commit does when it executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommitKind {
    /// Add collateral to the long side, receiving long shares.
    LongMint,
    /// Redeem long shares for collateral.
    LongBurn,
    /// Add collateral to the short side, receiving short shares.
    ShortMint,
    /// Redeem short shares for collateral.
    ShortBurn,
}

impl CommitKind {
    /// The pool side this commit acts on.
    #[must_use]
    pub fn side(self) -> Side {
        match self {
            Self::LongMint | Self::LongBurn => Side::Long,
            Self::ShortMint | Self::ShortBurn => Side::Short,
        }
    }

    #[must_use]
    pub fn is_mint(self) -> bool {
        matches!(self, Self::LongMint | Self::ShortMint)
    }
}

impl fmt::Display for CommitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LongMint => write!(f, "long-mint"),
            Self::LongBurn => write!(f, "long-burn"),
            Self::ShortMint => write!(f, "short-mint"),
            Self::ShortBurn => write!(f, "short-burn"),
        }
    }
}

/// Lifecycle state of a commit. A commit is consumed exactly once, by
/// execution or cancellation, and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitState {
    Pending,
    Executed,
    Cancelled,
}

/// One queued user request.
///
/// `amount` is an unsigned fixed-point quantity: collateral value for a
/// mint, a share count for a burn. It is escrowed with the token
/// collaborator from submission until the commit is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub id: CommitId,
    pub kind: CommitKind,
    pub amount: Decimal,
    pub owner: AccountId,
    /// Settlement epoch the commit is eligible to execute in.
    pub epoch: Epoch,
    pub state: CommitState,
}
