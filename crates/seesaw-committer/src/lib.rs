//! Delayed mint/burn commit queue.
//!
//! User requests to enter or leave a pool side are not applied on the
//! spot: they are queued as commits tagged with the current settlement
//! epoch and executed only after that epoch's price update, so nobody can
//! front-run the oracle. Commits can be cancelled ("uncommitted") any
//! time before their epoch begins executing.

pub mod commit;
pub mod error;
pub mod queue;

pub use commit::{Commit, CommitKind, CommitState};
pub use error::{CommitError, CommitResult};
pub use queue::{CommitQueue, QueueConfig};
