//! The commit queue: an ordered, sparse set of pending commits.
//!
//! Commits are keyed by monotonically increasing id in a `BTreeMap`, so
//! cancelled ids leave holes in id space without leaving tombstones in
//! the map. Two pointers, `earliest_unexecuted` and `latest_unexecuted`,
//! always name the minimum and maximum pending id (`None` when nothing
//! is pending). Pointer repair after removing an endpoint walks inward
//! past holes in id order: ascending when the minimum was removed,
//! descending for the maximum.
//!
//! Batch execution is two-phase: `begin_execution` freezes every commit
//! of the closing epochs (cancellation of those now fails with
//! `EpochAlreadyExecuting`), the pool applies them, `finish_execution`
//! discards them and rebuilds the pointers once.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use seesaw_core::{AccountId, CommitId, Epoch};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::commit::{Commit, CommitKind, CommitState};
use crate::error::{CommitError, CommitResult};

/// Queue limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Smallest acceptable commit amount.
    #[serde(default = "default_min_amount")]
    pub min_amount: Decimal,
    /// Maximum number of simultaneously pending commits.
    #[serde(default = "default_max_pending")]
    pub max_pending: usize,
}

fn default_min_amount() -> Decimal {
    dec!(0.0001)
}

fn default_max_pending() -> usize {
    1000
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            min_amount: default_min_amount(),
            max_pending: default_max_pending(),
        }
    }
}

/// Ordered-by-id collection of pending commits with min/max pointers.
#[derive(Debug)]
pub struct CommitQueue {
    config: QueueConfig,
    pending: BTreeMap<CommitId, Commit>,
    next_id: CommitId,
    earliest: Option<CommitId>,
    latest: Option<CommitId>,
    /// Set while a batch is being applied; commits of epochs at or below
    /// this can no longer be cancelled.
    executing: Option<Epoch>,
}

impl CommitQueue {
    #[must_use]
    pub fn new(config: QueueConfig) -> Self {
        Self {
            config,
            pending: BTreeMap::new(),
            next_id: CommitId::new(0),
            earliest: None,
            latest: None,
            executing: None,
        }
    }

    /// Minimum pending id, or `None` when nothing is pending.
    #[must_use]
    pub fn earliest_unexecuted(&self) -> Option<CommitId> {
        self.earliest
    }

    /// Maximum pending id, or `None` when nothing is pending.
    #[must_use]
    pub fn latest_unexecuted(&self) -> Option<CommitId> {
        self.latest
    }

    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: CommitId) -> Option<&Commit> {
        self.pending.get(&id)
    }

    /// Check whether a submission with this amount would be accepted,
    /// without changing any state.
    ///
    /// Callers that escrow funds before enqueueing use this so a rejected
    /// submission never touches the escrow ledger.
    pub fn validate_submission(&self, amount: Decimal) -> CommitResult<()> {
        if amount < self.config.min_amount || !amount.is_sign_positive() {
            return Err(CommitError::InvalidAmount {
                amount,
                minimum: self.config.min_amount,
            });
        }
        if self.pending.len() >= self.config.max_pending {
            return Err(CommitError::QueueFull {
                max_pending: self.config.max_pending,
            });
        }
        Ok(())
    }

    /// Enqueue a new commit for `epoch`.
    ///
    /// Fails with `InvalidAmount` below the configured minimum and
    /// `QueueFull` at the configured capacity; ids are assigned
    /// sequentially so a fresh commit always extends the maximum.
    pub fn submit(
        &mut self,
        kind: CommitKind,
        amount: Decimal,
        owner: AccountId,
        epoch: Epoch,
    ) -> CommitResult<CommitId> {
        self.validate_submission(amount)?;

        let id = self.next_id;
        self.next_id = id.next();
        self.pending.insert(
            id,
            Commit {
                id,
                kind,
                amount,
                owner,
                epoch,
                state: CommitState::Pending,
            },
        );
        self.latest = Some(id);
        if self.earliest.is_none() {
            self.earliest = Some(id);
        }
        debug!(%id, %kind, %amount, %owner, %epoch, "commit queued");
        Ok(id)
    }

    /// Cancel a pending commit and return its escrowed amount.
    ///
    /// Fails with `NotPending` for unknown or already-consumed ids and
    /// `EpochAlreadyExecuting` while the commit's epoch batch is being
    /// applied. On success the pointers are repaired by scanning inward
    /// past holes from the removed endpoint.
    pub fn cancel(&mut self, id: CommitId) -> CommitResult<Decimal> {
        let Some(commit) = self.pending.get(&id) else {
            return Err(CommitError::NotPending(id));
        };
        if let Some(through) = self.executing {
            if commit.epoch <= through {
                return Err(CommitError::EpochAlreadyExecuting(id));
            }
        }

        let mut commit = self
            .pending
            .remove(&id)
            .ok_or(CommitError::NotPending(id))?;
        commit.state = CommitState::Cancelled;
        self.repair_after_removal(id);
        debug!(%id, amount = %commit.amount, "commit cancelled");
        Ok(commit.amount)
    }

    /// Freeze and return every pending commit with epoch at or below
    /// `through`, in ascending id order.
    ///
    /// The returned commits stay pending until [`finish_execution`]
    /// discards them; in between, cancelling any of them fails with
    /// `EpochAlreadyExecuting`. Batch application is infallible: every
    /// amount was validated at submission.
    ///
    /// [`finish_execution`]: CommitQueue::finish_execution
    pub fn begin_execution(&mut self, through: Epoch) -> Vec<Commit> {
        self.executing = Some(through);
        self.pending
            .values()
            .filter(|c| c.epoch <= through)
            .copied()
            .collect()
    }

    /// Discard the frozen batch and rebuild the pointers. Returns the
    /// number of commits executed.
    pub fn finish_execution(&mut self) -> usize {
        let Some(through) = self.executing.take() else {
            return 0;
        };
        let before = self.pending.len();
        self.pending.retain(|_, c| c.epoch > through);
        let executed = before - self.pending.len();

        self.earliest = self.pending.keys().next().copied();
        self.latest = self.pending.keys().next_back().copied();
        if executed > 0 {
            debug!(executed, through = %through, "commit batch executed");
        }
        executed
    }

    /// Repair both pointers after `removed` left the pending set.
    fn repair_after_removal(&mut self, removed: CommitId) {
        if self.pending.is_empty() {
            self.earliest = None;
            self.latest = None;
            return;
        }
        if self.earliest == Some(removed) {
            // Scan up: next pending id above the removed minimum.
            self.earliest = self.pending.range(removed.next()..).next().map(|(k, _)| *k);
        }
        if self.latest == Some(removed) {
            // Scan down: next pending id below the removed maximum.
            self.latest = self.pending.range(..removed).next_back().map(|(k, _)| *k);
        }
    }
}
