//! One leveraged pool: queue → settlement → oracle as a single state
//! machine.
//!
//! Every operation is a serialized, all-or-nothing step. `tick` is the
//! upkeep entry point: it is an idempotent no-op until the configured
//! interval has elapsed, and a failed settlement (`InvalidPrice`) aborts
//! the whole tick before any side value moves, to be retried with fresh
//! input on the next call.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use seesaw_committer::{Commit, CommitError, CommitKind, CommitQueue, QueueConfig};
use seesaw_core::{AccountId, CommitId, Epoch, Price, Shares, Side, SideLedger, Value};
use seesaw_oracle::SmaOracle;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PoolResult, SettlementError};
use crate::settlement::SettlementEngine;
use crate::vault::Vault;

/// Static parameters of one pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Human-readable pool label used in logs.
    #[serde(default = "default_code")]
    pub code: String,
    /// Exponent applied to the price ratio in settlement.
    #[serde(default = "default_leverage")]
    pub leverage: u32,
    /// Settlement interval length in seconds.
    #[serde(default = "default_update_interval_secs")]
    pub update_interval_secs: u64,
    /// Annualized fee rate on total pool value.
    #[serde(default = "default_fee_rate_annual")]
    pub fee_rate_annual: Decimal,
    /// Primary fee recipient.
    pub fee_recipient: AccountId,
    /// Optional secondary fee recipient; when unset the primary receives
    /// the full fee.
    #[serde(default)]
    pub secondary_fee_recipient: Option<AccountId>,
    /// Fraction of the fee routed to the secondary recipient.
    #[serde(default = "default_secondary_fee_share")]
    pub secondary_fee_share: Decimal,
    /// Reference price the pool starts from.
    #[serde(default = "default_initial_price")]
    pub initial_price: Decimal,
    /// Commit queue limits.
    #[serde(default)]
    pub queue: QueueConfig,
}

fn default_code() -> String {
    "POOL".to_string()
}

fn default_leverage() -> u32 {
    1
}

fn default_update_interval_secs() -> u64 {
    3600
}

fn default_fee_rate_annual() -> Decimal {
    dec!(0.05)
}

fn default_secondary_fee_share() -> Decimal {
    dec!(0.1)
}

fn default_initial_price() -> Decimal {
    Decimal::ONE
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            code: default_code(),
            leverage: default_leverage(),
            update_interval_secs: default_update_interval_secs(),
            fee_rate_annual: default_fee_rate_annual(),
            fee_recipient: AccountId::new(0),
            secondary_fee_recipient: None,
            secondary_fee_share: default_secondary_fee_share(),
            initial_price: default_initial_price(),
            queue: QueueConfig::default(),
        }
    }
}

/// One commit applied during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutedCommit {
    pub id: CommitId,
    pub kind: CommitKind,
    pub owner: AccountId,
    /// Escrowed amount consumed: collateral for mints, shares for burns.
    pub consumed: Decimal,
    /// Proceeds credited: shares for mints, collateral for burns.
    pub proceeds: Decimal,
}

/// What a settling tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementSummary {
    /// Epoch closed by this tick.
    pub epoch: Epoch,
    pub old_price: Price,
    pub new_price: Price,
    pub long_value: Value,
    pub short_value: Value,
    pub fee: Value,
    pub wiped: Option<Side>,
    pub executed: Vec<ExecutedCommit>,
}

/// Outcome of one upkeep invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The interval has not elapsed yet; nothing changed.
    NotDue,
    /// An interval was settled and its commit batch executed.
    Settled(SettlementSummary),
}

/// A leveraged two-sided pool instance.
pub struct LeveragedPool<V: Vault> {
    config: PoolConfig,
    engine: SettlementEngine,
    queue: CommitQueue,
    oracle: SmaOracle,
    long: SideLedger,
    short: SideLedger,
    vault: V,
    last_price: Price,
    last_update_at: i64,
    epoch: Epoch,
}

impl<V: Vault> std::fmt::Debug for LeveragedPool<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeveragedPool")
            .field("code", &self.config.code)
            .field("epoch", &self.epoch)
            .field("last_price", &self.last_price)
            .field("long", &self.long)
            .field("short", &self.short)
            .field("pending", &self.queue.pending_len())
            .finish()
    }
}

impl<V: Vault> LeveragedPool<V> {
    /// Create a pool whose first interval starts at `now`.
    pub fn new(config: PoolConfig, oracle: SmaOracle, vault: V, now: i64) -> PoolResult<Self> {
        let initial = Price::new(config.initial_price);
        if !initial.is_positive() {
            return Err(SettlementError::InvalidPrice(format!(
                "initial price {initial} is not positive"
            ))
            .into());
        }
        let engine = SettlementEngine::new(config.leverage, config.fee_rate_annual);
        let queue = CommitQueue::new(config.queue.clone());
        Ok(Self {
            config,
            engine,
            queue,
            oracle,
            long: SideLedger::new(),
            short: SideLedger::new(),
            vault,
            last_price: initial,
            last_update_at: now,
            epoch: Epoch::new(0),
        })
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.config.code
    }

    #[must_use]
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    #[must_use]
    pub fn last_price(&self) -> Price {
        self.last_price
    }

    #[must_use]
    pub fn long(&self) -> &SideLedger {
        &self.long
    }

    #[must_use]
    pub fn short(&self) -> &SideLedger {
        &self.short
    }

    #[must_use]
    pub fn queue(&self) -> &CommitQueue {
        &self.queue
    }

    #[must_use]
    pub fn vault(&self) -> &V {
        &self.vault
    }

    /// Submit a mint/burn request for the current epoch.
    ///
    /// The amount is validated before the escrow debit, so a rejected
    /// submission never touches the owner's balances.
    pub fn commit(
        &mut self,
        kind: CommitKind,
        amount: Decimal,
        owner: AccountId,
    ) -> PoolResult<CommitId> {
        self.queue.validate_submission(amount)?;
        self.vault.escrow(owner, kind, amount)?;
        let id = self.queue.submit(kind, amount, owner, self.epoch)?;
        debug!(pool = %self.config.code, %id, %kind, %amount, %owner, "commit accepted");
        Ok(id)
    }

    /// Cancel a pending commit and credit its escrow back to the owner.
    pub fn uncommit(&mut self, id: CommitId) -> PoolResult<Decimal> {
        let commit = *self.queue.get(id).ok_or(CommitError::NotPending(id))?;
        let amount = self.queue.cancel(id)?;
        self.vault.refund(commit.owner, commit.kind, amount);
        debug!(pool = %self.config.code, %id, %amount, "commit cancelled");
        Ok(amount)
    }

    /// Whether an interval boundary has passed since the last settlement.
    #[must_use]
    pub fn upkeep_due(&self, now: i64) -> bool {
        now.saturating_sub(self.last_update_at) >= self.config.update_interval_secs as i64
    }

    /// Run upkeep against the clock reading `now`.
    ///
    /// No-op until the interval elapses. On a boundary: poll the oracle,
    /// settle both sides over the actual elapsed seconds, route the fee,
    /// then execute every pending commit of the closed epochs at the
    /// post-settlement share prices. Commits accumulated across skipped
    /// intervals all execute in this one batch at the same price.
    pub fn tick(&mut self, now: i64) -> PoolResult<TickOutcome> {
        if !self.upkeep_due(now) {
            return Ok(TickOutcome::NotDue);
        }
        let elapsed = now.saturating_sub(self.last_update_at) as u64;

        let new_price = self.oracle.poll();
        if !new_price.is_positive() {
            return Err(SettlementError::InvalidPrice(
                "averaging oracle holds no samples".to_string(),
            )
            .into());
        }

        // Settlement is pure; nothing below mutates until it succeeds.
        let old_price = self.last_price;
        let settled = self.engine.settle(
            old_price,
            new_price,
            self.long.value(),
            self.short.value(),
            elapsed,
        )?;

        self.long.set_value(settled.long_value);
        self.short.set_value(settled.short_value);
        if let Some(side) = settled.wiped {
            warn!(
                pool = %self.config.code,
                %side,
                %old_price,
                %new_price,
                "side value wiped out by leveraged transfer"
            );
        }
        self.route_fee(settled.fee);

        let closing = self.epoch;
        let batch = self.queue.begin_execution(closing);
        let mut executed = Vec::with_capacity(batch.len());
        for commit in batch {
            executed.push(self.apply_commit(commit));
        }
        self.queue.finish_execution();

        self.last_price = new_price;
        self.last_update_at = now;
        self.epoch = self.epoch.next();

        Ok(TickOutcome::Settled(SettlementSummary {
            epoch: closing,
            old_price,
            new_price,
            long_value: self.long.value(),
            short_value: self.short.value(),
            fee: settled.fee,
            wiped: settled.wiped,
            executed,
        }))
    }

    /// Apply one commit at the post-settlement share price.
    fn apply_commit(&mut self, commit: Commit) -> ExecutedCommit {
        let proceeds = match commit.kind {
            CommitKind::LongMint => self
                .long
                .mint(Value::new(commit.amount))
                .map(|s| s.inner()),
            CommitKind::ShortMint => self
                .short
                .mint(Value::new(commit.amount))
                .map(|s| s.inner()),
            CommitKind::LongBurn => self
                .long
                .burn(Shares::new(commit.amount))
                .map(|v| v.inner()),
            CommitKind::ShortBurn => self
                .short
                .burn(Shares::new(commit.amount))
                .map(|v| v.inner()),
        };

        let proceeds = match proceeds {
            Some(proceeds) => {
                self.vault
                    .execute(commit.owner, commit.kind, commit.amount, proceeds);
                proceeds
            }
            None => {
                // Amounts are validated at submission, so an overflowing
                // side can only mean pathological pool growth. The batch
                // must not abort: hand the escrow back instead.
                warn!(
                    pool = %self.config.code,
                    id = %commit.id,
                    "commit overflowed side arithmetic; escrow refunded"
                );
                self.vault.refund(commit.owner, commit.kind, commit.amount);
                Decimal::ZERO
            }
        };

        ExecutedCommit {
            id: commit.id,
            kind: commit.kind,
            owner: commit.owner,
            consumed: commit.amount,
            proceeds,
        }
    }

    /// Split the interval fee between the configured recipients.
    fn route_fee(&mut self, fee: Value) {
        if fee.is_zero() {
            return;
        }
        match self.config.secondary_fee_recipient {
            Some(secondary) => {
                let cut = fee
                    .mul_floor(self.config.secondary_fee_share)
                    .unwrap_or(Value::ZERO);
                let primary = fee.saturating_sub(cut);
                self.vault.pay_fee(self.config.fee_recipient, primary.inner());
                if cut.is_positive() {
                    self.vault.pay_fee(secondary, cut.inner());
                }
            }
            None => {
                self.vault.pay_fee(self.config.fee_recipient, fee.inner());
            }
        }
    }
}
