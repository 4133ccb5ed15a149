//! Token/balance collaborator boundary.
//!
//! The pool never stores user balances itself: it debits escrow at
//! submission, credits it back on cancellation, and delivers proceeds on
//! execution through this trait. [`InMemoryVault`] is the reference
//! implementation used by the node binary and the integration tests.

use std::collections::HashMap;

use rust_decimal::Decimal;
use seesaw_core::{AccountId, Side};
use seesaw_committer::CommitKind;

use crate::error::VaultError;

#[cfg(test)]
use mockall::automock;

/// Balance bookkeeping the pool calls into but does not own.
///
/// A mint commit escrows collateral; a burn commit escrows pool shares
/// of its side. Refund reverses an escrow; execute consumes it and
/// credits the proceeds (shares for a mint, collateral for a burn).
#[cfg_attr(test, automock)]
pub trait Vault {
    /// Escrow-debit at commit submission. The only fallible operation:
    /// the owner may not hold what the commit locks up.
    fn escrow(
        &mut self,
        owner: AccountId,
        kind: CommitKind,
        amount: Decimal,
    ) -> Result<(), VaultError>;

    /// Credit an escrowed amount back to its owner after cancellation.
    fn refund(&mut self, owner: AccountId, kind: CommitKind, amount: Decimal);

    /// Consume the escrow of an executed commit and credit its proceeds.
    fn execute(&mut self, owner: AccountId, kind: CommitKind, escrowed: Decimal, proceeds: Decimal);

    /// Route a settlement fee to a recipient.
    fn pay_fee(&mut self, recipient: AccountId, amount: Decimal);
}

/// Simple in-process vault: collateral and per-side share balances in
/// hash maps, with the pool's collateral reserve tracked explicitly.
#[derive(Debug, Default)]
pub struct InMemoryVault {
    collateral: HashMap<AccountId, Decimal>,
    shares: HashMap<(AccountId, Side), Decimal>,
    /// Collateral escrowed or absorbed by the pool, backing the sides.
    reserve: Decimal,
    /// Shares locked by pending burn commits.
    share_escrow: HashMap<Side, Decimal>,
}

impl InMemoryVault {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account with collateral.
    pub fn fund(&mut self, owner: AccountId, amount: Decimal) {
        *self.collateral.entry(owner).or_default() += amount;
    }

    #[must_use]
    pub fn collateral_of(&self, owner: AccountId) -> Decimal {
        self.collateral.get(&owner).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn shares_of(&self, owner: AccountId, side: Side) -> Decimal {
        self.shares
            .get(&(owner, side))
            .copied()
            .unwrap_or_default()
    }

    /// Collateral currently held by the pool (escrow plus absorbed).
    #[must_use]
    pub fn reserve(&self) -> Decimal {
        self.reserve
    }

    fn take_collateral(&mut self, owner: AccountId, amount: Decimal) -> Result<(), VaultError> {
        let balance = self.collateral.entry(owner).or_default();
        if *balance < amount {
            return Err(VaultError::InsufficientBalance {
                owner,
                needed: amount,
                available: *balance,
            });
        }
        *balance -= amount;
        Ok(())
    }

    fn take_shares(
        &mut self,
        owner: AccountId,
        side: Side,
        amount: Decimal,
    ) -> Result<(), VaultError> {
        let balance = self.shares.entry((owner, side)).or_default();
        if *balance < amount {
            return Err(VaultError::InsufficientBalance {
                owner,
                needed: amount,
                available: *balance,
            });
        }
        *balance -= amount;
        Ok(())
    }
}

impl Vault for InMemoryVault {
    fn escrow(
        &mut self,
        owner: AccountId,
        kind: CommitKind,
        amount: Decimal,
    ) -> Result<(), VaultError> {
        if kind.is_mint() {
            self.take_collateral(owner, amount)?;
            self.reserve += amount;
        } else {
            self.take_shares(owner, kind.side(), amount)?;
            *self.share_escrow.entry(kind.side()).or_default() += amount;
        }
        Ok(())
    }

    fn refund(&mut self, owner: AccountId, kind: CommitKind, amount: Decimal) {
        if kind.is_mint() {
            self.reserve -= amount;
            *self.collateral.entry(owner).or_default() += amount;
        } else {
            let escrowed = self.share_escrow.entry(kind.side()).or_default();
            *escrowed -= amount;
            *self.shares.entry((owner, kind.side())).or_default() += amount;
        }
    }

    fn execute(&mut self, owner: AccountId, kind: CommitKind, escrowed: Decimal, proceeds: Decimal) {
        if kind.is_mint() {
            // Escrowed collateral stays in the reserve; shares are issued.
            *self.shares.entry((owner, kind.side())).or_default() += proceeds;
        } else {
            // Escrowed shares are retired; collateral leaves the reserve.
            *self.share_escrow.entry(kind.side()).or_default() -= escrowed;
            self.reserve -= proceeds;
            *self.collateral.entry(owner).or_default() += proceeds;
        }
    }

    fn pay_fee(&mut self, recipient: AccountId, amount: Decimal) {
        self.reserve -= amount;
        *self.collateral.entry(recipient).or_default() += amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn alice() -> AccountId {
        AccountId::new(1)
    }

    #[test]
    fn test_escrow_requires_funds() {
        let mut vault = InMemoryVault::new();
        vault.fund(alice(), dec!(100));

        let err = vault
            .escrow(alice(), CommitKind::LongMint, dec!(150))
            .unwrap_err();
        assert!(matches!(err, VaultError::InsufficientBalance { .. }));
        assert_eq!(vault.collateral_of(alice()), dec!(100));

        vault.escrow(alice(), CommitKind::LongMint, dec!(60)).unwrap();
        assert_eq!(vault.collateral_of(alice()), dec!(40));
        assert_eq!(vault.reserve(), dec!(60));
    }

    #[test]
    fn test_refund_restores_escrow() {
        let mut vault = InMemoryVault::new();
        vault.fund(alice(), dec!(100));
        vault.escrow(alice(), CommitKind::ShortMint, dec!(70)).unwrap();
        vault.refund(alice(), CommitKind::ShortMint, dec!(70));
        assert_eq!(vault.collateral_of(alice()), dec!(100));
        assert_eq!(vault.reserve(), Decimal::ZERO);
    }

    #[test]
    fn test_execute_mint_issues_shares() {
        let mut vault = InMemoryVault::new();
        vault.fund(alice(), dec!(100));
        vault.escrow(alice(), CommitKind::LongMint, dec!(100)).unwrap();
        vault.execute(alice(), CommitKind::LongMint, dec!(100), dec!(100));

        assert_eq!(vault.shares_of(alice(), Side::Long), dec!(100));
        // The collateral stays behind as pool backing.
        assert_eq!(vault.reserve(), dec!(100));
    }

    #[test]
    fn test_burn_escrow_and_payout() {
        let mut vault = InMemoryVault::new();
        vault.fund(alice(), dec!(100));
        vault.escrow(alice(), CommitKind::LongMint, dec!(100)).unwrap();
        vault.execute(alice(), CommitKind::LongMint, dec!(100), dec!(100));

        vault
            .escrow(alice(), CommitKind::LongBurn, dec!(40))
            .unwrap();
        assert_eq!(vault.shares_of(alice(), Side::Long), dec!(60));

        vault.execute(alice(), CommitKind::LongBurn, dec!(40), dec!(40));
        assert_eq!(vault.collateral_of(alice()), dec!(40));
        assert_eq!(vault.reserve(), dec!(60));
    }

    #[test]
    fn test_pay_fee_draws_from_reserve() {
        let mut vault = InMemoryVault::new();
        vault.fund(alice(), dec!(100));
        vault.escrow(alice(), CommitKind::LongMint, dec!(100)).unwrap();

        let treasury = AccountId::new(9);
        vault.pay_fee(treasury, dec!(1.5));
        assert_eq!(vault.collateral_of(treasury), dec!(1.5));
        assert_eq!(vault.reserve(), dec!(98.5));
    }
}
