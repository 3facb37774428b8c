//! In-memory bank with a single funding escrow account.

use crate::domain::errors::BankError;
use crate::ports::outbound::BankKeeper;
use shared_types::{Address, Coins};
use std::collections::BTreeMap;

/// Account balances plus the escrow holding all deposited funds.
#[derive(Debug, Default, Clone)]
pub struct InMemoryBank {
    accounts: BTreeMap<Address, Coins>,
    escrow: Coins,
}

impl InMemoryBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `amount` to `address` out of thin air (genesis / tests).
    pub fn mint(&mut self, address: Address, amount: &Coins) {
        let balance = self.accounts.entry(address).or_default();
        for (denom, value) in amount.iter() {
            let total = balance.amount_of(denom).saturating_add(*value);
            balance.set(denom.clone(), total);
        }
    }

    /// Credits the escrow directly (genesis import of existing fundings).
    pub fn mint_escrow(&mut self, amount: &Coins) {
        for (denom, value) in amount.iter() {
            let total = self.escrow.amount_of(denom).saturating_add(*value);
            self.escrow.set(denom.clone(), total);
        }
    }

    pub fn balance_of(&self, address: &Address) -> Coins {
        self.accounts.get(address).cloned().unwrap_or_default()
    }

    pub fn escrow(&self) -> &Coins {
        &self.escrow
    }
}

impl BankKeeper for InMemoryBank {
    fn deposit_to_escrow(&mut self, from: &Address, amount: &Coins) -> Result<(), BankError> {
        let balance = self.balance_of(from);
        let remaining = balance
            .checked_sub(amount)
            .map_err(|_| BankError::InsufficientFunds {
                address: *from,
                requested: amount.to_string(),
            })?;
        let escrow = self
            .escrow
            .checked_add(amount)
            .map_err(|e| BankError::Rejected(e.to_string()))?;

        self.accounts.insert(*from, remaining);
        self.escrow = escrow;
        Ok(())
    }

    fn refund_from_escrow(&mut self, to: &Address, amount: &Coins) -> Result<(), BankError> {
        let escrow = self
            .escrow
            .checked_sub(amount)
            .map_err(|_| BankError::EscrowUnderflow {
                requested: amount.to_string(),
            })?;
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .map_err(|e| BankError::Rejected(e.to_string()))?;

        self.escrow = escrow;
        self.accounts.insert(*to, balance);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deposit_and_refund() {
        let mut bank = InMemoryBank::new();
        let alice = [1u8; 20];
        bank.mint(alice, &Coins::single("uqc", 100u64));

        bank.deposit_to_escrow(&alice, &Coins::single("uqc", 60u64))
            .unwrap();
        assert_eq!(bank.balance_of(&alice), Coins::single("uqc", 40u64));
        assert_eq!(bank.escrow(), &Coins::single("uqc", 60u64));

        bank.refund_from_escrow(&alice, &Coins::single("uqc", 10u64))
            .unwrap();
        assert_eq!(bank.balance_of(&alice), Coins::single("uqc", 50u64));
        assert_eq!(bank.escrow(), &Coins::single("uqc", 50u64));
    }

    #[test]
    fn test_insufficient_funds_changes_nothing() {
        let mut bank = InMemoryBank::new();
        let alice = [1u8; 20];
        bank.mint(alice, &Coins::single("uqc", 5u64));

        let err = bank
            .deposit_to_escrow(&alice, &Coins::single("uqc", 6u64))
            .unwrap_err();
        assert!(matches!(err, BankError::InsufficientFunds { .. }));
        assert_eq!(bank.balance_of(&alice), Coins::single("uqc", 5u64));
        assert!(bank.escrow().is_zero());
    }

    #[test]
    fn test_escrow_underflow() {
        let mut bank = InMemoryBank::new();
        let err = bank
            .refund_from_escrow(&[2u8; 20], &Coins::single("uqc", 1u64))
            .unwrap_err();
        assert!(matches!(err, BankError::EscrowUnderflow { .. }));
    }
}
