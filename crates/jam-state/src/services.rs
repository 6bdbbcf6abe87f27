//! Service accounts (δ): balances, code, storage, and preimages.

use std::collections::BTreeMap;

use jam_primitives::hash::Hash;

use crate::error::{Result, StfError};
use crate::types::{Balance, Gas, ServiceId};

/// One service's on-chain account.
#[derive(Debug, Clone, Default)]
pub struct ServiceAccount {
    pub balance: Balance,
    pub code_hash: Hash,
    pub storage: BTreeMap<Vec<u8>, Vec<u8>>,
    pub preimages: BTreeMap<Hash, Vec<u8>>,
    pub gas_limit_accumulate: Gas,
    pub gas_limit_transfer: Gas,
}

impl ServiceAccount {
    pub fn new(code_hash: Hash, balance: Balance) -> Self {
        Self {
            balance,
            code_hash,
            ..Default::default()
        }
    }
}

/// δ: the full service-account table.
#[derive(Debug, Clone, Default)]
pub struct ServiceState {
    accounts: BTreeMap<ServiceId, ServiceAccount>,
}

impl ServiceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ServiceId, account: ServiceAccount) {
        self.accounts.insert(id, account);
    }

    pub fn get(&self, id: ServiceId) -> Option<&ServiceAccount> {
        self.accounts.get(&id)
    }

    pub fn get_mut(&mut self, id: ServiceId) -> Option<&mut ServiceAccount> {
        self.accounts.get_mut(&id)
    }

    /// All known service ids in ascending order.
    pub fn ids(&self) -> Vec<ServiceId> {
        self.accounts.keys().copied().collect()
    }

    /// Move `amount` from `from` to `to`, failing if the source is unknown or
    /// underfunded. Both lookups happen before either balance is mutated.
    pub fn transfer(&mut self, from: ServiceId, to: ServiceId, amount: Balance) -> Result<()> {
        let from_balance = self
            .accounts
            .get(&from)
            .ok_or(StfError::UnknownService(from))?
            .balance;
        if from_balance < amount {
            return Err(StfError::InsufficientFunds(from));
        }
        if !self.accounts.contains_key(&to) {
            return Err(StfError::UnknownService(to));
        }

        self.accounts.get_mut(&from).unwrap().balance -= amount;
        self.accounts.get_mut(&to).unwrap().balance += amount;
        Ok(())
    }

    pub fn credit(&mut self, id: ServiceId, amount: Balance) -> Result<()> {
        let account = self.accounts.get_mut(&id).ok_or(StfError::UnknownService(id))?;
        account.balance += amount;
        Ok(())
    }

    pub fn store_preimage(&mut self, id: ServiceId, hash: Hash, blob: Vec<u8>) -> Result<()> {
        let account = self.accounts.get_mut(&id).ok_or(StfError::UnknownService(id))?;
        account.preimages.insert(hash, blob);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_moves_balance_between_known_services() {
        let mut services = ServiceState::new();
        services.insert(1, ServiceAccount::new([0u8; 32], 100));
        services.insert(2, ServiceAccount::new([0u8; 32], 0));

        services.transfer(1, 2, 40).unwrap();

        assert_eq!(services.get(1).unwrap().balance, 60);
        assert_eq!(services.get(2).unwrap().balance, 40);
    }

    #[test]
    fn transfer_rejects_insufficient_funds_without_mutating_either_account() {
        let mut services = ServiceState::new();
        services.insert(1, ServiceAccount::new([0u8; 32], 10));
        services.insert(2, ServiceAccount::new([0u8; 32], 0));

        let err = services.transfer(1, 2, 50).unwrap_err();
        assert_eq!(err, StfError::InsufficientFunds(1));
        assert_eq!(services.get(1).unwrap().balance, 10);
        assert_eq!(services.get(2).unwrap().balance, 0);
    }

    #[test]
    fn transfer_rejects_unknown_destination() {
        let mut services = ServiceState::new();
        services.insert(1, ServiceAccount::new([0u8; 32], 10));
        let err = services.transfer(1, 2, 5).unwrap_err();
        assert_eq!(err, StfError::UnknownService(2));
    }
}
