use crate::account::Account;

use super::{AccountStore, PersistenceError};

/// Keeps the last persisted snapshot in memory.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAccountStore {
    pub accounts: Vec<Account>,
    pub persist_count: usize,
}

impl InMemoryAccountStore {
    pub fn with_accounts(accounts: Vec<Account>) -> Self {
        Self {
            accounts,
            persist_count: 0,
        }
    }
}

impl AccountStore for InMemoryAccountStore {
    fn load(&self) -> Result<Vec<Account>, PersistenceError> {
        Ok(self.accounts.clone())
    }

    fn persist(&mut self, accounts: &[Account]) -> Result<(), PersistenceError> {
        self.accounts = accounts.to_vec();
        self.persist_count += 1;
        Ok(())
    }
}
