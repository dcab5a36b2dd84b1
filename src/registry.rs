use std::{collections::HashSet, ops::Range, sync::Arc};

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    account::{Account, AccountHandle, AccountNumber},
    store::{AccountStore, PersistenceError},
};

/// Random draws tried before falling back to picking among the free numbers.
const MAX_RANDOM_ATTEMPTS: usize = 32;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Account name must not be empty")]
    InvalidName,
    #[error("Initial balance must not be negative ({0})")]
    InvalidInitialBalance(Decimal),
    #[error("Account `{0}` not found")]
    AccountNotFound(AccountNumber),
    #[error("All account numbers in {}..{} are taken", .0.start, .0.end)]
    AccountNumbersExhausted(Range<u32>),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// The authoritative set of accounts, backed by an [`AccountStore`].
///
/// Holds exactly one [`AccountHandle`] per account number. Accounts keep
/// their creation (or load) order.
pub struct AccountRegistry<S> {
    store: S,
    accounts: Vec<Arc<AccountHandle>>,
    account_numbers: Range<u32>,
    rng: StdRng,
}

impl<S> AccountRegistry<S>
where
    S: AccountStore,
{
    pub fn load(store: S, account_numbers: Range<u32>) -> Result<Self, RegistryError> {
        Self::load_with_rng(store, account_numbers, StdRng::from_entropy())
    }

    pub fn load_with_rng(
        store: S,
        account_numbers: Range<u32>,
        rng: StdRng,
    ) -> Result<Self, RegistryError> {
        let records = store.load()?;
        let mut seen = HashSet::new();
        let mut accounts = Vec::with_capacity(records.len());
        for record in records {
            let record = record.into_trimmed();
            if !record.is_well_formed() {
                tracing::warn!(
                    name = record.name(),
                    account = record.account_number(),
                    balance = %record.balance(),
                    "Dropping stored account with blank name, blank number or negative balance"
                );
                continue;
            }
            if !seen.insert(record.account_number().to_string()) {
                tracing::warn!(
                    account = record.account_number(),
                    "Dropping duplicate stored account"
                );
                continue;
            }
            accounts.push(Arc::new(AccountHandle::new(record)));
        }
        tracing::info!(accounts = accounts.len(), "Account registry loaded");

        Ok(Self {
            store,
            accounts,
            account_numbers,
            rng,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Copies every account out, holding one account lock at a time.
    pub fn snapshot(&self) -> Vec<Account> {
        self.accounts.iter().map(|acc| acc.snapshot()).collect()
    }

    pub fn find_by_account_number(
        &self,
        number: &str,
    ) -> Result<Arc<AccountHandle>, RegistryError> {
        let number = number.trim();
        self.accounts
            .iter()
            .find(|acc| acc.account_number() == number)
            .cloned()
            .ok_or_else(|| RegistryError::AccountNotFound(number.to_string()))
    }

    /// Draws a random unused number from the configured range.
    ///
    /// Fails instead of looping forever once every number is taken.
    pub fn generate_account_number(&mut self) -> Result<AccountNumber, RegistryError> {
        let range = self.account_numbers.clone();
        let taken: HashSet<&str> = self
            .accounts
            .iter()
            .map(|acc| acc.account_number())
            .collect();
        // "0301" does not occupy 301
        let taken_in_range = taken
            .iter()
            .filter_map(|number| {
                number
                    .parse::<u32>()
                    .ok()
                    .filter(|n| n.to_string() == *number)
            })
            .filter(|n| range.contains(n))
            .count();
        if range.is_empty() || taken_in_range >= range.len() {
            return Err(RegistryError::AccountNumbersExhausted(range));
        }

        for _ in 0..MAX_RANDOM_ATTEMPTS {
            let candidate = self.rng.gen_range(range.clone()).to_string();
            if !taken.contains(candidate.as_str()) {
                return Ok(candidate);
            }
        }

        // the range is nearly full, pick among what is left
        let free: Vec<u32> = range
            .clone()
            .filter(|n| !taken.contains(n.to_string().as_str()))
            .collect();
        free.choose(&mut self.rng)
            .map(ToString::to_string)
            .ok_or(RegistryError::AccountNumbersExhausted(range))
    }

    /// Opens a new account and persists the whole registry.
    ///
    /// If saving fails the account is removed again, so memory never holds
    /// an account the store does not know about.
    pub fn create_account(
        &mut self,
        name: &str,
        initial_balance: Decimal,
    ) -> Result<Arc<AccountHandle>, RegistryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegistryError::InvalidName);
        }
        if initial_balance < Decimal::ZERO {
            return Err(RegistryError::InvalidInitialBalance(initial_balance));
        }

        let number = self.generate_account_number()?;
        let handle = Arc::new(AccountHandle::new(Account::with_balance(
            name,
            number.clone(),
            initial_balance,
        )));
        self.accounts.push(Arc::clone(&handle));

        if let Err(err) = self.persist() {
            self.accounts.pop();
            return Err(err);
        }
        tracing::info!(account = %number, name, "Account created");
        Ok(handle)
    }

    /// Overwrites the store with the current state of every account.
    pub fn persist(&mut self) -> Result<(), RegistryError> {
        let snapshot = self.snapshot();
        self.store.persist(&snapshot)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::store::in_memory_store::InMemoryAccountStore;

    use super::*;

    fn registry(
        accounts: Vec<Account>,
        range: Range<u32>,
    ) -> AccountRegistry<InMemoryAccountStore> {
        AccountRegistry::load_with_rng(
            InMemoryAccountStore::with_accounts(accounts),
            range,
            StdRng::seed_from_u64(7),
        )
        .unwrap()
    }

    #[test]
    fn load_filters_malformed_and_duplicate_records() {
        let reg = registry(
            vec![
                Account::with_balance("Alice", "301", Decimal::from(10)),
                Account::new("", "302"),
                Account::new("Bob", "   "),
                Account::with_balance("Mallory", "301", Decimal::from(99)),
            ],
            300..1000,
        );
        assert_eq!(reg.len(), 1);
        let alice = reg.find_by_account_number("301").unwrap();
        assert_eq!(alice.snapshot().name(), "Alice");
        assert_eq!(alice.balance(), Decimal::from(10));
    }

    #[test]
    fn load_drops_negative_balance() {
        let reg = registry(
            vec![
                Account::with_balance("Neg", "301", Decimal::from(-50)),
                Account::with_balance("Zero", "302", Decimal::ZERO),
            ],
            300..1000,
        );
        assert_eq!(reg.len(), 1);
        assert!(reg.find_by_account_number("301").is_err());
        assert!(reg.snapshot().iter().all(|acc| acc.balance() >= Decimal::ZERO));
    }

    #[test]
    fn load_trims_account_numbers() {
        let reg = registry(
            vec![
                Account::with_balance(" Alice ", " 301", Decimal::from(10)),
                Account::with_balance("Mallory", "301 ", Decimal::from(99)),
            ],
            300..1000,
        );
        assert_eq!(reg.len(), 1);
        let alice = reg.find_by_account_number("301").unwrap();
        assert_eq!(alice.account_number(), "301");
        assert_eq!(
            alice.snapshot(),
            Account::with_balance("Alice", "301", Decimal::from(10))
        );
    }

    #[test]
    fn create_account_persists_registry() {
        let mut reg = registry(vec![], 300..1000);
        let acc = reg.create_account("  Alice ", Decimal::ZERO).unwrap();

        let snapshot = acc.snapshot();
        assert_eq!(snapshot.name(), "Alice");
        assert_eq!(snapshot.balance(), Decimal::ZERO);
        let number: u32 = snapshot.account_number().parse().unwrap();
        assert!((300..1000).contains(&number));

        assert_eq!(reg.store().persist_count, 1);
        assert_eq!(reg.store().accounts, vec![snapshot]);

        reg.create_account("Bob", Decimal::from(50)).unwrap();
        assert_eq!(reg.store().persist_count, 2);
        assert_eq!(reg.store().accounts.len(), 2);
    }

    #[test]
    fn create_account_rejects_blank_name() {
        let mut reg = registry(vec![], 300..1000);
        assert!(matches!(
            reg.create_account(" \t", Decimal::ZERO),
            Err(RegistryError::InvalidName)
        ));
        assert!(matches!(
            reg.create_account("Alice", Decimal::from(-1)),
            Err(RegistryError::InvalidInitialBalance(_))
        ));
        assert!(reg.is_empty());
        assert_eq!(reg.store().persist_count, 0);
    }

    #[test]
    fn narrow_range_yields_distinct_numbers_then_fails() {
        let mut reg = registry(vec![], 300..305);
        let mut numbers = HashSet::new();
        for i in 0..5 {
            let acc = reg.create_account(&format!("user{i}"), Decimal::ZERO).unwrap();
            assert!(numbers.insert(acc.account_number().to_string()));
        }
        assert_eq!(numbers.len(), 5);

        let err = reg.create_account("one too many", Decimal::ZERO).unwrap_err();
        assert!(matches!(err, RegistryError::AccountNumbersExhausted(r) if r == (300..305)));
        assert_eq!(reg.len(), 5);
    }

    #[test]
    fn numbers_outside_range_do_not_count_as_taken() {
        let mut reg = registry(
            vec![Account::new("Legacy", "42"), Account::new("Padded", "0300")],
            300..301,
        );
        assert_eq!(reg.generate_account_number().unwrap(), "300");
    }

    #[test]
    fn empty_range_is_exhausted() {
        let mut reg = registry(vec![], 300..300);
        assert!(matches!(
            reg.generate_account_number(),
            Err(RegistryError::AccountNumbersExhausted(_))
        ));
    }

    #[test]
    fn find_unknown_account() {
        let reg = registry(vec![Account::new("Alice", "301")], 300..1000);
        assert!(reg.find_by_account_number(" 301\n").is_ok());
        let err = reg.find_by_account_number("999").unwrap_err();
        assert_eq!(err.to_string(), "Account `999` not found");
    }

    #[test]
    fn persist_writes_current_balances() {
        let mut reg = registry(vec![Account::new("Alice", "301")], 300..1000);
        reg.find_by_account_number("301")
            .unwrap()
            .deposit(Decimal::from(25))
            .unwrap();
        reg.persist().unwrap();
        assert_eq!(reg.store().accounts[0].balance(), Decimal::from(25));
    }
}
