use std::{
    fmt,
    sync::{Mutex, MutexGuard, PoisonError, TryLockError},
    time::{Duration, Instant},
};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type AccountNumber = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionAction {
    Deposit,
    Withdraw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountEventKind {
    Deposited,
    Withdrawn,
}

/// Confirmation of a validated balance change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountEvent {
    pub account_number: AccountNumber,
    pub amount: Decimal,
    pub kind: AccountEventKind,
}

impl fmt::Display for AccountEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            AccountEventKind::Deposited => write!(
                f,
                "{} successfully deposited in account {}.",
                self.amount, self.account_number
            ),
            AccountEventKind::Withdrawn => write!(
                f,
                "{} successfully withdrawn from account {}.",
                self.amount, self.account_number
            ),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("You cannot {} a negative amount ({amount})", verb(.action))]
    InvalidAmount {
        action: TransactionAction,
        amount: Decimal,
    },
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        requested: Decimal,
        available: Decimal,
    },
    #[error("Depositing {amount} would overflow the balance of account {account_number}")]
    BalanceOverflow {
        account_number: AccountNumber,
        amount: Decimal,
    },
}

fn verb(action: &TransactionAction) -> &'static str {
    match action {
        TransactionAction::Deposit => "deposit",
        TransactionAction::Withdraw => "withdraw",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(default)]
    name: String,
    #[serde(default)]
    account_number: AccountNumber,
    // exact JSON number, no f64 round trip
    #[serde(default, with = "rust_decimal::serde::arbitrary_precision")]
    balance: Decimal,
}

impl Account {
    pub fn new(name: impl Into<String>, account_number: impl Into<AccountNumber>) -> Self {
        Self::with_balance(name, account_number, Decimal::ZERO)
    }

    pub fn with_balance(
        name: impl Into<String>,
        account_number: impl Into<AccountNumber>,
        balance: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            account_number: account_number.into(),
            balance,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn account_number(&self) -> &str {
        &self.account_number
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Records loaded from disk may carry blank identity fields or a
    /// negative balance.
    pub fn is_well_formed(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.account_number.trim().is_empty()
            && self.balance >= Decimal::ZERO
    }

    /// Strips surrounding whitespace from name and account number.
    pub fn into_trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            account_number: self.account_number.trim().to_string(),
            balance: self.balance,
        }
    }

    pub fn deposit(&mut self, amount: Decimal) -> Result<AccountEvent, AccountError> {
        self.execute(TransactionAction::Deposit, amount)
    }

    pub fn withdraw(&mut self, amount: Decimal) -> Result<AccountEvent, AccountError> {
        self.execute(TransactionAction::Withdraw, amount)
    }

    fn execute(
        &mut self,
        action: TransactionAction,
        amount: Decimal,
    ) -> Result<AccountEvent, AccountError> {
        let event = self.handle_transaction(action, amount)?;
        self.apply(&event);
        tracing::info!(account = %self.account_number, balance = %self.balance, "{event}");
        Ok(event)
    }

    /// Validates a balance change without touching the account.
    pub fn handle_transaction(
        &self,
        action: TransactionAction,
        amount: Decimal,
    ) -> Result<AccountEvent, AccountError> {
        if amount < Decimal::ZERO {
            return Err(AccountError::InvalidAmount { action, amount });
        }

        let kind = match action {
            TransactionAction::Deposit => {
                if self.balance.checked_add(amount).is_none() {
                    return Err(AccountError::BalanceOverflow {
                        account_number: self.account_number.clone(),
                        amount,
                    });
                }
                AccountEventKind::Deposited
            }
            TransactionAction::Withdraw => {
                if amount > self.balance {
                    return Err(AccountError::InsufficientFunds {
                        requested: amount,
                        available: self.balance,
                    });
                }
                AccountEventKind::Withdrawn
            }
        };

        Ok(AccountEvent {
            account_number: self.account_number.clone(),
            amount,
            kind,
        })
    }

    /// Events are produced by [`Account::handle_transaction`] and are not validated again.
    pub fn apply(&mut self, event: &AccountEvent) {
        match event.kind {
            AccountEventKind::Deposited => self.balance += event.amount,
            AccountEventKind::Withdrawn => self.balance -= event.amount,
        }
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Name: {}, AccNo: {}, Balance: {}",
            self.name, self.account_number, self.balance
        )
    }
}

/// Shared, individually locked account.
///
/// The account number never changes after creation, so it is kept outside
/// the mutex and can be read to decide lock order without locking.
#[derive(Debug)]
pub struct AccountHandle {
    account_number: AccountNumber,
    inner: Mutex<Account>,
}

impl AccountHandle {
    pub fn new(account: Account) -> Self {
        Self {
            account_number: account.account_number.clone(),
            inner: Mutex::new(account),
        }
    }

    pub fn account_number(&self) -> &str {
        &self.account_number
    }

    /// Blocks until the account is free.
    ///
    /// A poisoned lock is recovered: the balance only changes in
    /// [`Account::apply`] after validation, so it is never half written.
    pub fn lock(&self) -> MutexGuard<'_, Account> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Waits at most `timeout` for the account, `None` when it stayed busy.
    pub fn lock_timeout(&self, timeout: Duration) -> Option<MutexGuard<'_, Account>> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.inner.try_lock() {
                Ok(guard) => return Some(guard),
                Err(TryLockError::Poisoned(poisoned)) => return Some(poisoned.into_inner()),
                Err(TryLockError::WouldBlock) => {
                    if Instant::now() >= deadline {
                        return None;
                    }
                    std::thread::sleep(Duration::from_micros(100));
                }
            }
        }
    }

    pub fn snapshot(&self) -> Account {
        self.lock().clone()
    }

    pub fn balance(&self) -> Decimal {
        self.lock().balance()
    }

    pub fn deposit(&self, amount: Decimal) -> Result<AccountEvent, AccountError> {
        self.lock().deposit(amount)
    }

    pub fn withdraw(&self, amount: Decimal) -> Result<AccountEvent, AccountError> {
        self.lock().withdraw(amount)
    }
}
