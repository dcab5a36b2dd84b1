use std::cmp::Ordering;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::account::{AccountError, AccountEvent, AccountHandle, AccountNumber};

pub mod ordered_lock_coordinator;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error(transparent)]
    AccountErr(#[from] AccountError),
    #[error("Cannot transfer from account {0} to itself")]
    SameAccount(AccountNumber),
    #[error("Timed out waiting for the lock on account {0}")]
    LockTimeout(AccountNumber),
}

/// Both halves of a committed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub withdrawn: AccountEvent,
    pub deposited: AccountEvent,
}

impl TransferReceipt {
    pub fn amount(&self) -> Decimal {
        self.withdrawn.amount
    }
}

pub trait TransferCoordinator {
    /// Moves `amount` from `from` to `to` as one step.
    ///
    /// On error no balance has changed.
    fn transfer(
        &self,
        from: &AccountHandle,
        to: &AccountHandle,
        amount: Decimal,
    ) -> Result<TransferReceipt, TransferError>;
}

/// Total order used to lock accounts.
///
/// Numeric account numbers come first, ordered by value and then by
/// spelling. Anything else follows in byte order. Every pair of distinct
/// numbers has a single winner regardless of transfer direction.
pub fn lock_order(a: &str, b: &str) -> Ordering {
    lock_key(a).cmp(&lock_key(b))
}

fn lock_key(number: &str) -> (bool, u64, &str) {
    match number.parse::<u64>() {
        Ok(value) => (false, value, number),
        Err(_) => (true, 0, number),
    }
}
