use std::{cmp::Ordering, sync::MutexGuard, time::Duration};

use rust_decimal::Decimal;

use crate::account::{Account, AccountHandle, TransactionAction};

use super::{TransferCoordinator, TransferError, TransferReceipt, lock_order};

/// Locks both accounts in [`lock_order`] and moves funds while holding both.
///
/// Two transfers running in opposite directions over the same pair lock
/// the pair in the same order, so neither can hold one account while
/// waiting for the other.
#[derive(Debug, Default, Clone)]
pub struct OrderedLockCoordinator {
    lock_timeout: Option<Duration>,
}

impl OrderedLockCoordinator {
    pub fn new(lock_timeout: Option<Duration>) -> Self {
        Self { lock_timeout }
    }

    fn acquire<'a>(
        &self,
        account: &'a AccountHandle,
    ) -> Result<MutexGuard<'a, Account>, TransferError> {
        let guard = match self.lock_timeout {
            Some(timeout) => account
                .lock_timeout(timeout)
                .ok_or_else(|| TransferError::LockTimeout(account.account_number().to_string()))?,
            None => account.lock(),
        };
        tracing::trace!(
            thread = ?std::thread::current().id(),
            account = account.account_number(),
            "acquired lock"
        );
        Ok(guard)
    }
}

impl TransferCoordinator for OrderedLockCoordinator {
    fn transfer(
        &self,
        from: &AccountHandle,
        to: &AccountHandle,
        amount: Decimal,
    ) -> Result<TransferReceipt, TransferError> {
        let (from_number, to_number) = (from.account_number(), to.account_number());
        if from_number == to_number {
            return Err(TransferError::SameAccount(from_number.to_string()));
        }

        tracing::debug!(from = from_number, to = to_number, %amount, "locking accounts");
        let from_first = lock_order(from_number, to_number) != Ordering::Greater;
        let (first, second) = if from_first { (from, to) } else { (to, from) };

        // guards drop in reverse declaration order, releasing `second` first
        let mut first_guard = self.acquire(first)?;
        let mut second_guard = self.acquire(second)?;
        let (from_acc, to_acc) = if from_first {
            (&mut *first_guard, &mut *second_guard)
        } else {
            (&mut *second_guard, &mut *first_guard)
        };

        tracing::trace!(from = from_number, to = to_number, "mutating");
        let outcome = from_acc
            .handle_transaction(TransactionAction::Withdraw, amount)
            .and_then(|withdrawn| {
                let deposited = to_acc.handle_transaction(TransactionAction::Deposit, amount)?;
                Ok((withdrawn, deposited))
            });

        match outcome {
            Ok((withdrawn, deposited)) => {
                from_acc.apply(&withdrawn);
                to_acc.apply(&deposited);
                tracing::info!(
                    from = from_number,
                    to = to_number,
                    %amount,
                    "Transferred {amount} from {from_number} to {to_number}"
                );
                Ok(TransferReceipt {
                    withdrawn,
                    deposited,
                })
            }
            Err(err) => {
                tracing::debug!(from = from_number, to = to_number, %err, "transfer failed");
                Err(err.into())
            }
        }
    }
}
