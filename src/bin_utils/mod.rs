//! Interactive menu around the ledger. Generic over its input and output
//! so the binary can run it on a terminal and tests on byte buffers.

use std::{
    io::{BufRead, Write},
    sync::Arc,
};

use anyhow::{Context, Result};
use rust_decimal::Decimal;

use crate::{
    account::{AccountError, AccountEvent, AccountHandle},
    command::{MenuChoice, parse_amount},
    registry::{AccountRegistry, RegistryError},
    store::AccountStore,
    transfer::{TransferCoordinator, ordered_lock_coordinator::OrderedLockCoordinator},
};
use printer::{print_accounts, print_menu};
use prompt::ask;

pub mod printer;
pub mod prompt;

enum Flow {
    Continue,
    Exit,
}

pub struct Shell<'w, R, W: 'w, S> {
    pub input: R,
    pub output: &'w mut W,
    pub registry: &'w mut AccountRegistry<S>,
    pub coordinator: OrderedLockCoordinator,
    pub save_on_exit: bool,
}

impl<'w, R, W, S> Shell<'w, R, W, S>
where
    R: BufRead,
    W: Write + 'w,
    S: AccountStore,
{
    /// Opens an account for the session user, then serves the menu until
    /// the user exits or the input ends.
    pub fn run(mut self) -> Result<()> {
        let Some(account) = self.open_session_account()? else {
            writeln!(self.output, "\nNo name entered, exiting.")?;
            return Ok(());
        };
        writeln!(self.output, "\nAccount created successfully!")?;
        print_accounts(self.output, self.registry.snapshot().into_iter())?;

        loop {
            print_menu(self.output)?;
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                break;
            }
            let choice = match line.parse::<MenuChoice>() {
                Ok(choice) => choice,
                Err(err) => {
                    writeln!(self.output, "{err}")?;
                    continue;
                }
            };
            if let Flow::Exit = self.handle_choice(&account, choice)? {
                break;
            }
        }

        writeln!(self.output, "Exiting application...")?;
        if self.save_on_exit {
            self.registry
                .persist()
                .context("Failed to save accounts on exit")?;
        }
        Ok(())
    }

    fn open_session_account(&mut self) -> Result<Option<Arc<AccountHandle>>> {
        loop {
            let Some(name) = ask(
                &mut self.input,
                self.output,
                "Enter your name to create an account: ",
            )?
            else {
                return Ok(None);
            };
            match self.registry.create_account(&name, Decimal::ZERO) {
                Ok(account) => return Ok(Some(account)),
                Err(err @ RegistryError::InvalidName) => writeln!(self.output, "{err}")?,
                Err(err) => return Err(err).context("Failed to create account"),
            }
        }
    }

    fn handle_choice(&mut self, account: &AccountHandle, choice: MenuChoice) -> Result<Flow> {
        match choice {
            MenuChoice::Deposit => {
                if let Some(amount) = self.ask_amount("Enter deposit amount: ")? {
                    self.report(account.deposit(amount))?;
                }
            }
            MenuChoice::Withdraw => {
                if let Some(amount) = self.ask_amount("Enter withdraw amount: ")? {
                    self.report(account.withdraw(amount))?;
                }
            }
            MenuChoice::Transfer => self.transfer_from(account)?,
            MenuChoice::ViewBalance => writeln!(self.output, "Balance: {}", account.balance())?,
            MenuChoice::ViewAllAccounts => {
                print_accounts(self.output, self.registry.snapshot().into_iter())?
            }
            MenuChoice::Exit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }

    fn transfer_from(&mut self, account: &AccountHandle) -> Result<()> {
        let Some(number) = ask(
            &mut self.input,
            self.output,
            "Enter recipient account number: ",
        )?
        else {
            return Ok(());
        };
        let recipient = match self.registry.find_by_account_number(&number) {
            Ok(recipient) => recipient,
            Err(_) => {
                writeln!(self.output, "Recipient account not found.")?;
                return Ok(());
            }
        };
        let Some(amount) = self.ask_amount("Enter transfer amount: ")? else {
            return Ok(());
        };
        match self.coordinator.transfer(account, &recipient, amount) {
            Ok(receipt) => writeln!(
                self.output,
                "Transferred {} from {} to {}",
                receipt.amount(),
                receipt.withdrawn.account_number,
                receipt.deposited.account_number
            )?,
            Err(err) => writeln!(self.output, "{err}")?,
        }
        Ok(())
    }

    /// `None` when the input ended or the answer was not a number; the
    /// latter is reported to the user.
    fn ask_amount(&mut self, question: &str) -> Result<Option<Decimal>> {
        let Some(line) = ask(&mut self.input, self.output, question)? else {
            return Ok(None);
        };
        match parse_amount(&line) {
            Ok(amount) => Ok(Some(amount)),
            Err(err) => {
                writeln!(self.output, "{err}")?;
                Ok(None)
            }
        }
    }

    fn report(&mut self, result: Result<AccountEvent, AccountError>) -> Result<()> {
        match result {
            Ok(event) => writeln!(self.output, "{event}")?,
            Err(err) => writeln!(self.output, "{err}")?,
        }
        Ok(())
    }
}
