use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

/// Entries of the interactive menu, numbered as they are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Deposit,
    Withdraw,
    Transfer,
    ViewBalance,
    ViewAllAccounts,
    Exit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 6] = [
        MenuChoice::Deposit,
        MenuChoice::Withdraw,
        MenuChoice::Transfer,
        MenuChoice::ViewBalance,
        MenuChoice::ViewAllAccounts,
        MenuChoice::Exit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MenuChoice::Deposit => "Deposit",
            MenuChoice::Withdraw => "Withdraw",
            MenuChoice::Transfer => "Transfer",
            MenuChoice::ViewBalance => "View Balance",
            MenuChoice::ViewAllAccounts => "View All Accounts",
            MenuChoice::Exit => "Exit",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Invalid choice. Please enter a number.")]
    NotANumber,
    #[error("Invalid choice")]
    UnknownChoice(u32),
    #[error("Invalid amount entered.")]
    InvalidAmount(String),
}

impl FromStr for MenuChoice {
    type Err = CommandError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let number: u32 = input.trim().parse().map_err(|_| CommandError::NotANumber)?;
        match number {
            1 => Ok(MenuChoice::Deposit),
            2 => Ok(MenuChoice::Withdraw),
            3 => Ok(MenuChoice::Transfer),
            4 => Ok(MenuChoice::ViewBalance),
            5 => Ok(MenuChoice::ViewAllAccounts),
            6 => Ok(MenuChoice::Exit),
            other => Err(CommandError::UnknownChoice(other)),
        }
    }
}

/// Parses a user supplied amount. The sign is kept, rejecting negative
/// values is up to the account.
pub fn parse_amount(input: &str) -> Result<Decimal, CommandError> {
    let input = input.trim();
    Decimal::from_str(input)
        .or_else(|_| Decimal::from_scientific(input))
        .map_err(|_| CommandError::InvalidAmount(input.to_string()))
}
