//! Runtime settings, read from environment variables.

use std::{env, ops::Range, path::PathBuf, time::Duration};

use thiserror::Error;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// JSON file holding every account
    pub store_path: PathBuf,

    /// New account numbers are drawn from this range
    pub account_numbers: Range<u32>,

    /// Upper bound on waiting for an account lock during a transfer.
    /// `None` waits as long as needed.
    pub lock_timeout: Option<Duration>,

    /// Save all balances when the shell exits
    pub save_on_exit: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("account.json"),
            account_numbers: 300..1000,
            lock_timeout: None,
            save_on_exit: true,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: `{1}`")]
    InvalidValue(&'static str, String),

    #[error("Account number range {min}..{max} is empty")]
    EmptyAccountNumberRange { min: u32, max: u32 },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, falling back to
    /// [`Config::default`] for unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let store_path = lookup("BANK_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.store_path);

        let min =
            parse(&lookup, "BANK_ACCOUNT_NUMBER_MIN")?.unwrap_or(defaults.account_numbers.start);
        let max =
            parse(&lookup, "BANK_ACCOUNT_NUMBER_MAX")?.unwrap_or(defaults.account_numbers.end);
        if min >= max {
            return Err(ConfigError::EmptyAccountNumberRange { min, max });
        }

        let lock_timeout =
            parse::<u64, _>(&lookup, "BANK_LOCK_TIMEOUT_MS")?.map(Duration::from_millis);

        let save_on_exit = parse(&lookup, "BANK_SAVE_ON_EXIT")?.unwrap_or(defaults.save_on_exit);

        Ok(Self {
            store_path,
            account_numbers: min..max,
            lock_timeout,
            save_on_exit,
        })
    }
}

fn parse<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key, value.clone()))
        })
        .transpose()
}
