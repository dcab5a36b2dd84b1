use std::io::{Read, Write};

use thiserror::Error;

use crate::account::Account;

pub mod in_memory_store;
pub mod json_file_store;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to access account store `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Account store `{path}` is malformed: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Persistence seam for the account registry.
///
/// Saving always replaces the whole snapshot, there is no incremental
/// or append mode.
pub trait AccountStore {
    /// Returns every persisted record, including malformed ones.
    /// A store that was never written yields an empty list.
    fn load(&self) -> Result<Vec<Account>, PersistenceError>;

    fn persist(&mut self, accounts: &[Account]) -> Result<(), PersistenceError>;
}

/// Reads a JSON array of account records.
pub fn read_accounts<R: Read>(source: R) -> Result<Vec<Account>, serde_json::Error> {
    serde_json::from_reader(source)
}

/// Writes accounts as a pretty-printed JSON array.
pub fn write_accounts<W: Write>(output: W, accounts: &[Account]) -> Result<(), serde_json::Error> {
    serde_json::to_writer_pretty(output, accounts)
}
