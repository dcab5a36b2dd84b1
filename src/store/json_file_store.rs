use std::{
    fs::File,
    io::{BufReader, BufWriter, ErrorKind, Write},
    path::{Path, PathBuf},
};

use crate::account::Account;

use super::{AccountStore, PersistenceError, read_accounts, write_accounts};

/// Stores all accounts in a single pretty-printed JSON file.
///
/// Every save truncates and rewrites the file in place. A crash in the
/// middle of a write leaves a corrupted file behind, which is then
/// reported as [`PersistenceError::Malformed`] on the next start.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn malformed(&self, source: serde_json::Error) -> PersistenceError {
        PersistenceError::Malformed {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl AccountStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Account>, PersistenceError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::info!(
                    path = %self.path.display(),
                    "No account store yet, starting empty"
                );
                return Ok(Vec::new());
            }
            Err(err) => return Err(self.io_error(err)),
        };
        let accounts = read_accounts(BufReader::new(file)).map_err(|err| {
            if err.is_io() {
                self.io_error(err.into())
            } else {
                self.malformed(err)
            }
        })?;
        tracing::debug!(
            path = %self.path.display(),
            records = accounts.len(),
            "Loaded account store"
        );
        Ok(accounts)
    }

    fn persist(&mut self, accounts: &[Account]) -> Result<(), PersistenceError> {
        let file = File::create(&self.path).map_err(|err| self.io_error(err))?;
        let mut writer = BufWriter::new(file);
        write_accounts(&mut writer, accounts).map_err(|err| {
            if err.is_io() {
                self.io_error(err.into())
            } else {
                self.malformed(err)
            }
        })?;
        // Ensure all data is flushed to the file
        writer.flush().map_err(|err| self.io_error(err))?;
        tracing::debug!(
            path = %self.path.display(),
            records = accounts.len(),
            "Saved account store"
        );
        Ok(())
    }
}
