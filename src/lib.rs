/// A single account and its balance rules.
/// Balance changes are validated into events first and applied second.
pub mod account;

/// Parsing of menu choices and amounts typed by the user.
pub mod command;

/// Runtime settings taken from the environment.
pub mod config;

/// The in-memory set of accounts: number assignment, lookup and saving.
pub mod registry;

/// Persistence interface, plus JSON file and in-memory implementations.
pub mod store;

/// Moving funds between two accounts under ordered double locking.
///
/// NOTE: the trait is only implemented once, it marks the seam where a
/// different locking strategy could be swapped in.
pub mod transfer;

/// The interactive shell. It lives in the library so integration tests
/// can drive a whole session.
pub mod bin_utils;
