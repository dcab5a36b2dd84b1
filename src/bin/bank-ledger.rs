use std::io::{stdin, stdout};

use anyhow::{Context, Result};
use bank_ledger::{
    bin_utils::Shell, config::Config, registry::AccountRegistry,
    store::json_file_store::JsonFileStore,
    transfer::ordered_lock_coordinator::OrderedLockCoordinator,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "bank_ledger=info".into()))
        // stdout belongs to the interactive menu
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let mut config = Config::from_env().context("Invalid configuration")?;
    if let Some(path) = std::env::args().nth(1) {
        config.store_path = path.into();
    }

    let store = JsonFileStore::new(&config.store_path);
    let mut registry = AccountRegistry::load(store, config.account_numbers.clone())
        .with_context(|| {
            format!(
                "Failed to load accounts from `{}`, fix or remove the file to continue",
                config.store_path.display()
            )
        })?;

    let shell = Shell {
        input: stdin().lock(),
        output: &mut stdout(),
        registry: &mut registry,
        coordinator: OrderedLockCoordinator::new(config.lock_timeout),
        save_on_exit: config.save_on_exit,
    };
    shell.run()
}
