use bank_ledger::{
    account::Account,
    bin_utils::Shell,
    registry::AccountRegistry,
    store::in_memory_store::InMemoryAccountStore,
    transfer::ordered_lock_coordinator::OrderedLockCoordinator,
};
use rust_decimal::Decimal;

const SESSION: &str = "   
Alice
1
100
2
abc
2
500
3
999
3
500
30
3
301
1
x
9
4
5
6
";

fn registry_with_bob() -> AccountRegistry<InMemoryAccountStore> {
    let store = InMemoryAccountStore::with_accounts(vec![Account::with_balance(
        "Bob",
        "500",
        Decimal::from(50),
    )]);
    // a single free number makes the session account predictable
    AccountRegistry::load(store, 301..302).unwrap()
}

fn run_session(
    input: &str,
    registry: &mut AccountRegistry<InMemoryAccountStore>,
    save_on_exit: bool,
) -> String {
    let mut output = Vec::new();
    let shell = Shell {
        input: input.as_bytes(),
        output: &mut output,
        registry,
        coordinator: OrderedLockCoordinator::default(),
        save_on_exit,
    };
    shell.run().unwrap();
    String::from_utf8(output).unwrap()
}

#[test]
fn interactive_session() {
    let mut registry = registry_with_bob();
    let output = run_session(SESSION, &mut registry, true);
    let lines: Vec<&str> = output.lines().collect();

    for expected in [
        "Account name must not be empty",
        "Account created successfully!",
        "100 successfully deposited in account 301.",
        "Invalid amount entered.",
        "Insufficient funds: requested 500, available 100",
        "Recipient account not found.",
        "Transferred 30 from 301 to 500",
        "Cannot transfer from account 301 to itself",
        "Invalid choice. Please enter a number.",
        "Invalid choice",
        "Balance: 70",
        "Name: Alice, AccNo: 301, Balance: 70",
        "Name: Bob, AccNo: 500, Balance: 80",
        "Exiting application...",
    ] {
        assert!(
            lines.iter().any(|line| line.ends_with(expected)),
            "missing `{expected}` in:\n{output}"
        );
    }

    // saved once on creation and once on exit
    let store = registry.store();
    assert_eq!(store.persist_count, 2);
    assert_eq!(
        store.accounts,
        vec![
            Account::with_balance("Bob", "500", Decimal::from(80)),
            Account::with_balance("Alice", "301", Decimal::from(70)),
        ]
    );
}

#[test]
fn end_of_input_exits_cleanly() {
    let mut registry = registry_with_bob();
    let output = run_session("Alice\n1\n25\n3\n500\n", &mut registry, true);

    assert!(output.contains("25 successfully deposited in account 301."));
    assert!(output.ends_with("Exiting application...\n"));
    assert_eq!(
        registry.find_by_account_number("301").unwrap().balance(),
        Decimal::from(25)
    );
    assert_eq!(registry.store().persist_count, 2);
}

#[test]
fn no_save_on_exit_keeps_creation_snapshot() {
    let mut registry = registry_with_bob();
    run_session("Alice\n1\n10\n6\n", &mut registry, false);

    let store = registry.store();
    assert_eq!(store.persist_count, 1);
    assert_eq!(store.accounts[1], Account::new("Alice", "301"));
}

#[test]
fn no_name_creates_nothing() {
    let mut registry = registry_with_bob();
    let output = run_session("", &mut registry, true);

    assert!(output.contains("No name entered"));
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.store().persist_count, 0);
}
