use std::io::Write;

use crate::{account::Account, command::MenuChoice};

pub fn print_accounts<W>(
    output: &mut W,
    accounts: impl Iterator<Item = Account>,
) -> anyhow::Result<()>
where
    W: Write,
{
    writeln!(output, "\n--- All Accounts ---")?;
    for acc in accounts {
        writeln!(output, "{acc}")?;
    }
    Ok(())
}

pub fn print_menu<W>(output: &mut W) -> anyhow::Result<()>
where
    W: Write,
{
    writeln!(output, "\nSelect an option:")?;
    for (idx, choice) in MenuChoice::ALL.iter().enumerate() {
        writeln!(output, "{}. {}", idx + 1, choice.label())?;
    }
    write!(output, "Choice: ")?;
    output.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn prints_one_line_per_account() {
        let mut output = Vec::new();
        print_accounts(
            &mut output,
            [
                Account::with_balance("Alice", "301", Decimal::from(70)),
                Account::new("Bob", "302"),
            ]
            .into_iter(),
        )
        .unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "\n--- All Accounts ---\n\
             Name: Alice, AccNo: 301, Balance: 70\n\
             Name: Bob, AccNo: 302, Balance: 0\n"
        );
    }

    #[test]
    fn menu_lists_every_choice() {
        let mut output = Vec::new();
        print_menu(&mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("1. Deposit\n"));
        assert!(text.contains("5. View All Accounts\n"));
        assert!(text.ends_with("6. Exit\nChoice: "));
    }
}
