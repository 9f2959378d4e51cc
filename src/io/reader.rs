use crate::common::{event::WalletCommand, money::Money};
use std::{io::Read, str::FromStr};

#[derive(serde::Deserialize)]
/// Internal CSV row representation matching the script headers. Columns a
/// command does not use may be left empty.
struct CsvRow {
    command: String,
    target: Option<String>,
    amount: Option<String>,
    description: Option<String>,
}

impl CsvRow {
    fn target(&self, command: &str) -> Result<String, String> {
        self.target
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| format!("{command} missing target"))
    }

    fn amount(&self, command: &str) -> Result<Money, String> {
        let amt_str = self
            .amount
            .as_deref()
            .ok_or_else(|| format!("{command} missing amount"))?;
        Money::from_str(amt_str).map_err(|e| format!("{command} amount {amt_str:?}: {e}"))
    }

    fn description(&self) -> String {
        self.description.clone().unwrap_or_default()
    }
}

/// Reads wallet commands from a CSV script.
///
/// Supported headers: `command,target,amount,description`.
/// `target` holds a box id or name, a new box's name, or the transaction ids
/// to delete separated by `;`. Command names are matched case-insensitively
/// and accept `_` in place of `-`.
///
/// # Examples
///
/// ```
/// use wallet_ledger::io::reader::read_commands;
/// use wallet_ledger::common::event::WalletCommand;
/// use csv::ReaderBuilder;
///
/// let data = "command,target,amount,description\n\
/// deposit,,50.00,extra\n\
/// create-box,Trip,,\n\
/// fund-box,Trip,200,\n";
/// let mut rdr = ReaderBuilder::new().from_reader(data.as_bytes());
/// let commands: Vec<_> = read_commands(&mut rdr).collect();
///
/// assert!(matches!(commands[0], Ok(WalletCommand::Deposit { .. })));
/// assert!(matches!(commands[1], Ok(WalletCommand::CreateBox { .. })));
/// assert!(matches!(commands[2], Ok(WalletCommand::FundBox { .. })));
/// ```
pub fn read_commands<R: Read>(
    rdr: &mut csv::Reader<R>,
) -> impl Iterator<Item = Result<WalletCommand, String>> + '_ {
    rdr.deserialize::<CsvRow>().map(|res| {
        let row = res.map_err(|e| e.to_string())?;
        let kind = row.command.trim().to_ascii_lowercase().replace('_', "-");

        match kind.as_str() {
            "deposit" => Ok(WalletCommand::Deposit {
                amount: row.amount(&kind)?,
                description: row.description(),
            }),
            "transfer" => Ok(WalletCommand::Transfer {
                amount: row.amount(&kind)?,
                description: row.description(),
            }),
            "delete-transactions" => Ok(WalletCommand::DeleteTransactions {
                ids: row
                    .target(&kind)?
                    .split(';')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_owned)
                    .collect(),
            }),
            "create-box" => Ok(WalletCommand::CreateBox {
                name: row.target(&kind)?,
            }),
            "fund-box" => Ok(WalletCommand::FundBox {
                target: row.target(&kind)?,
                amount: row.amount(&kind)?,
            }),
            "withdraw-box" => Ok(WalletCommand::WithdrawFromBox {
                target: row.target(&kind)?,
                amount: row.amount(&kind)?,
            }),
            "delete-box" => Ok(WalletCommand::DeleteBox {
                target: row.target(&kind)?,
            }),
            "close-box" => Ok(WalletCommand::CloseBox {
                target: row.target(&kind)?,
            }),
            other => Err(format!("unknown command: {other}")),
        }
    })
}
