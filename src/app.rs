use std::{
    io::{Read, Write},
    path::PathBuf,
};

use clap::{Parser, Subcommand};

use crate::{
    common::{
        config::{DEFAULT_COMMIT_RETRIES, WalletConfig},
        error::AppError,
        event::WalletCommand,
        money::Money,
    },
    io::{reader, writer},
    store::{KeyValueStore, SqliteStore},
    wallet::Wallet,
    worker::processor::Outcome,
};

/// A personal wallet with savings boxes, stored in SQLite.
#[derive(Parser, Debug)]
#[command(name = "wallet", version, long_about = None)]
pub struct Cli {
    /// File path to the wallet SQLite database.
    #[arg(long)]
    pub db_path: PathBuf,

    /// Main balance of a wallet that has never been written to.
    #[arg(long, default_value = "0.00")]
    pub opening_balance: Money,

    /// How often a commit that lost a race with another writer is retried.
    #[arg(long, default_value_t = DEFAULT_COMMIT_RETRIES)]
    pub commit_retries: u32,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add money to the main balance.
    Deposit { amount: Money, description: String },
    /// Send money out of the main balance.
    Transfer { amount: Money, description: String },
    /// Remove history entries. The balance is left as is.
    DeleteTransactions {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    CreateBox { name: String },
    /// Move money from the main balance into a box (by id or name).
    FundBox { target: String, amount: Money },
    /// Move money from a box back to the main balance.
    WithdrawBox { target: String, amount: Money },
    /// Delete an empty box.
    DeleteBox { target: String },
    /// Return a box's money to the main balance, then delete it.
    CloseBox { target: String },
    Balance,
    /// Print the history as CSV, most recent first.
    History,
    /// Print the boxes as CSV.
    Boxes,
    /// Apply every command of a CSV script, then print the history.
    Run { script: PathBuf },
}

impl Command {
    fn into_wallet_command(self) -> Option<WalletCommand> {
        match self {
            Command::Deposit {
                amount,
                description,
            } => Some(WalletCommand::Deposit {
                amount,
                description,
            }),
            Command::Transfer {
                amount,
                description,
            } => Some(WalletCommand::Transfer {
                amount,
                description,
            }),
            Command::DeleteTransactions { ids } => Some(WalletCommand::DeleteTransactions { ids }),
            Command::CreateBox { name } => Some(WalletCommand::CreateBox { name }),
            Command::FundBox { target, amount } => Some(WalletCommand::FundBox { target, amount }),
            Command::WithdrawBox { target, amount } => {
                Some(WalletCommand::WithdrawFromBox { target, amount })
            }
            Command::DeleteBox { target } => Some(WalletCommand::DeleteBox { target }),
            Command::CloseBox { target } => Some(WalletCommand::CloseBox { target }),
            Command::Balance | Command::History | Command::Boxes | Command::Run { .. } => None,
        }
    }
}

/// Open the database named on the command line and run its command.
pub fn run<W: Write>(cli: Cli, out: W) -> Result<(), AppError> {
    let config = WalletConfig::default()
        .with_opening_balance(cli.opening_balance)?
        .with_commit_retries(cli.commit_retries);
    let store = SqliteStore::open(&cli.db_path)?;
    let wallet = Wallet::new(store, config);

    dispatch(&wallet, cli.command, out)
}

/// Run one command against `wallet`, writing its result to `out`.
pub fn dispatch<S: KeyValueStore, W: Write>(
    wallet: &Wallet<S>,
    command: Command,
    mut out: W,
) -> Result<(), AppError> {
    match command {
        Command::Balance => {
            writeln!(out, "{}", wallet.balance()?)?;
        }
        Command::History => {
            let ledger = wallet.snapshot()?;
            writer::write_history(out, ledger.history())?;
        }
        Command::Boxes => {
            writer::write_boxes(out, &wallet.list_boxes()?)?;
        }
        Command::Run { script } => {
            let file = std::fs::File::open(&script)?;
            run_script(wallet, file, out)?;
        }
        command => {
            let command = command
                .into_wallet_command()
                .ok_or_else(|| AppError::Process("not a wallet command".to_owned()))?;
            write_outcome(out, wallet.execute(command)?)?;
        }
    }

    Ok(())
}

fn write_outcome<W: Write>(mut out: W, outcome: Outcome) -> Result<(), AppError> {
    match outcome {
        Outcome::Recorded(tx) => writer::write_history(out, [&tx])?,
        Outcome::BoxCreated(savings_box) | Outcome::BoxDeleted(savings_box) => {
            writer::write_boxes(out, &[savings_box])?
        }
        Outcome::BoxMoved(movement) => writer::write_boxes(out, &[movement.savings_box])?,
        Outcome::BoxClosed { savings_box, sweep } => {
            let returned = sweep.map(|tx| tx.amount).unwrap_or_default();
            writeln!(
                out,
                "closed box {} ({}), {returned} returned to the main balance",
                savings_box.id, savings_box.name
            )?;
        }
        Outcome::TransactionsDeleted(count) => {
            writeln!(out, "deleted {count} transaction(s)")?;
        }
    }

    Ok(())
}

/// Apply each command of a CSV script in order, then write the resulting
/// history.
///
/// Stops at the first row that fails to parse or apply. Rows before it stay
/// committed.
pub fn run_script<S, R, W>(wallet: &Wallet<S>, input: R, out: W) -> Result<(), AppError>
where
    S: KeyValueStore,
    R: Read,
    W: Write,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);
    let commands = reader::read_commands(&mut reader);

    for (row, command) in commands.enumerate() {
        let command = command.map_err(|e| AppError::Parse(format!("row {}: {e}", row + 1)))?;
        wallet.execute(command)?;
    }

    // After applying the script, write the history to `out`
    let ledger = wallet.snapshot()?;
    writer::write_history(out, ledger.history())?;

    Ok(())
}
