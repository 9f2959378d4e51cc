use std::sync::Arc;

use crate::{
    common::{
        clock::{Clock, SystemClock},
        error::AppError,
        event::WalletCommand,
    },
    domain::{ledger::Ledger, savings_box::SavingsBox, transaction::Transaction},
    worker::handlers::{
        BoxMovement, create_box, delete_box, delete_transactions, deposit, fund_box, transfer,
        withdraw_box,
    },
};

/// What a successfully applied command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Recorded(Transaction),
    BoxCreated(SavingsBox),
    BoxMoved(BoxMovement),
    TransactionsDeleted(usize),
    BoxDeleted(SavingsBox),
    BoxClosed {
        savings_box: SavingsBox,
        sweep: Option<Transaction>,
    },
}

pub struct Processor {
    clock: Arc<dyn Clock>,
}

impl Default for Processor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processor").finish_non_exhaustive()
    }
}

impl Processor {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Apply `command` to `ledger`. On error the ledger is unchanged.
    pub fn process(&self, ledger: &mut Ledger, command: WalletCommand) -> Result<Outcome, AppError> {
        let now = self.clock.now();

        let outcome = match command {
            WalletCommand::Deposit {
                amount,
                description,
            } => Outcome::Recorded(deposit::handle(ledger, now, amount, &description)?),
            WalletCommand::Transfer {
                amount,
                description,
            } => Outcome::Recorded(transfer::handle(ledger, now, amount, &description)?),
            WalletCommand::DeleteTransactions { ids } => {
                Outcome::TransactionsDeleted(delete_transactions::handle(ledger, &ids))
            }
            WalletCommand::CreateBox { name } => {
                Outcome::BoxCreated(create_box::handle(ledger, now, &name)?)
            }
            WalletCommand::FundBox { target, amount } => {
                Outcome::BoxMoved(fund_box::handle(ledger, now, &target, amount)?)
            }
            WalletCommand::WithdrawFromBox { target, amount } => {
                Outcome::BoxMoved(withdraw_box::handle(ledger, now, &target, amount)?)
            }
            WalletCommand::DeleteBox { target } => {
                Outcome::BoxDeleted(delete_box::handle(ledger, &target)?)
            }
            WalletCommand::CloseBox { target } => {
                let (savings_box, sweep) = delete_box::close(ledger, now, &target)?;
                Outcome::BoxClosed { savings_box, sweep }
            }
        };

        tracing::debug!("applied wallet command: {outcome:?}");
        Ok(outcome)
    }
}
