//! The single owner of the wallet records.
//!
//! Callers never touch the key-value store directly: every read goes through
//! [`Wallet::snapshot`] and every mutation through [`Wallet::execute`], which
//! reads the wallet records, applies the command to an in-memory [`Ledger`],
//! and commits the changed records in one version-checked batch.

use std::sync::Arc;

use crate::{
    common::{
        clock::Clock, config::WalletConfig, error::AppError, event::WalletCommand, money::Money,
    },
    domain::{ledger::Ledger, savings_box::SavingsBox, transaction::Transaction},
    store::{
        KeyValueStore, StorageError,
        records::{self, Snapshot},
    },
    worker::{
        handlers::BoxMovement,
        processor::{Outcome, Processor},
    },
};

pub struct Wallet<S> {
    store: S,
    config: WalletConfig,
    processor: Processor,
}

impl<S: KeyValueStore> Wallet<S> {
    pub fn new(store: S, config: WalletConfig) -> Self {
        Self {
            store,
            config,
            processor: Processor::new(),
        }
    }

    pub fn with_clock(store: S, config: WalletConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            config,
            processor: Processor::with_clock(clock),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    /// Current state of every wallet record.
    pub fn snapshot(&self) -> Result<Ledger, AppError> {
        Ok(self.load()?.ledger)
    }

    fn load(&self) -> Result<Snapshot, StorageError> {
        records::load(&self.store, self.config.opening_balance)
    }

    /// Apply `command` and persist the result.
    ///
    /// # Errors
    /// Validation, funds and lookup errors are returned before anything is
    /// written. A commit that keeps losing version races is retried
    /// `commit_retries` times, then reported as [`StorageError::Conflict`].
    pub fn execute(&self, command: WalletCommand) -> Result<Outcome, AppError> {
        let mut attempt = 0;
        loop {
            let snapshot = self.load()?;
            let mut ledger = snapshot.ledger.clone();
            let outcome = self.processor.process(&mut ledger, command.clone())?;

            let commit = records::diff(&snapshot, &ledger)?;
            match self.store.commit(commit) {
                Ok(()) => return Ok(outcome),
                Err(StorageError::Conflict { key }) if attempt < self.config.commit_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "record \"{key}\" changed while applying {command:?}, retrying ({attempt}/{})",
                        self.config.commit_retries
                    );
                }
                Err(error) => {
                    tracing::error!("could not commit {command:?}: {error}");
                    return Err(error.into());
                }
            }
        }
    }

    pub fn balance(&self) -> Result<Money, AppError> {
        Ok(self.snapshot()?.balance())
    }

    pub fn deposit(&self, amount: Money, description: &str) -> Result<Transaction, AppError> {
        match self.execute(WalletCommand::Deposit {
            amount,
            description: description.to_owned(),
        })? {
            Outcome::Recorded(tx) => Ok(tx),
            other => Err(unexpected(other)),
        }
    }

    pub fn transfer(&self, amount: Money, description: &str) -> Result<Transaction, AppError> {
        match self.execute(WalletCommand::Transfer {
            amount,
            description: description.to_owned(),
        })? {
            Outcome::Recorded(tx) => Ok(tx),
            other => Err(unexpected(other)),
        }
    }

    /// Returns how many transactions were removed. The balance is unaffected.
    pub fn delete_transactions(&self, ids: &[String]) -> Result<usize, AppError> {
        match self.execute(WalletCommand::DeleteTransactions { ids: ids.to_vec() })? {
            Outcome::TransactionsDeleted(count) => Ok(count),
            other => Err(unexpected(other)),
        }
    }

    /// History, most recent first.
    pub fn list_transactions(&self) -> Result<Vec<Transaction>, AppError> {
        Ok(self.snapshot()?.history().cloned().collect())
    }

    pub fn create_box(&self, name: &str) -> Result<SavingsBox, AppError> {
        match self.execute(WalletCommand::CreateBox {
            name: name.to_owned(),
        })? {
            Outcome::BoxCreated(savings_box) => Ok(savings_box),
            other => Err(unexpected(other)),
        }
    }

    pub fn fund_box(&self, target: &str, amount: Money) -> Result<BoxMovement, AppError> {
        match self.execute(WalletCommand::FundBox {
            target: target.to_owned(),
            amount,
        })? {
            Outcome::BoxMoved(movement) => Ok(movement),
            other => Err(unexpected(other)),
        }
    }

    pub fn withdraw_from_box(&self, target: &str, amount: Money) -> Result<BoxMovement, AppError> {
        match self.execute(WalletCommand::WithdrawFromBox {
            target: target.to_owned(),
            amount,
        })? {
            Outcome::BoxMoved(movement) => Ok(movement),
            other => Err(unexpected(other)),
        }
    }

    pub fn delete_box(&self, target: &str) -> Result<SavingsBox, AppError> {
        match self.execute(WalletCommand::DeleteBox {
            target: target.to_owned(),
        })? {
            Outcome::BoxDeleted(savings_box) => Ok(savings_box),
            other => Err(unexpected(other)),
        }
    }

    /// Sweep the box balance back to the main balance and delete the box.
    pub fn close_box(&self, target: &str) -> Result<(SavingsBox, Option<Transaction>), AppError> {
        match self.execute(WalletCommand::CloseBox {
            target: target.to_owned(),
        })? {
            Outcome::BoxClosed { savings_box, sweep } => Ok((savings_box, sweep)),
            other => Err(unexpected(other)),
        }
    }

    pub fn list_boxes(&self) -> Result<Vec<SavingsBox>, AppError> {
        Ok(self.snapshot()?.boxes)
    }
}

fn unexpected(outcome: Outcome) -> AppError {
    tracing::error!("processor returned an outcome of the wrong kind: {outcome:?}");
    AppError::Process(format!("unexpected outcome {outcome:?}"))
}
