//! One module per wallet operation. Each `handle` validates its input, then
//! mutates the [`Ledger`] snapshot; on error the snapshot is left untouched.

pub mod create_box;
pub mod delete_box;
pub mod delete_transactions;
pub mod deposit;
pub mod fund_box;
pub mod transfer;
pub mod withdraw_box;

use time::OffsetDateTime;

use crate::{
    common::{
        clock::{display_date, unix_millis},
        error::AppError,
        money::Money,
    },
    domain::{
        ledger::Ledger,
        savings_box::SavingsBox,
        transaction::{Transaction, TxSource, TxType},
    },
};

/// A box balance change together with the history entry that mirrors it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxMovement {
    pub savings_box: SavingsBox,
    pub transaction: Transaction,
}

pub(crate) fn require_positive(amount: Money) -> Result<Money, AppError> {
    if amount.is_positive() {
        Ok(amount)
    } else {
        Err(AppError::validation(format!(
            "amount must be greater than zero, got {amount}"
        )))
    }
}

pub(crate) fn require_text(value: &str, field: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    Ok(value.to_owned())
}

pub(crate) fn find_box(ledger: &Ledger, target: &str) -> Result<usize, AppError> {
    ledger
        .resolve_box(target)
        .ok_or_else(|| AppError::NotFound(format!("box {}", target.trim())))
}

/// Append a transaction stamped with `now` and return a copy of it.
pub(crate) fn record(
    ledger: &mut Ledger,
    now: OffsetDateTime,
    amount: Money,
    tx_type: TxType,
    source: TxSource,
    description: Option<String>,
) -> Transaction {
    let tx = Transaction::new(
        ledger.fresh_id(unix_millis(now)),
        amount,
        tx_type,
        source,
        description,
        display_date(now),
    );
    ledger.txs.push(tx.clone());
    tx
}

fn overflow() -> AppError {
    AppError::validation("amount is too large")
}

pub(crate) fn credit(balance: Money, amount: Money) -> Result<Money, AppError> {
    balance.checked_add(amount).ok_or_else(overflow)
}

/// Subtract `amount` from `available`, refusing to go below zero.
pub(crate) fn debit(available: Money, amount: Money) -> Result<Money, AppError> {
    if amount > available {
        return Err(AppError::InsufficientFunds {
            requested: amount,
            available,
        });
    }
    available.checked_sub(amount).ok_or_else(overflow)
}

#[cfg(test)]
pub(crate) mod test_utils {
    use std::str::FromStr;

    use time::{OffsetDateTime, macros::datetime};

    use crate::common::money::Money;

    pub fn money(v: &str) -> Money {
        Money::from_str(v).unwrap()
    }

    pub fn now() -> OffsetDateTime {
        datetime!(2026-10-19 12:00 UTC)
    }
}
