use time::OffsetDateTime;

use crate::{
    common::error::AppError,
    domain::{ledger::Ledger, savings_box::SavingsBox, transaction::Transaction},
    worker::handlers::{find_box, withdraw_box::withdraw_at},
};

/// Delete an empty box. Past transactions tagged with it stay in history.
pub fn handle(ledger: &mut Ledger, target: &str) -> Result<SavingsBox, AppError> {
    let index = find_box(ledger, target)?;

    let savings_box = &ledger.boxes[index];
    if !savings_box.is_empty() {
        return Err(AppError::NonZeroBalance {
            id: savings_box.id.clone(),
            balance: savings_box.balance,
        });
    }

    Ok(ledger.boxes.remove(index))
}

/// Sweep whatever the box holds back to the main balance, then delete it.
pub fn close(
    ledger: &mut Ledger,
    now: OffsetDateTime,
    target: &str,
) -> Result<(SavingsBox, Option<Transaction>), AppError> {
    let index = find_box(ledger, target)?;

    let remaining = ledger.boxes[index].balance;
    let sweep = if remaining.is_positive() {
        Some(withdraw_at(ledger, now, index, remaining)?.transaction)
    } else {
        None
    };

    Ok((ledger.boxes.remove(index), sweep))
}
