use time::OffsetDateTime;

use crate::{
    common::{error::AppError, money::Money},
    domain::{
        ledger::Ledger,
        transaction::{Transaction, TxSource, TxType},
    },
    worker::handlers::{debit, record, require_positive, require_text},
};

pub fn handle(
    ledger: &mut Ledger,
    now: OffsetDateTime,
    amount: Money,
    description: &str,
) -> Result<Transaction, AppError> {
    let amount = require_positive(amount)?;
    let description = require_text(description, "description")?;

    ledger.balance = debit(ledger.balance, amount)?;

    Ok(record(
        ledger,
        now,
        amount,
        TxType::Transfer,
        TxSource::None,
        Some(description),
    ))
}
