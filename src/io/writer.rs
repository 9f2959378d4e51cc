use std::io::Write;

use crate::domain::{savings_box::SavingsBox, transaction::Transaction};

#[derive(serde::Serialize)]
/// Internal CSV output row for one history entry.
///
/// Headers written (in this order): `id,date,type,source,amount,description`.
struct HistoryRow<'a> {
    id: &'a str,
    date: &'a str,
    #[serde(rename = "type")]
    tx_type: &'a str,
    source: &'a str,
    amount: String,
    description: &'a str,
}

#[derive(serde::Serialize)]
struct BoxRow<'a> {
    id: &'a str,
    name: &'a str,
    balance: String,
}

/// Writes transactions to a CSV writer in the order given.
///
/// Callers pass the history most recent first. Amounts are unsigned with
/// exactly two decimal places; the `type` column says which way they moved.
///
/// # Errors
///
/// Returns a `csv::Error` if writing/serializing any row fails.
///
/// # Examples
///
/// ```
/// use wallet_ledger::common::money::Money;
/// use wallet_ledger::domain::transaction::{Transaction, TxSource, TxType};
/// use wallet_ledger::io::writer::write_history;
///
/// let tx = Transaction::new(
///     "1".into(),
///     Money::new(5000),
///     TxType::Deposit,
///     TxSource::None,
///     Some("extra".into()),
///     "19/10/2026".into(),
/// );
///
/// let mut out = Vec::new();
/// write_history(&mut out, [&tx]).unwrap();
///
/// let s = String::from_utf8(out).unwrap();
/// assert_eq!(s, "id,date,type,source,amount,description\n1,19/10/2026,deposit,none,50.00,extra\n");
/// ```
pub fn write_history<'a, W, I>(writer: W, txs: I) -> Result<(), csv::Error>
where
    W: Write,
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    let mut wrote_any = false;
    for tx in txs {
        wtr.serialize(HistoryRow {
            id: &tx.id,
            date: &tx.date,
            tx_type: tx.tx_type.as_str(),
            source: tx.source.as_str(),
            amount: tx.amount.to_string_2dp(),
            description: tx.description.as_deref().unwrap_or_default(),
        })?;
        wrote_any = true;
    }

    // serialize() only emits headers alongside the first row.
    if !wrote_any {
        wtr.write_record(["id", "date", "type", "source", "amount", "description"])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes boxes to a CSV writer in creation order.
///
/// Headers written: `id,name,balance`.
pub fn write_boxes<W: Write>(writer: W, boxes: &[SavingsBox]) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    for savings_box in boxes {
        wtr.serialize(BoxRow {
            id: &savings_box.id,
            name: &savings_box.name,
            balance: savings_box.balance.to_string_2dp(),
        })?;
    }

    if boxes.is_empty() {
        wtr.write_record(["id", "name", "balance"])?;
    }

    wtr.flush()?;
    Ok(())
}
