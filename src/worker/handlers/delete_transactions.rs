use std::collections::HashSet;

use crate::domain::ledger::Ledger;

/// Remove every transaction whose id is listed and return how many went.
///
/// The balance is not touched: deleting history never reverses money movement.
/// An empty selection removes nothing.
pub fn handle(ledger: &mut Ledger, ids: &[String]) -> usize {
    let ids: HashSet<&str> = ids.iter().map(|id| id.trim()).collect();
    let before = ledger.txs.len();
    ledger.txs.retain(|tx| !ids.contains(tx.id.as_str()));

    before - ledger.txs.len()
}
