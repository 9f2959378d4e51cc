use std::collections::HashSet;

use crate::{
    common::money::Money,
    domain::{savings_box::SavingsBox, transaction::Transaction},
};

/// In-memory snapshot of the wallet records.
///
/// Handlers mutate a `Ledger`; the wallet service loads it from and commits it
/// back to the key-value store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    pub balance: Money,
    /// Insertion order, oldest first.
    pub txs: Vec<Transaction>,
    /// Creation order.
    pub boxes: Vec<SavingsBox>,
    /// Highest id ever issued. Ids at or below it are never handed out again,
    /// even after the record that held them is deleted.
    pub last_id: i64,
}

impl Ledger {
    pub fn new() -> Self {
        Self::with_balance(Money::zero())
    }

    pub fn with_balance(balance: Money) -> Self {
        Self {
            balance,
            txs: Vec::new(),
            boxes: Vec::new(),
            last_id: 0,
        }
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    /// History for display, most recent first.
    pub fn history(&self) -> impl Iterator<Item = &Transaction> {
        self.txs.iter().rev()
    }

    pub fn boxes(&self) -> &[SavingsBox] {
        &self.boxes
    }

    /// Sum of the signed amounts of every recorded transaction.
    pub fn signed_total(&self) -> Money {
        self.txs.iter().map(Transaction::signed_amount).sum()
    }

    /// Main balance plus everything set aside in boxes.
    pub fn total_funds(&self) -> Money {
        self.balance + self.boxes.iter().map(|b| b.balance).sum::<Money>()
    }

    /// Find a box by id, falling back to an exact name match.
    pub fn resolve_box(&self, target: &str) -> Option<usize> {
        let target = target.trim();
        self.boxes
            .iter()
            .position(|b| b.id == target)
            .or_else(|| self.boxes.iter().position(|b| b.name == target))
    }

    /// Issue a timestamp-derived id above every id issued before.
    pub fn fresh_id(&mut self, unix_millis: i64) -> String {
        let taken: HashSet<&str> = self
            .txs
            .iter()
            .map(|t| t.id.as_str())
            .chain(self.boxes.iter().map(|b| b.id.as_str()))
            .collect();

        let mut candidate = unix_millis.max(self.last_id.saturating_add(1));
        while taken.contains(candidate.to_string().as_str()) {
            candidate += 1;
        }
        self.last_id = candidate;
        candidate.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::{TxSource, TxType};

    fn tx(id: &str, cents: i64, tx_type: TxType) -> Transaction {
        Transaction::new(
            id.into(),
            Money::new(cents),
            tx_type,
            TxSource::None,
            None,
            "19/10/2026".into(),
        )
    }

    #[test]
    fn history_is_most_recent_first() {
        let mut ledger = Ledger::new();
        ledger.txs.push(tx("1", 100, TxType::Deposit));
        ledger.txs.push(tx("2", 50, TxType::Transfer));

        let ids: Vec<&str> = ledger.history().map(|t| t.id.as_str()).collect();

        assert_eq!(ids, vec!["2", "1"]);
    }

    #[test]
    fn signed_total_nets_credits_and_debits() {
        let mut ledger = Ledger::new();
        ledger.txs.push(tx("1", 1000, TxType::Deposit));
        ledger.txs.push(tx("2", 300, TxType::Transfer));
        ledger.txs.push(tx("3", 200, TxType::Subtract));
        ledger.txs.push(tx("4", 50, TxType::Add));

        assert_eq!(ledger.signed_total(), Money::new(550));
    }

    #[test]
    fn fresh_id_skips_ids_already_taken() {
        let mut ledger = Ledger::new();
        ledger.txs.push(tx("1000", 100, TxType::Deposit));
        ledger
            .boxes
            .push(SavingsBox::new("1001".into(), "Trip".into()));

        assert_eq!(ledger.fresh_id(1000), "1002");
        assert_eq!(ledger.fresh_id(5000), "5000");
    }

    #[test]
    fn fresh_id_never_reissues_a_deleted_id() {
        let mut ledger = Ledger::new();
        let first = ledger.fresh_id(1000);
        ledger.txs.push(tx(&first, 100, TxType::Deposit));
        ledger.txs.clear();

        assert_eq!(ledger.fresh_id(1000), "1001");
        assert_eq!(ledger.fresh_id(900), "1002");
    }

    #[test]
    fn resolve_box_prefers_id_over_name() {
        let mut ledger = Ledger::new();
        ledger.boxes.push(SavingsBox::new("1".into(), "2".into()));
        ledger.boxes.push(SavingsBox::new("2".into(), "Trip".into()));

        assert_eq!(ledger.resolve_box("2"), Some(1));
        assert_eq!(ledger.resolve_box("Trip"), Some(1));
        assert_eq!(ledger.resolve_box(" 1 "), Some(0));
        assert_eq!(ledger.resolve_box("Car"), None);
    }

    #[test]
    fn total_funds_includes_boxes() {
        let mut ledger = Ledger::with_balance(Money::new(1000));
        let mut trip = SavingsBox::new("1".into(), "Trip".into());
        trip.balance = Money::new(250);
        ledger.boxes.push(trip);

        assert_eq!(ledger.total_funds(), Money::new(1250));
    }
}
