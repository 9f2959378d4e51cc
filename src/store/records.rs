//! The top-level wallet records and their text encodings.
//!
//! | key | value |
//! |---|---|
//! | `balance` | decimal text with two places |
//! | `transactions` | JSON array, insertion order |
//! | `boxes` | JSON array, creation order |
//! | `last_id` | highest id issued so far, decimal text |

use std::str::FromStr;

use crate::{
    common::money::Money,
    domain::{ledger::Ledger, savings_box::SavingsBox, transaction::Transaction},
    store::{Commit, KeyValueStore, StorageError},
};

pub const BALANCE_KEY: &str = "balance";
pub const TRANSACTIONS_KEY: &str = "transactions";
pub const BOXES_KEY: &str = "boxes";
pub const LAST_ID_KEY: &str = "last_id";

/// A ledger as read from the store, with the versions it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub ledger: Ledger,
    pub versions: Versions,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Versions {
    pub balance: u64,
    pub transactions: u64,
    pub boxes: u64,
    pub last_id: u64,
}

fn corrupt(key: &str, reason: impl ToString) -> StorageError {
    StorageError::Corrupt {
        key: key.to_owned(),
        reason: reason.to_string(),
    }
}

/// Read every record. Absent records fall back to `opening_balance` and
/// empty lists.
pub fn load(store: &dyn KeyValueStore, opening_balance: Money) -> Result<Snapshot, StorageError> {
    let mut ledger = Ledger::with_balance(opening_balance);
    let mut versions = Versions::default();

    if let Some(record) = store.get(BALANCE_KEY)? {
        ledger.balance = Money::from_str(&record.value).map_err(|e| corrupt(BALANCE_KEY, e))?;
        versions.balance = record.version;
    }

    if let Some(record) = store.get(TRANSACTIONS_KEY)? {
        ledger.txs = serde_json::from_str::<Vec<Transaction>>(&record.value)
            .map_err(|e| corrupt(TRANSACTIONS_KEY, e))?;
        versions.transactions = record.version;
    }

    if let Some(record) = store.get(BOXES_KEY)? {
        ledger.boxes = serde_json::from_str::<Vec<SavingsBox>>(&record.value)
            .map_err(|e| corrupt(BOXES_KEY, e))?;
        versions.boxes = record.version;
    }

    if let Some(record) = store.get(LAST_ID_KEY)? {
        ledger.last_id = record
            .value
            .trim()
            .parse()
            .map_err(|e| corrupt(LAST_ID_KEY, e))?;
        versions.last_id = record.version;
    }

    Ok(Snapshot { ledger, versions })
}

/// Build the commit that turns `before` into `after`.
///
/// Changed records are written; unchanged ones are only version-checked, so
/// the commit fails if anything the change was based on moved underneath it.
/// The first write to a fresh store also pins the opening balance.
pub fn diff(before: &Snapshot, after: &Ledger) -> Result<Commit, StorageError> {
    let versions = before.versions;
    let txs_changed = after.txs != before.ledger.txs;
    let boxes_changed = after.boxes != before.ledger.boxes;
    let balance_changed = after.balance != before.ledger.balance
        || (versions.balance == 0 && (txs_changed || boxes_changed));

    let mut commit = Commit::new();

    commit = if balance_changed {
        commit.put(BALANCE_KEY, versions.balance, after.balance.to_string_2dp())
    } else {
        commit.expect(BALANCE_KEY, versions.balance)
    };

    commit = if txs_changed {
        commit.put(
            TRANSACTIONS_KEY,
            versions.transactions,
            serde_json::to_string(&after.txs)?,
        )
    } else {
        commit.expect(TRANSACTIONS_KEY, versions.transactions)
    };

    commit = if boxes_changed {
        commit.put(BOXES_KEY, versions.boxes, serde_json::to_string(&after.boxes)?)
    } else {
        commit.expect(BOXES_KEY, versions.boxes)
    };

    commit = if after.last_id != before.ledger.last_id {
        commit.put(LAST_ID_KEY, versions.last_id, after.last_id.to_string())
    } else {
        commit.expect(LAST_ID_KEY, versions.last_id)
    };

    Ok(commit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::transaction::{TxSource, TxType},
        store::MemoryStore,
    };

    fn deposit(id: &str, cents: i64) -> Transaction {
        Transaction::new(
            id.into(),
            Money::new(cents),
            TxType::Deposit,
            TxSource::None,
            Some("extra".into()),
            "19/10/2026".into(),
        )
    }

    #[test]
    fn empty_store_loads_the_opening_balance() {
        let store = MemoryStore::new();

        let snapshot = load(&store, Money::new(135_600)).unwrap();

        assert_eq!(snapshot.ledger, Ledger::with_balance(Money::new(135_600)));
        assert_eq!(snapshot.versions, Versions::default());
    }

    #[test]
    fn written_records_load_back() {
        let store = MemoryStore::new();
        let before = load(&store, Money::zero()).unwrap();
        let mut after = before.ledger.clone();
        after.balance = Money::new(5000);
        after.txs.push(deposit("1", 5000));
        after.boxes.push(SavingsBox::new("2".into(), "Trip".into()));
        after.last_id = 2;

        store.commit(diff(&before, &after).unwrap()).unwrap();
        let reloaded = load(&store, Money::zero()).unwrap();

        assert_eq!(reloaded.ledger, after);
        assert_eq!(
            reloaded.versions,
            Versions {
                balance: 1,
                transactions: 1,
                boxes: 1,
                last_id: 1,
            }
        );
        assert_eq!(store.get(BALANCE_KEY).unwrap().unwrap().value, "50.00");
    }

    fn written_keys(commit: &Commit) -> Vec<&str> {
        commit
            .writes
            .iter()
            .filter(|w| w.value.is_some())
            .map(|w| w.key.as_str())
            .collect()
    }

    #[test]
    fn unchanged_records_are_only_version_checked() {
        let store = MemoryStore::new();
        store
            .commit(Commit::new().put(BALANCE_KEY, 0, "10.00".into()))
            .unwrap();
        let before = load(&store, Money::zero()).unwrap();
        let mut after = before.ledger.clone();
        after.boxes.push(SavingsBox::new("2".into(), "Trip".into()));

        let commit = diff(&before, &after).unwrap();

        assert_eq!(written_keys(&commit), vec![BOXES_KEY]);
        assert_eq!(commit.writes.len(), 4);
    }

    #[test]
    fn first_write_pins_the_opening_balance() {
        let store = MemoryStore::new();
        let before = load(&store, Money::new(135_600)).unwrap();
        let mut after = before.ledger.clone();
        after.boxes.push(SavingsBox::new("2".into(), "Trip".into()));

        store.commit(diff(&before, &after).unwrap()).unwrap();

        assert_eq!(store.get(BALANCE_KEY).unwrap().unwrap().value, "1356.00");
        let reloaded = load(&store, Money::zero()).unwrap();
        assert_eq!(reloaded.ledger.balance, Money::new(135_600));
    }

    #[test]
    fn zero_balance_is_stored_with_two_places() {
        let store = MemoryStore::new();
        store
            .commit(Commit::new().put(BALANCE_KEY, 0, "10.00".into()))
            .unwrap();
        let before = load(&store, Money::zero()).unwrap();
        let mut after = before.ledger.clone();
        after.balance = Money::zero();

        store.commit(diff(&before, &after).unwrap()).unwrap();

        assert_eq!(store.get(BALANCE_KEY).unwrap().unwrap().value, "0.00");
    }

    #[test]
    fn no_change_writes_nothing() {
        let store = MemoryStore::new();
        let before = load(&store, Money::zero()).unwrap();

        let commit = diff(&before, &before.ledger).unwrap();

        assert!(commit.is_read_only());
    }

    #[test]
    fn corrupt_records_are_reported_with_their_key() {
        let store = MemoryStore::new();
        store
            .commit(Commit::new().put(TRANSACTIONS_KEY, 0, "not json".into()))
            .unwrap();

        match load(&store, Money::zero()) {
            Err(StorageError::Corrupt { key, .. }) => assert_eq!(key, TRANSACTIONS_KEY),
            other => panic!("expected a corrupt record error, got {other:?}"),
        }
    }

    #[test]
    fn legacy_float_balance_is_read() {
        let store = MemoryStore::new();
        store
            .commit(Commit::new().put(BALANCE_KEY, 0, "1406".into()))
            .unwrap();

        let snapshot = load(&store, Money::zero()).unwrap();

        assert_eq!(snapshot.ledger.balance, Money::new(140_600));
    }
}
