//! Versioned key-value storage for the wallet records.
//!
//! Every record carries a version that starts at 1 on first write and grows by
//! one on each write; an absent record has version 0. A [`Commit`] only applies
//! if every key it names is still at the version the caller read, so two
//! writers racing on the same record cannot silently overwrite each other.

pub mod memory;
pub mod records;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Errors originating from the key-value store.
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    /// Another writer changed `key` after it was read. The caller should reload and retry.
    #[error("record \"{key}\" was changed by another writer")]
    Conflict { key: String },
    /// A stored record could not be decoded.
    #[error("record \"{key}\" is corrupt: {reason}")]
    Corrupt { key: String, reason: String },
    #[error("could not serialize record: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("an unexpected SQL error occurred: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("could not acquire the store lock")]
    Lock,
    /// A remote document or blob service failed.
    #[error("remote service failed: {0}")]
    Remote(String),
}

/// A stored value together with its version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned {
    pub value: String,
    pub version: u64,
}

/// One key in an atomic commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Write {
    pub key: String,
    /// The version the caller read; 0 when the record was absent.
    pub expected_version: u64,
    /// `None` only asserts the version without writing.
    pub value: Option<String>,
}

/// A batch of keys that is applied all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commit {
    pub writes: Vec<Write>,
}

impl Commit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(mut self, key: &str, expected_version: u64, value: String) -> Self {
        self.writes.push(Write {
            key: key.to_owned(),
            expected_version,
            value: Some(value),
        });
        self
    }

    pub fn expect(mut self, key: &str, expected_version: u64) -> Self {
        self.writes.push(Write {
            key: key.to_owned(),
            expected_version,
            value: None,
        });
        self
    }

    pub fn is_read_only(&self) -> bool {
        self.writes.iter().all(|w| w.value.is_none())
    }
}

/// Durable string-keyed storage with optimistic concurrency.
pub trait KeyValueStore: Send + Sync {
    /// Read a record, or `None` if it was never written.
    fn get(&self, key: &str) -> Result<Option<Versioned>, StorageError>;

    /// Apply every write in `commit` atomically.
    ///
    /// # Errors
    /// Returns [`StorageError::Conflict`] and writes nothing if any key is no
    /// longer at its expected version.
    fn commit(&self, commit: Commit) -> Result<(), StorageError>;

    /// Version of `key`, 0 when absent.
    fn version(&self, key: &str) -> Result<u64, StorageError> {
        Ok(self.get(key)?.map(|v| v.version).unwrap_or(0))
    }
}

#[cfg(test)]
pub(crate) mod contract {
    //! Behaviour every [`KeyValueStore`] backend must share.

    use super::*;

    pub fn absent_keys_read_as_none(store: &dyn KeyValueStore) {
        assert_eq!(store.get("balance").unwrap(), None);
        assert_eq!(store.version("balance").unwrap(), 0);
    }

    pub fn writes_bump_versions(store: &dyn KeyValueStore) {
        store
            .commit(Commit::new().put("balance", 0, "10.00".into()))
            .unwrap();
        store
            .commit(Commit::new().put("balance", 1, "12.00".into()))
            .unwrap();

        assert_eq!(
            store.get("balance").unwrap(),
            Some(Versioned {
                value: "12.00".into(),
                version: 2,
            })
        );
    }

    pub fn stale_writes_conflict_and_write_nothing(store: &dyn KeyValueStore) {
        store
            .commit(Commit::new().put("balance", 0, "10.00".into()))
            .unwrap();

        let result = store.commit(
            Commit::new()
                .put("transactions", 0, "[]".into())
                .put("balance", 0, "99.00".into()),
        );

        match result {
            Err(StorageError::Conflict { key }) => assert_eq!(key, "balance"),
            other => panic!("expected a conflict, got {other:?}"),
        }
        assert_eq!(store.get("transactions").unwrap(), None);
        assert_eq!(store.get("balance").unwrap().unwrap().value, "10.00");
    }

    pub fn version_checks_without_writes(store: &dyn KeyValueStore) {
        store
            .commit(Commit::new().put("boxes", 0, "[]".into()))
            .unwrap();

        let stale = store.commit(
            Commit::new()
                .expect("boxes", 0)
                .put("balance", 0, "1.00".into()),
        );
        assert!(matches!(stale, Err(StorageError::Conflict { .. })));

        store
            .commit(
                Commit::new()
                    .expect("boxes", 1)
                    .put("balance", 0, "1.00".into()),
            )
            .unwrap();
        assert_eq!(store.version("boxes").unwrap(), 1);
        assert_eq!(store.version("balance").unwrap(), 1);
    }
}
