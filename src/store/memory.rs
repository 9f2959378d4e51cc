//! Implements an in-memory key-value store.
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use crate::store::{Commit, KeyValueStore, StorageError, Versioned};

/// A process-local store, useful for tests and throwaway wallets.
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<HashMap<String, Versioned>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Versioned>, StorageError> {
        let records = self.records.lock().map_err(|_| StorageError::Lock)?;
        Ok(records.get(key).cloned())
    }

    fn commit(&self, commit: Commit) -> Result<(), StorageError> {
        let mut records = self.records.lock().map_err(|_| StorageError::Lock)?;

        for write in &commit.writes {
            let current = records.get(&write.key).map(|v| v.version).unwrap_or(0);
            if current != write.expected_version {
                return Err(StorageError::Conflict {
                    key: write.key.clone(),
                });
            }
        }

        for write in commit.writes {
            if let Some(value) = write.value {
                records.insert(
                    write.key,
                    Versioned {
                        value,
                        version: write.expected_version + 1,
                    },
                );
            }
        }

        Ok(())
    }
}
