//! Implements a SQLite backed key-value store.
use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use rusqlite::{Connection, OptionalExtension, TransactionBehavior};

use crate::store::{Commit, KeyValueStore, StorageError, Versioned};

/// Stores every record as one row of the `kv_record` table.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database file at `path` and ensure the table exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let connection = Connection::open(path)?;
        Self::from_connection(connection)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(connection: Connection) -> Result<Self, StorageError> {
        create_table(&connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }
}

pub fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS kv_record (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            version INTEGER NOT NULL
        )",
        (),
    )?;

    Ok(())
}

fn read_version(connection: &Connection, key: &str) -> Result<u64, rusqlite::Error> {
    let version: Option<i64> = connection
        .query_row(
            "SELECT version FROM kv_record WHERE key = ?1",
            [key],
            |row| row.get(0),
        )
        .optional()?;

    Ok(version.unwrap_or(0) as u64)
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<Versioned>, StorageError> {
        let connection = self.connection.lock().map_err(|_| StorageError::Lock)?;

        let record = connection
            .query_row(
                "SELECT value, version FROM kv_record WHERE key = ?1",
                [key],
                |row| {
                    let value: String = row.get(0)?;
                    let version: i64 = row.get(1)?;
                    Ok(Versioned {
                        value,
                        version: version as u64,
                    })
                },
            )
            .optional()?;

        Ok(record)
    }

    fn commit(&self, commit: Commit) -> Result<(), StorageError> {
        let mut connection = self.connection.lock().map_err(|_| StorageError::Lock)?;
        // Take the write lock before reading versions so a concurrent writer
        // waits on the busy timeout instead of failing the lock upgrade.
        let tx = connection.transaction_with_behavior(TransactionBehavior::Immediate)?;

        for write in &commit.writes {
            if read_version(&tx, &write.key)? != write.expected_version {
                // Dropping `tx` rolls back.
                return Err(StorageError::Conflict {
                    key: write.key.clone(),
                });
            }
        }

        for write in &commit.writes {
            if let Some(value) = &write.value {
                tx.execute(
                    "INSERT INTO kv_record (key, value, version) VALUES (?1, ?2, ?3)
                        ON CONFLICT(key) DO UPDATE SET
                            value = excluded.value,
                            version = excluded.version",
                    (&write.key, value, (write.expected_version + 1) as i64),
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::{SqliteStore, create_table};
    use crate::store::contract;

    fn get_test_store() -> SqliteStore {
        SqliteStore::open_in_memory().expect("Could not initialise in-memory SQLite database")
    }

    #[test]
    fn sql_is_valid() {
        let connection = Connection::open_in_memory().unwrap();

        assert_eq!(Ok(()), create_table(&connection));
        assert_eq!(Ok(()), create_table(&connection), "table creation is idempotent");
    }

    #[test]
    fn absent_keys_read_as_none() {
        contract::absent_keys_read_as_none(&get_test_store());
    }

    #[test]
    fn writes_bump_versions() {
        contract::writes_bump_versions(&get_test_store());
    }

    #[test]
    fn stale_writes_conflict_and_write_nothing() {
        contract::stale_writes_conflict_and_write_nothing(&get_test_store());
    }

    #[test]
    fn version_checks_without_writes() {
        contract::version_checks_without_writes(&get_test_store());
    }
}
