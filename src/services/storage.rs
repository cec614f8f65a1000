// Key-value storage
// The "local storage" behind progress, coin wallets and the auth session

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{AppError, AppResult};

/// String keys to JSON string values, one blob per key
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> AppResult<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> AppResult<()>;

    fn remove_item(&self, key: &str) -> AppResult<()>;

    /// Keys starting with `prefix`, sorted
    fn keys_with_prefix(&self, prefix: &str) -> AppResult<Vec<String>>;
}

fn lock<T>(mutex: &Mutex<T>) -> AppResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|e| AppError::Storage(format!("store lock poisoned: {}", e)))
}

/// SQLite-backed store
pub struct SqliteStore {
    pool: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (creating if needed) the database file
    pub fn open(db_path: &Path) -> AppResult<Self> {
        // Make sure the data directory exists
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let store = Self {
            pool: Arc::new(Mutex::new(Connection::open(db_path)?)),
        };
        store.initialize()?;
        log::info!("opened storage at {}", db_path.display());
        Ok(store)
    }

    pub fn open_in_memory() -> AppResult<Self> {
        let store = Self {
            pool: Arc::new(Mutex::new(Connection::open_in_memory()?)),
        };
        store.initialize()?;
        Ok(store)
    }

    /// Creates the table
    pub fn initialize(&self) -> AppResult<()> {
        let conn = lock(&self.pool)?;

        conn.pragma_update(None, "synchronous", "NORMAL")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS local_storage (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        let conn = lock(&self.pool)?;

        let value = conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?",
                rusqlite::params![key],
                |row| row.get(0),
            )
            .optional()?;

        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        let conn = lock(&self.pool)?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO local_storage (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![key, value, now],
        )?;

        Ok(())
    }

    fn remove_item(&self, key: &str) -> AppResult<()> {
        let conn = lock(&self.pool)?;

        conn.execute(
            "DELETE FROM local_storage WHERE key = ?",
            rusqlite::params![key],
        )?;

        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> AppResult<Vec<String>> {
        let conn = lock(&self.pool)?;

        // substr instead of LIKE, user ids may contain '%' or '_'
        let mut stmt = conn.prepare(
            "SELECT key FROM local_storage WHERE substr(key, 1, ?) = ? ORDER BY key",
        )?;

        let rows = stmt.query_map(
            rusqlite::params![prefix.chars().count() as i64, prefix],
            |row| row.get::<_, String>(0),
        )?;

        let mut keys = Vec::new();
        for row in rows {
            keys.push(row?);
        }

        Ok(keys)
    }
}

/// In-memory store, contents are lost on drop
#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        Ok(lock(&self.items)?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        lock(&self.items)?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> AppResult<()> {
        lock(&self.items)?.remove(key);
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> AppResult<Vec<String>> {
        Ok(lock(&self.items)?
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &dyn KeyValueStore) {
        assert_eq!(store.get_item("a_1").unwrap(), None);

        store.set_item("a_1", "{\"v\":1}").unwrap();
        store.set_item("a_2", "{\"v\":2}").unwrap();
        store.set_item("b_1", "{}").unwrap();
        store.set_item("a_1", "{\"v\":3}").unwrap();

        assert_eq!(store.get_item("a_1").unwrap().as_deref(), Some("{\"v\":3}"));
        assert_eq!(store.keys_with_prefix("a_").unwrap(), vec!["a_1", "a_2"]);

        store.remove_item("a_1").unwrap();
        assert_eq!(store.get_item("a_1").unwrap(), None);
        assert_eq!(store.keys_with_prefix("a_").unwrap(), vec!["a_2"]);
    }

    #[test]
    fn test_memory_store() {
        exercise(&MemoryStore::new());
    }

    #[test]
    fn test_sqlite_store_in_memory() {
        exercise(&SqliteStore::open_in_memory().unwrap());
    }

    #[test]
    fn test_sqlite_prefix_is_literal() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set_item("p_%x", "1").unwrap();
        store.set_item("p_ax", "2").unwrap();

        assert_eq!(store.keys_with_prefix("p_%").unwrap(), vec!["p_%x"]);
    }

    #[test]
    fn test_sqlite_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.set_item("key", "value").unwrap();
        }

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.get_item("key").unwrap().as_deref(), Some("value"));
        assert!(path.exists());
    }
}
