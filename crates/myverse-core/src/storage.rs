//! Durable client-side storage for the session mirror.
//!
//! The session persists exactly three string values (token, user record,
//! preferences) plus the path to return to after login. Backends only store
//! strings; (de)serialization happens in the session store.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::MyverseError;

const SCHEMA_V1: &str = include_str!("../../../migrations/001_session_store.sql");

pub const TOKEN_KEY: &str = "myverse_token";
pub const USER_KEY: &str = "myverse_user";
pub const PREFERENCES_KEY: &str = "myverse_preferences";
pub const REDIRECT_KEY: &str = "myverse_redirect";

/// A string key/value store that survives process restarts.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, MyverseError>;
    fn set(&self, key: &str, value: &str) -> Result<(), MyverseError>;
    fn remove(&self, key: &str) -> Result<(), MyverseError>;
}

/// SQLite-backed key/value store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, MyverseError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, MyverseError> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        // Poisoning is ignored: every statement is a single atomic write.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, MyverseError> {
        self.conn()
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), MyverseError> {
        self.conn().execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), MyverseError> {
        self.conn()
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(())
    }
}

/// Process-local store, for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, MyverseError> {
        Ok(self.values().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), MyverseError> {
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), MyverseError> {
        self.values().remove(key);
        Ok(())
    }
}

fn run_migrations(conn: &Connection) -> Result<(), MyverseError> {
    let version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .unwrap_or(0);

    if version < 1 {
        conn.execute_batch(SCHEMA_V1)?;
        conn.pragma_update(None, "user_version", 1)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = SqliteStore::open_memory().unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);

        store.set(TOKEN_KEY, "abc").unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("abc"));

        store.set(TOKEN_KEY, "def").unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("def"));

        store.remove(TOKEN_KEY).unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        // Removing a missing key is not an error.
        store.remove(TOKEN_KEY).unwrap();
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.set(USER_KEY, r#"{"id":1,"username":"demo"}"#).unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(
            store.get(USER_KEY).unwrap().as_deref(),
            Some(r#"{"id":1,"username":"demo"}"#)
        );
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        store.set(PREFERENCES_KEY, "{}").unwrap();
        assert_eq!(store.get(PREFERENCES_KEY).unwrap().as_deref(), Some("{}"));
        store.remove(PREFERENCES_KEY).unwrap();
        assert_eq!(store.get(PREFERENCES_KEY).unwrap(), None);
    }
}
