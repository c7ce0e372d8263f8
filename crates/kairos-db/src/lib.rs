//! Storage layer for Kairos.
//!
//! Durable state is a small key-value store: each key holds one JSON
//! document, and every write replaces the whole document. The store backs
//! three slots (tasks, category preferences, theme flag) but is generic over
//! any serializable value.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! # Schema
//!
//! A single `kv` table keyed by name. `value` holds the JSON text and
//! `updated_at` an RFC 3339 timestamp of the last write.
//!
//! Values are read leniently: a document that no longer parses as the
//! requested type is logged and replaced by the caller's default rather
//! than failing the load. Collections are read entry by entry, so one bad
//! entry only drops itself. Whenever anything is dropped, the raw document
//! is copied to `<key>.unreadable` before a later save can replace it.

use std::path::Path;

use chrono::{SecondsFormat, Utc};
use kairos_core::{AppState, CategoryPreference, Task, default_categories};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Key holding the task collection.
pub const TASKS_KEY: &str = "kairosTasks";
/// Key holding the category preference collection.
pub const CATEGORIES_KEY: &str = "kairosCategories";
/// Key holding the dark-mode flag.
pub const THEME_KEY: &str = "kairosTheme";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A value could not be serialized for storage.
    #[error("failed to serialize value for {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Returns the raw JSON stored under `key`, if any.
    pub fn load_raw(&self, key: &str) -> Result<Option<String>, DbError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Loads the value under `key`, or `default` when it is absent or no
    /// longer parses.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T, DbError> {
        let Some(raw) = self.load_raw(key)? else {
            tracing::debug!(key, "no stored value, using default");
            return Ok(default);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::warn!(key, error = %err, "stored value is unreadable, using default");
                Ok(default)
            }
        }
    }

    /// Loads the JSON array under `key`, keeping every entry that still
    /// parses.
    ///
    /// Returns `default` when the key is absent or the document is not an
    /// array.
    pub fn load_list<T: DeserializeOwned>(
        &self,
        key: &str,
        default: Vec<T>,
    ) -> Result<Vec<T>, DbError> {
        let Some(raw) = self.load_raw(key)? else {
            tracing::debug!(key, "no stored value, using default");
            return Ok(default);
        };
        let entries: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(key, error = %err, "stored list is unreadable, using default");
                self.preserve_unreadable(key, &raw)?;
                return Ok(default);
            }
        };

        let total = entries.len();
        let mut items = Vec::with_capacity(total);
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value(entry) {
                Ok(item) => items.push(item),
                Err(err) => {
                    tracing::warn!(key, index, error = %err, "skipping unreadable stored entry");
                }
            }
        }
        if items.len() < total {
            self.preserve_unreadable(key, &raw)?;
        }
        Ok(items)
    }

    fn preserve_unreadable(&self, key: &str, raw: &str) -> Result<(), DbError> {
        let backup = unreadable_key(key);
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?, ?, ?)",
            params![backup, raw, now_timestamp()],
        )?;
        tracing::warn!(key, backup = %backup, "kept a copy of the unreadable document");
        Ok(())
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), DbError> {
        let json = serialize(key, value)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?, ?, ?)",
            params![key, json, now_timestamp()],
        )?;
        tracing::debug!(key, bytes = json.len(), "saved value");
        Ok(())
    }

    /// Loads the full application state.
    pub fn load_state(&self) -> Result<AppState, DbError> {
        let tasks: Vec<Task> = self.load_list(TASKS_KEY, Vec::new())?;
        let categories: Vec<CategoryPreference> =
            self.load_list(CATEGORIES_KEY, default_categories())?;
        let dark_mode: bool = self.load(THEME_KEY, false)?;
        Ok(AppState::new(tasks, categories, dark_mode))
    }

    /// Writes all three slots in one transaction.
    pub fn save_state(&mut self, state: &AppState) -> Result<(), DbError> {
        let entries = [
            (TASKS_KEY, serialize(TASKS_KEY, &state.tasks)?),
            (CATEGORIES_KEY, serialize(CATEGORIES_KEY, &state.categories)?),
            (THEME_KEY, serialize(THEME_KEY, &state.dark_mode)?),
        ];
        let updated_at = now_timestamp();
        let tx = self.conn.transaction()?;
        {
            let mut stmt =
                tx.prepare("INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?, ?, ?)")?;
            for (key, json) in &entries {
                stmt.execute(params![key, json, updated_at])?;
            }
        }
        tx.commit()?;
        tracing::debug!(tasks = state.tasks.len(), "saved state");
        Ok(())
    }
}

fn serialize<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<String, DbError> {
    serde_json::to_string(value).map_err(|source| DbError::Serialize {
        key: key.to_string(),
        source,
    })
}

/// Key holding the last unreadable document stored under `key`.
pub fn unreadable_key(key: &str) -> String {
    format!("{key}.unreadable")
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
