// Vote store: a locally persisted set of "liked" jersey ids.
//
// Toggling only touches memory. `save` writes the whole set as a JSON array
// under a single storage key, `clear` empties it and removes the key. On
// device the keys live in a SQLite table.
// Loading never fails: missing or corrupt data yields an empty set.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use tracing::{debug, warn};

/// Storage key used by the reference deployment.
pub const DEFAULT_VOTES_KEY: &str = "jerseyVotes";

/// Database file created inside the data directory.
pub const DATABASE_FILE_NAME: &str = "jersey-picker.db";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to create data directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to open database at {path}: {source}")]
    Open {
        path: String,
        source: rusqlite::Error,
    },

    #[error("failed to {action} `{key}`: {source}")]
    Query {
        action: &'static str,
        key: String,
        source: rusqlite::Error,
    },

    #[error("failed to encode votes: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("storage is read-only")]
    ReadOnly,
}

// ---------------------------------------------------------------------------
// KeyValueStore
// ---------------------------------------------------------------------------

/// String-keyed on-device storage.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// SQLite-backed storage: one row per key in the `picker_state` table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path`, creating its parent
    /// directory first.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let location = path.display().to_string();
        let conn = Connection::open(path).map_err(|source| StorageError::Open {
            path: location.clone(),
            source,
        })?;
        Self::init(conn, location)
    }

    /// Ephemeral database, gone when the store is dropped.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(|source| StorageError::Open {
            path: ":memory:".into(),
            source,
        })?;
        Self::init(conn, ":memory:".into())
    }

    fn init(conn: Connection, location: String) -> Result<Self, StorageError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS picker_state (
                 key   TEXT PRIMARY KEY,
                 value TEXT NOT NULL
             );",
        )
        .map_err(|source| StorageError::Open {
            path: location,
            source,
        })?;
        Ok(SqliteStore { conn })
    }
}

fn query_err(action: &'static str, key: &str) -> impl FnOnce(rusqlite::Error) -> StorageError {
    let key = key.to_string();
    move |source| StorageError::Query {
        action,
        key,
        source,
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.conn
            .query_row(
                "SELECT value FROM picker_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(query_err("read", key))
    }

    /// INSERT OR REPLACE so repeated saves overwrite the previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO picker_state (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map(|_| ())
            .map_err(query_err("write", key))
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM picker_state WHERE key = ?1", params![key])
            .map(|_| ())
            .map_err(query_err("remove", key))
    }
}

/// In-memory storage. `read_only` makes every write fail, which is how
/// tests exercise the write-failure path.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::ReadOnly);
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::ReadOnly);
        }
        self.entries.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// VoteSet
// ---------------------------------------------------------------------------

/// Set of jersey ids, kept in the order they were voted for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteSet {
    ids: Vec<String>,
}

impl VoteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the id if absent, remove it if present. Returns whether the id
    /// is voted for afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if let Some(pos) = self.ids.iter().position(|v| v == id) {
            self.ids.remove(pos);
            false
        } else {
            self.ids.push(id.to_string());
            true
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|v| v == id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Decode a stored JSON array of ids. Anything else is rejected.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let raw: Vec<String> = serde_json::from_str(text)?;
        let mut set = VoteSet::new();
        for id in raw {
            if !set.contains(&id) {
                set.ids.push(id);
            }
        }
        Ok(set)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.ids)
    }
}

// ---------------------------------------------------------------------------
// VoteStore
// ---------------------------------------------------------------------------

/// A [`VoteSet`] bound to a storage key.
pub struct VoteStore {
    store: Box<dyn KeyValueStore>,
    key: String,
    votes: VoteSet,
}

impl VoteStore {
    /// Load the persisted set. Read errors and malformed data are logged
    /// and treated as an empty set.
    pub fn load(store: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let votes = match store.get(&key) {
            Ok(Some(text)) => VoteSet::from_json(&text).unwrap_or_else(|e| {
                warn!("Ignoring corrupt vote data under `{}`: {}", key, e);
                VoteSet::new()
            }),
            Ok(None) => VoteSet::new(),
            Err(e) => {
                warn!("Could not read stored votes: {}", e);
                VoteSet::new()
            }
        };
        debug!(count = votes.len(), "votes loaded");
        VoteStore { store, key, votes }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn votes(&self) -> &VoteSet {
        &self.votes
    }

    pub fn toggle(&mut self, id: &str) -> bool {
        self.votes.toggle(id)
    }

    /// Persist the current set. On failure the in-memory set is untouched.
    pub fn save(&mut self) -> Result<usize, StorageError> {
        let json = self.votes.to_json()?;
        self.store.set(&self.key, &json)?;
        Ok(self.votes.len())
    }

    /// Empty the set and drop the stored key. Memory is cleared even when
    /// removing the key fails.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.votes.clear();
        self.store.remove(&self.key)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("jersey_votes_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn memory_db() -> Box<SqliteStore> {
        Box::new(SqliteStore::open_in_memory().unwrap())
    }

    #[test]
    fn toggle_round_trip() {
        let mut set = VoteSet::new();
        assert!(set.toggle("d1"));
        assert_eq!(set.ids(), ["d1".to_string()]);
        assert!(!set.toggle("d1"));
        assert!(set.is_empty());
    }

    #[test]
    fn toggle_twice_restores_any_set() {
        let mut set = VoteSet::new();
        set.toggle("d2");
        set.toggle("d5");
        let before = set.clone();
        for id in ["d1", "d2", "d5", "zz"] {
            set.toggle(id);
            set.toggle(id);
            let mut a = set.ids().to_vec();
            let mut b = before.ids().to_vec();
            a.sort();
            b.sort();
            assert_eq!(a, b, "toggling {id} twice changed the set");
        }
    }

    #[test]
    fn from_json_dedupes_and_keeps_order() {
        let set = VoteSet::from_json(r#"["d3","d1","d3"]"#).unwrap();
        assert_eq!(set.ids(), ["d3".to_string(), "d1".to_string()]);
    }

    #[test]
    fn from_json_rejects_non_arrays() {
        assert!(VoteSet::from_json(r#"{"d1":true}"#).is_err());
        assert!(VoteSet::from_json("[1,2]").is_err());
        assert!(VoteSet::from_json("not json").is_err());
    }

    #[test]
    fn load_missing_key_is_empty() {
        let store = VoteStore::load(Box::new(MemoryStore::new()), DEFAULT_VOTES_KEY);
        assert!(store.votes().is_empty());
    }

    #[test]
    fn load_corrupt_data_is_empty() {
        let mem = MemoryStore::new().with_entry(DEFAULT_VOTES_KEY, "{{{");
        let store = VoteStore::load(Box::new(mem), DEFAULT_VOTES_KEY);
        assert!(store.votes().is_empty());
    }

    #[test]
    fn load_existing_votes() {
        let mem = MemoryStore::new().with_entry(DEFAULT_VOTES_KEY, r#"["d2","d4"]"#);
        let store = VoteStore::load(Box::new(mem), DEFAULT_VOTES_KEY);
        assert!(store.votes().contains("d2"));
        assert!(store.votes().contains("d4"));
        assert_eq!(store.votes().len(), 2);
    }

    #[test]
    fn save_failure_keeps_votes_in_memory() {
        let mut store = VoteStore::load(Box::new(MemoryStore::new().read_only()), "k");
        store.toggle("d1");
        let err = store.save().unwrap_err();
        assert!(matches!(err, StorageError::ReadOnly));
        assert!(store.votes().contains("d1"));
    }

    #[test]
    fn clear_failure_still_clears_memory() {
        let mem = MemoryStore::new().with_entry("k", r#"["d1"]"#).read_only();
        let mut store = VoteStore::load(Box::new(mem), "k");
        assert!(store.clear().is_err());
        assert!(store.votes().is_empty());
    }

    // ------------------------------------------------------------------
    // SqliteStore
    // ------------------------------------------------------------------

    #[test]
    fn sqlite_get_missing_key_is_none() {
        let db = SqliteStore::open_in_memory().unwrap();
        assert_eq!(db.get("nonexistent").unwrap(), None);
    }

    #[test]
    fn sqlite_set_overwrites_previous_value() {
        let mut db = SqliteStore::open_in_memory().unwrap();
        db.set("k", r#"["d1"]"#).unwrap();
        db.set("k", r#"["d2"]"#).unwrap();
        assert_eq!(db.get("k").unwrap().as_deref(), Some(r#"["d2"]"#));
    }

    #[test]
    fn sqlite_keys_are_plain_values() {
        // Keys never become paths, so separators are just characters.
        let mut db = SqliteStore::open_in_memory().unwrap();
        db.set("../escape", "[]").unwrap();
        db.set("a/b", r#"["d4"]"#).unwrap();
        assert_eq!(db.get("../escape").unwrap().as_deref(), Some("[]"));
        assert_eq!(db.get("a/b").unwrap().as_deref(), Some(r#"["d4"]"#));
        db.remove("a/b").unwrap();
        assert_eq!(db.get("a/b").unwrap(), None);
    }

    #[test]
    fn save_and_clear_through_sqlite() {
        let mut store = VoteStore::load(memory_db(), DEFAULT_VOTES_KEY);
        store.toggle("d2");
        assert_eq!(store.save().unwrap(), 1);
        store.clear().unwrap();
        // Clearing again with no row is fine.
        store.clear().unwrap();
        assert!(store.votes().is_empty());
    }

    #[test]
    fn database_persists_across_loads() {
        let dir = temp_dir("persist");
        let path = dir.join(DATABASE_FILE_NAME);
        let mut store = VoteStore::load(
            Box::new(SqliteStore::open(&path).unwrap()),
            DEFAULT_VOTES_KEY,
        );
        store.toggle("d1");
        store.toggle("d3");
        assert_eq!(store.save().unwrap(), 2);
        drop(store);

        let db = SqliteStore::open(&path).unwrap();
        assert_eq!(
            db.get(DEFAULT_VOTES_KEY).unwrap().as_deref(),
            Some(r#"["d1","d3"]"#)
        );
        let reloaded = VoteStore::load(Box::new(db), DEFAULT_VOTES_KEY);
        assert_eq!(reloaded.votes().ids(), ["d1".to_string(), "d3".to_string()]);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn database_clear_survives_reopen() {
        let dir = temp_dir("clear");
        let path = dir.join(DATABASE_FILE_NAME);
        let mut store = VoteStore::load(
            Box::new(SqliteStore::open(&path).unwrap()),
            DEFAULT_VOTES_KEY,
        );
        store.toggle("d2");
        store.save().unwrap();
        store.clear().unwrap();
        drop(store);

        let reloaded = VoteStore::load(
            Box::new(SqliteStore::open(&path).unwrap()),
            DEFAULT_VOTES_KEY,
        );
        assert!(reloaded.votes().is_empty());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn database_tolerates_corrupt_value() {
        let mut db = SqliteStore::open_in_memory().unwrap();
        db.set(DEFAULT_VOTES_KEY, "[\"d1\",").unwrap();
        let store = VoteStore::load(Box::new(db), DEFAULT_VOTES_KEY);
        assert!(store.votes().is_empty());
    }
}
