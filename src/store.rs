//! Key/value storage capabilities backing the ledger and session store.
//!
//! Two tiers exist at runtime: a durable store that survives restarts and a
//! volatile store scoped to the current tab. Both speak the same interface so
//! tests can inject in-memory fakes for either tier.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use tracing::warn;

/// Reserved token slots; written by nothing yet, removed on logout.
pub const AUTH_TOKEN_KEY: &str = "auth_token";
/// Reserved token slot, same lifecycle as [`AUTH_TOKEN_KEY`].
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
/// Serialized [`crate::session::UserSession`].
pub const USER_DATA_KEY: &str = "user_data";
/// Literal `"true"` when the user asked to stay signed in.
pub const REMEMBER_ME_KEY: &str = "remember_me";
/// RFC 3339 timestamp of the most recent successful login.
pub const LAST_LOGIN_KEY: &str = "last_login";
/// Serialized sequence of [`crate::ledger::LoginAttempt`] records.
pub const LOGIN_ATTEMPTS_KEY: &str = "login_attempts";

/// String key/value storage with web-storage semantics: missing or unreadable
/// values read as `None`, writes overwrite, and concurrent writers race with
/// last-writer-wins. Implementations must never fail loudly; storage trouble
/// degrades to "absent".
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory store; the volatile tier, and the fake of choice in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every entry, simulating a tab close for the volatile tier.
    pub fn wipe(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// JSON-file-backed store; the durable tier for desktop builds of the console.
///
/// The whole map is rewritten on every mutation. A corrupt or missing file
/// reads as an empty map, never an error.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!("Discarding unreadable store file {}: {err}", path.display());
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn flush(&self, entries: &HashMap<String, String>) {
        match serde_json::to_string(entries) {
            Ok(raw) => {
                if let Err(err) = fs::write(&self.path, raw) {
                    warn!("Failed to persist store file {}: {err}", self.path.display());
                }
            }
            Err(err) => warn!("Failed to serialize store file: {err}"),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.remove(key).is_some() {
            self.flush(&entries);
        }
    }
}
