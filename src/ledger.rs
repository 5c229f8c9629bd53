//! Capped ledger of login attempts feeding the lockout policy.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::store::{KeyValueStore, LOGIN_ATTEMPTS_KEY};
use crate::utils::normalize_email;

/// Most recent entries retained, globally across accounts.
pub const LEDGER_CAP: usize = 10;

/// One submitted login, successful or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginAttempt {
    /// Normalized (trimmed, lower-cased) account email.
    pub email: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub success: bool,
}

/// Append-only (capped) record of login attempts in persistent storage.
///
/// There is no transactional guarantee: a second writer racing on the same
/// store simply wins or loses whole, matching the persistence model of the
/// console.
pub struct AttemptLedger {
    store: Arc<dyn KeyValueStore>,
}

impl AttemptLedger {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// All retained attempts, oldest first. Absent or malformed storage reads
    /// as "no attempts", never an error.
    #[must_use]
    pub fn attempts(&self) -> Vec<LoginAttempt> {
        let Some(raw) = self.store.get(LOGIN_ATTEMPTS_KEY) else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(attempts) => attempts,
            Err(err) => {
                warn!("Discarding malformed attempt ledger: {err}");
                Vec::new()
            }
        }
    }

    /// Append an attempt and trim to the [`LEDGER_CAP`] most recent entries
    /// before persisting. The cap is global, not per account.
    pub fn record(&self, email: &str, success: bool, timestamp: i64) {
        let mut attempts = self.attempts();
        attempts.push(LoginAttempt {
            email: normalize_email(email),
            timestamp,
            success,
        });
        if attempts.len() > LEDGER_CAP {
            let excess = attempts.len() - LEDGER_CAP;
            attempts.drain(..excess);
        }
        match serde_json::to_string(&attempts) {
            Ok(raw) => {
                self.store.set(LOGIN_ATTEMPTS_KEY, &raw);
                debug!("Recorded login attempt, ledger holds {}", attempts.len());
            }
            Err(err) => warn!("Failed to serialize attempt ledger: {err}"),
        }
    }
}
