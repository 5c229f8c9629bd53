//! Session persistence across durable and volatile storage tiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::credentials::Role;
use crate::store::{
    KeyValueStore, AUTH_TOKEN_KEY, LAST_LOGIN_KEY, REFRESH_TOKEN_KEY, REMEMBER_ME_KEY,
    USER_DATA_KEY,
};

/// The authenticated identity, written once at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub email: String,
    pub role: Role,
    pub login_time: DateTime<Utc>,
}

/// Two-tier session persistence.
///
/// The durable tier survives restarts; the volatile tier lives and dies with
/// the current tab. Which tier holds the session is the user's "remember me"
/// choice, made at login and not revisited until the next one.
pub struct SessionStore {
    durable: Arc<dyn KeyValueStore>,
    volatile: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    #[must_use]
    pub fn new(durable: Arc<dyn KeyValueStore>, volatile: Arc<dyn KeyValueStore>) -> Self {
        Self { durable, volatile }
    }

    /// Persist the session in the tier selected by `remember`, stamping the
    /// last-login timestamp alongside it.
    pub fn save(&self, session: &UserSession, remember: bool) {
        let raw = match serde_json::to_string(session) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("Failed to serialize session: {err}");
                return;
            }
        };
        let tier: &dyn KeyValueStore = if remember {
            self.durable.as_ref()
        } else {
            self.volatile.as_ref()
        };
        tier.set(USER_DATA_KEY, &raw);
        tier.set(LAST_LOGIN_KEY, &session.login_time.to_rfc3339());
        if remember {
            self.durable.set(REMEMBER_ME_KEY, "true");
        }
        debug!("Session persisted (remember = {remember})");
    }

    /// Durable tier first, volatile as fallback. Malformed content in either
    /// tier reads as absent.
    #[must_use]
    pub fn load(&self) -> Option<UserSession> {
        load_tier(self.durable.as_ref()).or_else(|| load_tier(self.volatile.as_ref()))
    }

    /// Remove every session key from both tiers, including the reserved token
    /// slots. Safe to call repeatedly.
    pub fn clear(&self) {
        for tier in [self.durable.as_ref(), self.volatile.as_ref()] {
            for key in [
                AUTH_TOKEN_KEY,
                REFRESH_TOKEN_KEY,
                USER_DATA_KEY,
                REMEMBER_ME_KEY,
                LAST_LOGIN_KEY,
            ] {
                tier.remove(key);
            }
        }
        debug!("Session keys cleared from both tiers");
    }
}

fn load_tier(tier: &dyn KeyValueStore) -> Option<UserSession> {
    let raw = tier.get(USER_DATA_KEY)?;
    match serde_json::from_str(&raw) {
        Ok(session) => Some(session),
        Err(err) => {
            warn!("Discarding malformed stored session: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn session() -> UserSession {
        UserSession {
            email: "admin@lbv-mobilites.ga".to_string(),
            role: Role::Admin,
            login_time: Utc::now(),
        }
    }

    fn stores() -> (Arc<MemoryStore>, Arc<MemoryStore>, SessionStore) {
        let durable = Arc::new(MemoryStore::new());
        let volatile = Arc::new(MemoryStore::new());
        let store = SessionStore::new(durable.clone(), volatile.clone());
        (durable, volatile, store)
    }

    #[test]
    fn remembered_session_survives_volatile_wipe() {
        let (_durable, volatile, store) = stores();
        let session = session();
        store.save(&session, true);
        volatile.wipe();
        assert_eq!(store.load().as_ref(), Some(&session));
    }

    #[test]
    fn unremembered_session_survives_durable_wipe_but_not_clear() {
        let (durable, _volatile, store) = stores();
        let session = session();
        store.save(&session, false);
        durable.wipe();
        assert_eq!(store.load().as_ref(), Some(&session));
        store.clear();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn unremembered_session_dies_with_the_tab() {
        let (_durable, volatile, store) = stores();
        store.save(&session(), false);
        volatile.wipe();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn save_stamps_last_login_and_remember_flag() {
        let (durable, volatile, store) = stores();
        let session = session();
        store.save(&session, true);
        assert_eq!(
            durable.get(LAST_LOGIN_KEY),
            Some(session.login_time.to_rfc3339())
        );
        assert_eq!(durable.get(REMEMBER_ME_KEY), Some("true".to_string()));
        // Nothing leaked into the other tier.
        assert_eq!(volatile.get(USER_DATA_KEY), None);
    }

    #[test]
    fn clear_is_idempotent_and_sweeps_reserved_keys() {
        let (durable, _volatile, store) = stores();
        durable.set(AUTH_TOKEN_KEY, "stale");
        durable.set(REFRESH_TOKEN_KEY, "stale");
        store.save(&session(), true);
        store.clear();
        store.clear();
        assert_eq!(durable.get(AUTH_TOKEN_KEY), None);
        assert_eq!(durable.get(REFRESH_TOKEN_KEY), None);
        assert_eq!(store.load(), None);
    }

    #[test]
    fn malformed_user_data_reads_as_absent() {
        let (durable, _volatile, store) = stores();
        durable.set(USER_DATA_KEY, "{broken");
        assert_eq!(store.load(), None);
    }
}
