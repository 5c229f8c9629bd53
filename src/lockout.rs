//! Lockout policy derived from an attempt-ledger snapshot.
//!
//! The policy is a pure function of the snapshot it is given: no counter is
//! persisted anywhere, so it is only ever as current as the ledger itself.
//! Failures are counted in a trailing window measured from "now", not from
//! the moment the lock tripped, and the window shares its length with the
//! lockout duration by default. Both quirks match the console and stay.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::config::GateConfig;
use crate::ledger::LoginAttempt;
use crate::utils::normalize_email;

#[derive(Clone, Debug)]
pub struct LockoutPolicy {
    max_attempts: usize,
    failure_window: Duration,
    lockout_duration: Duration,
}

impl LockoutPolicy {
    #[must_use]
    pub fn new(config: &GateConfig) -> Self {
        Self {
            max_attempts: config.max_attempts(),
            failure_window: config.failure_window(),
            lockout_duration: config.lockout_duration(),
        }
    }

    /// Failed attempts for `email` whose timestamp falls within `window`
    /// before `now`.
    #[must_use]
    pub fn count_failures(
        &self,
        attempts: &[LoginAttempt],
        email: &str,
        window: Duration,
        now: DateTime<Utc>,
    ) -> usize {
        let email = normalize_email(email);
        let window_ms = millis(window);
        let now_ms = now.timestamp_millis();
        attempts
            .iter()
            .filter(|attempt| {
                !attempt.success
                    && attempt.email == email
                    && now_ms.saturating_sub(attempt.timestamp) < window_ms
            })
            .count()
    }

    /// True once the failure count within the default window reaches the
    /// configured maximum.
    #[must_use]
    pub fn is_locked(&self, attempts: &[LoginAttempt], email: &str, now: DateTime<Utc>) -> bool {
        self.count_failures(attempts, email, self.failure_window, now) >= self.max_attempts
    }

    /// Milliseconds until the lock expires, floored at zero. Zero when the
    /// account is not locked.
    #[must_use]
    pub fn remaining(&self, attempts: &[LoginAttempt], email: &str, now: DateTime<Utc>) -> u64 {
        if !self.is_locked(attempts, email, now) {
            return 0;
        }
        let email = normalize_email(email);
        let window_ms = millis(self.failure_window);
        let now_ms = now.timestamp_millis();
        // The lock runs from the last qualifying failure, not the first.
        let last_failure = attempts
            .iter()
            .filter(|attempt| {
                !attempt.success
                    && attempt.email == email
                    && now_ms.saturating_sub(attempt.timestamp) < window_ms
            })
            .map(|attempt| attempt.timestamp)
            .max();
        match last_failure {
            Some(ts) => {
                let expires_at = ts.saturating_add(millis(self.lockout_duration));
                u64::try_from(expires_at.saturating_sub(now_ms)).unwrap_or(0)
            }
            None => 0,
        }
    }
}

fn millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}
