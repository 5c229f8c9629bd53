//! Login orchestration: validation, lockout gating, submission, persistence.
//!
//! Flow Overview:
//! `Idle → Validating → (Locked | Submitting) → (Success | Failed) → Idle`.
//! Every failure arm returns to `Idle` before `submit` resolves. `Success`
//! holds until the caller finishes the redirect it was handed and navigates
//! away (or calls [`LoginGate::logout`]); the gate cannot observe that, so it
//! does not guess at it.
//!
//! Lockout is inspected before any credential work and is never re-recorded
//! here; only a genuine backend rejection appends a failed attempt. A submit
//! that outlives the hard timeout surfaces as a timeout and writes nothing.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::backend::{AuthBackend, BackendError, SimulatedBackend};
use crate::config::GateConfig;
use crate::credentials::CredentialProvider;
use crate::error::{FieldError, GateError};
use crate::ledger::AttemptLedger;
use crate::lockout::LockoutPolicy;
use crate::session::{SessionStore, UserSession};
use crate::store::KeyValueStore;
use crate::utils::{normalize_email, valid_email};

/// Observable phases of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    Idle,
    Validating,
    Locked,
    Submitting,
    Success,
    Failed,
}

/// What the login form hands over on submit.
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub remember: bool,
    /// Route to land on after the redirect delay; the default landing route
    /// when absent or empty.
    pub return_path: Option<String>,
}

/// Navigation the caller schedules after a successful login. Dropping it (or
/// the submit future) cancels the whole thing; nothing fires on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub path: String,
    pub after: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSuccess {
    pub session: UserSession,
    pub redirect: Redirect,
}

/// The login gate: ties the ledger, lockout policy, backend, and session
/// store together behind one `submit` entry point.
pub struct LoginGate {
    config: GateConfig,
    ledger: AttemptLedger,
    policy: LockoutPolicy,
    backend: Arc<dyn AuthBackend>,
    sessions: SessionStore,
    state: watch::Sender<LoginState>,
}

impl LoginGate {
    #[must_use]
    pub fn new(
        config: GateConfig,
        durable: Arc<dyn KeyValueStore>,
        volatile: Arc<dyn KeyValueStore>,
        backend: Arc<dyn AuthBackend>,
    ) -> Self {
        let policy = LockoutPolicy::new(&config);
        // The ledger lives in the durable tier so lockouts survive restarts.
        let ledger = AttemptLedger::new(durable.clone());
        let sessions = SessionStore::new(durable, volatile);
        let (state, _) = watch::channel(LoginState::Idle);
        Self {
            config,
            ledger,
            policy,
            backend,
            sessions,
            state,
        }
    }

    /// Wire the gate to a [`SimulatedBackend`] over `provider`, using the
    /// configured artificial delay.
    #[must_use]
    pub fn with_simulated_backend(
        config: GateConfig,
        durable: Arc<dyn KeyValueStore>,
        volatile: Arc<dyn KeyValueStore>,
        provider: Arc<dyn CredentialProvider>,
    ) -> Self {
        let backend = Arc::new(SimulatedBackend::new(provider, config.backend_delay()));
        Self::new(config, durable, volatile, backend)
    }

    /// Watch submission phases, e.g. to disable the form while submitting.
    ///
    /// After a successful submit the channel stays at [`LoginState::Success`]
    /// while the redirect is pending; [`logout`](Self::logout) (or the next
    /// submit) moves it on.
    #[must_use]
    pub fn state(&self) -> watch::Receiver<LoginState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn ledger(&self) -> &AttemptLedger {
        &self.ledger
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Run one submission end to end.
    ///
    /// # Errors
    ///
    /// - [`GateError::Validation`] for field problems; no ledger write.
    /// - [`GateError::Locked`] when the account is locked at submit time or
    ///   became locked by this failure.
    /// - [`GateError::InvalidCredentials`] for a backend rejection below the
    ///   lockout threshold.
    /// - [`GateError::Timeout`] when the backend outlives the submit timeout.
    pub async fn submit(&self, form: &LoginForm) -> Result<LoginSuccess, GateError> {
        self.state.send_replace(LoginState::Validating);
        let email = normalize_email(&form.email);
        if let Err(err) = self.validate(&email, &form.password) {
            self.state.send_replace(LoginState::Idle);
            return Err(err);
        }

        let now = Utc::now();
        let attempts = self.ledger.attempts();
        if self.policy.is_locked(&attempts, &email, now) {
            let remaining_ms = self.policy.remaining(&attempts, &email, now);
            warn!("Submission rejected, account is locked out");
            self.state.send_replace(LoginState::Locked);
            self.state.send_replace(LoginState::Idle);
            return Err(GateError::Locked { remaining_ms });
        }

        self.state.send_replace(LoginState::Submitting);
        let resolved = timeout(
            self.config.submit_timeout(),
            self.backend.authenticate(&email, &form.password),
        )
        .await;

        match resolved {
            Err(_elapsed) => {
                // Not a credential rejection, so it does not count toward
                // lockout.
                warn!("Authentication backend timed out");
                self.state.send_replace(LoginState::Failed);
                self.state.send_replace(LoginState::Idle);
                Err(GateError::Timeout)
            }
            Ok(Err(BackendError::InvalidCredentials)) => {
                let now = Utc::now();
                self.ledger.record(&email, false, now.timestamp_millis());
                let attempts = self.ledger.attempts();
                self.state.send_replace(LoginState::Failed);
                self.state.send_replace(LoginState::Idle);
                if self.policy.is_locked(&attempts, &email, now) {
                    let remaining_ms = self.policy.remaining(&attempts, &email, now);
                    warn!("Account locked after repeated failures");
                    Err(GateError::Locked { remaining_ms })
                } else {
                    debug!("Credential rejection recorded");
                    Err(GateError::InvalidCredentials)
                }
            }
            Ok(Ok(role)) => {
                let now = Utc::now();
                self.ledger.record(&email, true, now.timestamp_millis());
                let session = UserSession {
                    email: email.clone(),
                    role,
                    login_time: now,
                };
                self.sessions.save(&session, form.remember);
                let path = form
                    .return_path
                    .clone()
                    .filter(|path| !path.is_empty())
                    .unwrap_or_else(|| self.config.landing_route().to_string());
                info!("Login succeeded, redirect scheduled");
                self.state.send_replace(LoginState::Success);
                Ok(LoginSuccess {
                    session,
                    redirect: Redirect {
                        path,
                        after: self.config.redirect_delay(),
                    },
                })
            }
        }
    }

    /// Clear the persisted session from both tiers and return to `Idle`.
    pub fn logout(&self) {
        self.sessions.clear();
        self.state.send_replace(LoginState::Idle);
        info!("Session cleared");
    }

    /// The session a previous run left behind, if any.
    #[must_use]
    pub fn current_session(&self) -> Option<UserSession> {
        self.sessions.load()
    }

    fn validate(&self, email: &str, password: &str) -> Result<(), GateError> {
        let mut fields = Vec::new();
        if email.is_empty() {
            fields.push(FieldError {
                field: "email",
                message: "Email is required".to_string(),
            });
        } else if !valid_email(email) {
            fields.push(FieldError {
                field: "email",
                message: "Enter a valid email address".to_string(),
            });
        }
        if password.is_empty() {
            fields.push(FieldError {
                field: "password",
                message: "Password is required".to_string(),
            });
        } else if password.len() < self.config.min_password_len() {
            fields.push(FieldError {
                field: "password",
                message: format!(
                    "Password must be at least {} characters",
                    self.config.min_password_len()
                ),
            });
        }
        if fields.is_empty() {
            Ok(())
        } else {
            Err(GateError::Validation(fields))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{Role, StaticCredentials};
    use crate::store::MemoryStore;

    fn gate() -> LoginGate {
        LoginGate::with_simulated_backend(
            GateConfig::default(),
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
            Arc::new(StaticCredentials::seeded()),
        )
    }

    fn form(email: &str, password: &str) -> LoginForm {
        LoginForm {
            email: email.to_string(),
            password: password.to_string(),
            remember: false,
            return_path: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn validation_failures_never_touch_the_ledger() {
        let gate = gate();
        let result = gate.submit(&form("", "")).await;
        let Err(GateError::Validation(fields)) = result else {
            panic!("expected validation error");
        };
        let names: Vec<_> = fields.iter().map(|f| f.field).collect();
        assert_eq!(names, vec!["email", "password"]);
        assert!(gate.ledger().attempts().is_empty());
        assert_eq!(*gate.state().borrow(), LoginState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn short_password_and_bad_email_shape_are_field_errors() {
        let gate = gate();
        let result = gate.submit(&form("not-an-email", "abc")).await;
        let Err(GateError::Validation(fields)) = result else {
            panic!("expected validation error");
        };
        assert_eq!(fields.len(), 2);
        assert!(fields[1].message.contains("at least 6"));
    }

    #[tokio::test(start_paused = true)]
    async fn wrong_password_is_a_generic_rejection_and_is_recorded() {
        let gate = gate();
        let result = gate.submit(&form("admin@lbv-mobilites.ga", "wrong1")).await;
        assert_eq!(result, Err(GateError::InvalidCredentials));
        let attempts = gate.ledger().attempts();
        assert_eq!(attempts.len(), 1);
        assert!(!attempts[0].success);
        assert_eq!(*gate.state().borrow(), LoginState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn successful_login_uses_return_path_and_records_success() {
        let gate = gate();
        let mut form = form(" Admin@LBV-Mobilites.ga ", "admin2024");
        form.return_path = Some("/lines/42".to_string());
        let success = gate.submit(&form).await.expect("login should succeed");
        assert_eq!(success.session.email, "admin@lbv-mobilites.ga");
        assert_eq!(success.session.role, Role::Admin);
        assert_eq!(success.redirect.path, "/lines/42");
        assert_eq!(success.redirect.after, Duration::from_millis(1500));
        let attempts = gate.ledger().attempts();
        assert_eq!(attempts.len(), 1);
        assert!(attempts[0].success);
        assert_eq!(*gate.state().borrow(), LoginState::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_return_path_falls_back_to_the_landing_route() {
        let gate = gate();
        let mut form = form("admin@lbv-mobilites.ga", "admin2024");
        form.return_path = Some(String::new());
        let success = gate.submit(&form).await.expect("login should succeed");
        assert_eq!(success.redirect.path, "/dashboard");
    }

    #[tokio::test(start_paused = true)]
    async fn logout_clears_the_persisted_session() {
        let gate = gate();
        let mut form = form("admin@lbv-mobilites.ga", "admin2024");
        form.remember = true;
        gate.submit(&form).await.expect("login should succeed");
        assert!(gate.current_session().is_some());
        gate.logout();
        assert!(gate.current_session().is_none());
        assert_eq!(*gate.state().borrow(), LoginState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn success_state_holds_until_the_caller_closes_the_loop() {
        let gate = gate();
        gate.submit(&form("admin@lbv-mobilites.ga", "admin2024"))
            .await
            .expect("login should succeed");
        // The redirect is the caller's to schedule; until then the channel
        // reports the pending success.
        assert_eq!(*gate.state().borrow(), LoginState::Success);
        gate.logout();
        assert_eq!(*gate.state().borrow(), LoginState::Idle);
    }
}
