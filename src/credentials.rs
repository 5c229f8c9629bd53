//! Static credential allow-list standing in for a real identity provider.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::utils::normalize_email;

/// Console roles, in descending order of privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Supervisor,
    Agent,
}

/// Identity lookup capability.
///
/// The flow only ever sees this trait, so a deployment backed by a real
/// identity service can swap the provider without touching the state machine.
pub trait CredentialProvider: Send + Sync {
    /// Exact-match lookup on normalized input. `None` means "invalid
    /// credentials" without saying which half of the pair was wrong.
    fn authenticate(&self, email: &str, password: &str) -> Option<Role>;
}

struct Account {
    password: SecretString,
    role: Role,
}

/// Fixed allow-list seeded at startup.
///
/// Passwords are compared in plaintext because the console always has; any
/// production-intended provider must replace this with hashed verification
/// instead of carrying the gap forward.
pub struct StaticCredentials {
    accounts: HashMap<String, Account>,
}

impl StaticCredentials {
    /// The console's built-in accounts.
    #[must_use]
    pub fn seeded() -> Self {
        let mut provider = Self::empty();
        provider.insert("admin@lbv-mobilites.ga", "admin2024", Role::Admin);
        provider.insert("superviseur@lbv-mobilites.ga", "reseau2024", Role::Supervisor);
        provider.insert("agent@lbv-mobilites.ga", "guichet2024", Role::Agent);
        provider
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            accounts: HashMap::new(),
        }
    }

    /// Register an account; the email is normalized before insertion.
    pub fn insert(&mut self, email: &str, password: &str, role: Role) {
        self.accounts.insert(
            normalize_email(email),
            Account {
                password: SecretString::from(password.to_string()),
                role,
            },
        );
    }
}

impl CredentialProvider for StaticCredentials {
    fn authenticate(&self, email: &str, password: &str) -> Option<Role> {
        let account = self.accounts.get(&normalize_email(email))?;
        if account.password.expose_secret() == password {
            debug!("Credential match for known account");
            Some(account.role)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_accounts_authenticate() {
        let provider = StaticCredentials::seeded();
        assert_eq!(
            provider.authenticate("admin@lbv-mobilites.ga", "admin2024"),
            Some(Role::Admin)
        );
        assert_eq!(
            provider.authenticate("agent@lbv-mobilites.ga", "guichet2024"),
            Some(Role::Agent)
        );
    }

    #[test]
    fn authenticate_ignores_casing_and_whitespace() {
        let provider = StaticCredentials::seeded();
        assert_eq!(
            provider.authenticate(" Admin@LBV-Mobilites.ga ", "admin2024"),
            Some(Role::Admin)
        );
    }

    #[test]
    fn wrong_password_and_unknown_email_both_return_none() {
        let provider = StaticCredentials::seeded();
        assert_eq!(provider.authenticate("admin@lbv-mobilites.ga", "nope"), None);
        assert_eq!(provider.authenticate("ghost@lbv-mobilites.ga", "admin2024"), None);
    }

    #[test]
    fn insert_normalizes_the_stored_email() {
        let mut provider = StaticCredentials::empty();
        provider.insert("  New@LBV-Mobilites.GA", "secret", Role::Supervisor);
        assert_eq!(
            provider.authenticate("new@lbv-mobilites.ga", "secret"),
            Some(Role::Supervisor)
        );
    }

    #[test]
    fn role_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Role::Supervisor).unwrap(),
            "\"supervisor\""
        );
    }
}
