//! Authentication backend port and the console's simulated implementation.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::debug;

use crate::credentials::{CredentialProvider, Role};

/// Ways the backend itself can reject a submission. Timeouts are modeled at
/// the flow layer, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("invalid email or password")]
    InvalidCredentials,
}

/// Async port in front of whatever actually verifies credentials.
///
/// Implementations just resolve; the flow owns the submit timeout, and
/// dropping the in-flight future is how a caller cancels.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn authenticate(&self, email: &str, password: &str) -> Result<Role, BackendError>;
}

/// Local stand-in that answers from a credential provider after an artificial
/// delay, mimicking the latency of a real identity service.
pub struct SimulatedBackend {
    provider: Arc<dyn CredentialProvider>,
    delay: Duration,
}

impl SimulatedBackend {
    #[must_use]
    pub fn new(provider: Arc<dyn CredentialProvider>, delay: Duration) -> Self {
        Self { provider, delay }
    }
}

#[async_trait]
impl AuthBackend for SimulatedBackend {
    async fn authenticate(&self, email: &str, password: &str) -> Result<Role, BackendError> {
        debug!("Simulating identity service round trip");
        sleep(self.delay).await;
        self.provider
            .authenticate(email, password)
            .ok_or(BackendError::InvalidCredentials)
    }
}
