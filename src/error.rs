//! Error taxonomy for the login gate.

use thiserror::Error;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Everything a login submission can fail with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// Field-level failures; these never reach the attempt ledger.
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),
    /// Account is temporarily locked after repeated failures.
    #[error("account locked, retry in {} minute(s)", remaining_minutes(.remaining_ms))]
    Locked { remaining_ms: u64 },
    /// Deliberately does not say which half of the pair was wrong.
    #[error("invalid email or password")]
    InvalidCredentials,
    /// The backend did not resolve within the submit timeout.
    #[error("authentication timed out")]
    Timeout,
}

/// Human-readable remaining time, rounded up so "0 minutes" never shows while
/// a lock is still active.
fn remaining_minutes(remaining_ms: &u64) -> u64 {
    remaining_ms.div_ceil(60_000)
}
