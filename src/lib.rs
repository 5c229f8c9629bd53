//! Login throttling and session persistence for the LBV Mobilités admin console.
//!
//! Flow Overview:
//! 1) Submitted credentials are normalized and field-validated.
//! 2) The lockout policy is derived from a capped ledger of recent attempts;
//!    locked accounts are rejected before any credential work happens.
//! 3) The authentication backend resolves under a hard timeout.
//! 4) Successful logins are persisted across durable or volatile storage,
//!    honoring the "remember me" choice.
//!
//! Security boundaries: the invalid-credentials message never reveals whether
//! the email or the password was wrong, and lockout inspection never records a
//! new attempt. Only a genuine backend rejection counts toward lockout.

pub mod backend;
pub mod config;
pub mod credentials;
pub mod error;
pub mod flow;
pub mod ledger;
pub mod lockout;
pub mod session;
pub mod store;
pub mod utils;

pub use backend::{AuthBackend, BackendError, SimulatedBackend};
pub use config::GateConfig;
pub use credentials::{CredentialProvider, Role, StaticCredentials};
pub use error::{FieldError, GateError};
pub use flow::{LoginForm, LoginGate, LoginState, LoginSuccess, Redirect};
pub use ledger::{AttemptLedger, LoginAttempt};
pub use lockout::LockoutPolicy;
pub use session::{SessionStore, UserSession};
pub use store::{FileStore, KeyValueStore, MemoryStore};
