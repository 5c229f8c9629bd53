//! Gate configuration and its console defaults.

use std::time::Duration;

const DEFAULT_MAX_ATTEMPTS: usize = 5;
// The console uses one 15-minute constant for both the failure-counting
// window and the lockout duration. Kept conflated on purpose.
const DEFAULT_FAILURE_WINDOW: Duration = Duration::from_secs(15 * 60);
const DEFAULT_LOCKOUT_DURATION: Duration = Duration::from_secs(15 * 60);
const DEFAULT_MIN_PASSWORD_LEN: usize = 6;
const DEFAULT_BACKEND_DELAY: Duration = Duration::from_millis(1500);
const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_REDIRECT_DELAY: Duration = Duration::from_millis(1500);
const DEFAULT_LANDING_ROUTE: &str = "/dashboard";

#[derive(Clone, Debug)]
pub struct GateConfig {
    max_attempts: usize,
    failure_window: Duration,
    lockout_duration: Duration,
    min_password_len: usize,
    backend_delay: Duration,
    submit_timeout: Duration,
    redirect_delay: Duration,
    landing_route: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            failure_window: DEFAULT_FAILURE_WINDOW,
            lockout_duration: DEFAULT_LOCKOUT_DURATION,
            min_password_len: DEFAULT_MIN_PASSWORD_LEN,
            backend_delay: DEFAULT_BACKEND_DELAY,
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
            redirect_delay: DEFAULT_REDIRECT_DELAY,
            landing_route: DEFAULT_LANDING_ROUTE.to_string(),
        }
    }
}

impl GateConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub fn with_failure_window(mut self, window: Duration) -> Self {
        self.failure_window = window;
        self
    }

    #[must_use]
    pub fn with_lockout_duration(mut self, duration: Duration) -> Self {
        self.lockout_duration = duration;
        self
    }

    #[must_use]
    pub fn with_min_password_len(mut self, len: usize) -> Self {
        self.min_password_len = len;
        self
    }

    #[must_use]
    pub fn with_backend_delay(mut self, delay: Duration) -> Self {
        self.backend_delay = delay;
        self
    }

    #[must_use]
    pub fn with_submit_timeout(mut self, timeout: Duration) -> Self {
        self.submit_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_redirect_delay(mut self, delay: Duration) -> Self {
        self.redirect_delay = delay;
        self
    }

    #[must_use]
    pub fn with_landing_route(mut self, route: impl Into<String>) -> Self {
        self.landing_route = route.into();
        self
    }

    #[must_use]
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    #[must_use]
    pub fn failure_window(&self) -> Duration {
        self.failure_window
    }

    #[must_use]
    pub fn lockout_duration(&self) -> Duration {
        self.lockout_duration
    }

    #[must_use]
    pub fn min_password_len(&self) -> usize {
        self.min_password_len
    }

    #[must_use]
    pub fn backend_delay(&self) -> Duration {
        self.backend_delay
    }

    #[must_use]
    pub fn submit_timeout(&self) -> Duration {
        self.submit_timeout
    }

    #[must_use]
    pub fn redirect_delay(&self) -> Duration {
        self.redirect_delay
    }

    #[must_use]
    pub fn landing_route(&self) -> &str {
        &self.landing_route
    }
}
