//! Connection manager configuration.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use resocket::{Greeting, RetryPolicy};
//!
//! let retry = RetryPolicy::constant(Duration::from_secs(1)).with_max_attempts(10);
//! let greeting = Greeting::new("Yay connection complete!")
//!     .with_delay(Duration::from_millis(250));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::error::ErrorHandler;
use crate::transport::Connector;

// ============================================================================
// Constants
// ============================================================================

/// Delay between a closure and the next connection attempt.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(1000);

/// Delay between reaching `Open` and sending the greeting.
pub const DEFAULT_GREETING_DELAY: Duration = Duration::from_millis(500);

/// Handshake timeout for one connection attempt.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// RetryPolicy
// ============================================================================

/// Rule governing the delay and number of reconnect attempts.
///
/// The default retries forever at a constant 1000 ms interval, without
/// growth or jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay between a closure and the next attempt.
    pub interval: Duration,

    /// Consecutive failed attempts allowed before giving up.
    ///
    /// An attempt fails when it never reaches `Open`. The counter resets
    /// whenever a connection opens. `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::constant(DEFAULT_RETRY_INTERVAL)
    }
}

impl RetryPolicy {
    /// Creates an unbounded constant-interval policy.
    #[inline]
    #[must_use]
    pub const fn constant(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
        }
    }

    /// Caps the number of consecutive failed attempts.
    #[inline]
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Returns `true` if another attempt is allowed after `failures`
    /// consecutive failed attempts.
    #[inline]
    #[must_use]
    pub fn allows(&self, failures: u32) -> bool {
        self.max_attempts.is_none_or(|max| failures < max)
    }
}

// ============================================================================
// Greeting
// ============================================================================

/// One-shot message sent shortly after every successful connection.
///
/// Sending is best-effort: it is skipped if the connection closes before
/// the delay elapses, and write failures are only logged.
#[derive(Debug, Clone, PartialEq)]
pub struct Greeting {
    /// Delay after reaching `Open`.
    pub delay: Duration,

    /// Payload sent as one frame.
    pub payload: Value,
}

impl Greeting {
    /// Creates a greeting with the default 500 ms delay.
    #[inline]
    #[must_use]
    pub fn new(payload: impl Into<Value>) -> Self {
        Self {
            delay: DEFAULT_GREETING_DELAY,
            payload: payload.into(),
        }
    }

    /// Sets the delay after reaching `Open`.
    #[inline]
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

// ============================================================================
// ManagerConfig
// ============================================================================

/// Validated configuration shared by a manager and its supervisor task.
#[derive(Clone)]
pub(crate) struct ManagerConfig {
    pub(crate) endpoint: Url,
    pub(crate) retry: RetryPolicy,
    pub(crate) connect_timeout: Duration,
    pub(crate) greeting: Option<Greeting>,
    pub(crate) connector: Arc<dyn Connector>,
    pub(crate) on_error: Option<ErrorHandler>,
}

impl fmt::Debug for ManagerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("retry", &self.retry)
            .field("connect_timeout", &self.connect_timeout)
            .field("greeting", &self.greeting)
            .field("on_error", &self.on_error.is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
