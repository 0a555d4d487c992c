//! Builder pattern for connection manager configuration.
//!
//! Provides a fluent API for configuring and creating [`ConnectionManager`]
//! instances.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use resocket::{ConnectionManager, Greeting, RetryPolicy};
//!
//! # fn example() -> resocket::Result<()> {
//! let (manager, inbound) = ConnectionManager::builder()
//!     .endpoint("ws://localhost:9595/events/users")
//!     .retry(RetryPolicy::constant(Duration::from_secs(1)))
//!     .greeting(Greeting::new("Yay connection complete!"))
//!     .on_error(|e| eprintln!("reported: {e}"))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::error::{Error, ErrorHandler, Result};
use crate::transport::{Connector, WsConnector};

use super::config::{DEFAULT_CONNECT_TIMEOUT, Greeting, ManagerConfig, RetryPolicy};
use super::core::{ConnectionManager, Inbound};

// ============================================================================
// ConnectionManagerBuilder
// ============================================================================

/// Builder for configuring a [`ConnectionManager`].
///
/// Use [`ConnectionManager::builder()`] to create a new builder.
#[derive(Clone, Default)]
pub struct ConnectionManagerBuilder {
    /// Endpoint URL, unparsed until `build()`.
    endpoint: Option<String>,
    /// Retry policy.
    retry: RetryPolicy,
    /// Handshake timeout; `None` means the default.
    connect_timeout: Option<Duration>,
    /// Post-connect greeting.
    greeting: Option<Greeting>,
    /// Transport factory; `None` means WebSocket.
    connector: Option<Arc<dyn Connector>>,
    /// Error sink.
    on_error: Option<ErrorHandler>,
}

// ============================================================================
// ConnectionManagerBuilder Implementation
// ============================================================================

impl ConnectionManagerBuilder {
    /// Creates a new builder with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the endpoint URL (e.g. `ws://localhost:9595/events/users`).
    #[inline]
    #[must_use]
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = Some(url.into());
        self
    }

    /// Sets the endpoint from host, port and path over plain `ws://`.
    #[must_use]
    pub fn endpoint_parts(mut self, host: &str, port: u16, path: &str) -> Self {
        let path = path.trim_start_matches('/');
        self.endpoint = Some(format!("ws://{host}:{port}/{path}"));
        self
    }

    /// Sets the retry policy.
    #[inline]
    #[must_use]
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Sets the constant delay between a closure and the next attempt.
    #[inline]
    #[must_use]
    pub fn retry_interval(mut self, interval: Duration) -> Self {
        self.retry.interval = interval;
        self
    }

    /// Caps consecutive failed attempts.
    #[inline]
    #[must_use]
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.retry.max_attempts = Some(max_attempts);
        self
    }

    /// Sets the handshake timeout for each attempt.
    #[inline]
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sends `greeting` shortly after every successful connection.
    #[inline]
    #[must_use]
    pub fn greeting(mut self, greeting: Greeting) -> Self {
        self.greeting = Some(greeting);
        self
    }

    /// Replaces the WebSocket transport.
    #[inline]
    #[must_use]
    pub fn connector<C: Connector>(mut self, connector: C) -> Self {
        self.connector = Some(Arc::new(connector));
        self
    }

    /// Registers a sink for errors the loop recovers from (decode and
    /// write failures).
    #[inline]
    #[must_use]
    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(handler));
        self
    }

    /// Builds the manager with validation.
    ///
    /// The manager starts `Idle`; call
    /// [`ConnectionManager::connect`] to start the loop.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the endpoint is missing, not `ws`/`wss`, has
    ///   no host, or a duration/cap is zero
    /// - [`Error::InvalidUrl`] if the endpoint does not parse
    pub fn build(self) -> Result<(ConnectionManager, Inbound)> {
        let endpoint = self.validate_endpoint()?;
        self.validate_timing()?;

        let config = ManagerConfig {
            endpoint,
            retry: self.retry,
            connect_timeout: self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            greeting: self.greeting,
            connector: self.connector.unwrap_or_else(|| Arc::new(WsConnector)),
            on_error: self.on_error,
        };

        Ok(ConnectionManager::new(config))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl ConnectionManagerBuilder {
    /// Validates the endpoint configuration.
    fn validate_endpoint(&self) -> Result<Url> {
        let raw = self.endpoint.as_deref().ok_or_else(|| {
            Error::config(
                "Endpoint is required. Use .endpoint() to set it.\n\
                 Example: ConnectionManager::builder().endpoint(\"ws://localhost:9595/events/users\")",
            )
        })?;

        let url = Url::parse(raw)?;

        match url.scheme() {
            "ws" => {}
            "wss" if cfg!(feature = "tls") => {}
            "wss" => {
                return Err(Error::config(
                    "wss:// endpoints require the `tls` feature",
                ));
            }
            other => {
                return Err(Error::config(format!(
                    "Unsupported endpoint scheme '{other}', expected ws:// or wss://"
                )));
            }
        }

        if url.host_str().is_none_or(str::is_empty) {
            return Err(Error::config(format!("Endpoint has no host: {url}")));
        }

        Ok(url)
    }

    /// Validates retry and timeout settings.
    fn validate_timing(&self) -> Result<()> {
        if self.retry.interval.is_zero() {
            return Err(Error::config("Retry interval must be greater than zero"));
        }

        if self.retry.max_attempts == Some(0) {
            return Err(Error::config("max_attempts must be at least 1"));
        }

        if self.connect_timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::config("Connect timeout must be greater than zero"));
        }

        Ok(())
    }
}

impl fmt::Debug for ConnectionManagerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManagerBuilder")
            .field("endpoint", &self.endpoint)
            .field("retry", &self.retry)
            .field("connect_timeout", &self.connect_timeout)
            .field("greeting", &self.greeting)
            .field("connector", &self.connector.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
