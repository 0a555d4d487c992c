//! Error types for resocket.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! Fallible configuration and encoding return [`Result<T>`] which uses
//! [`Error`]. Transport failures are never returned to the caller of
//! [`ConnectionManager::send`](crate::ConnectionManager::send); they are
//! recovered by the reconnect loop and reported through `tracing` and the
//! optional error sink.
//!
//! ```ignore
//! use resocket::{ConnectionManager, Result};
//!
//! fn example() -> Result<()> {
//!     let (manager, _inbound) = ConnectionManager::builder()
//!         .endpoint("ws://localhost:9595/events/users")
//!         .build()?;
//!     manager.send(&"hello")?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::InvalidUrl`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionTimeout`], [`Error::ConnectionClosed`] |
//! | Protocol | [`Error::Decode`] |
//! | External | [`Error::Json`], [`Error::WebSocket`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;
use std::sync::Arc;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Constants
// ============================================================================

/// Maximum number of characters of an offending frame kept in a decode error.
const FRAME_PREVIEW_CHARS: usize = 256;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

/// Observability sink for errors the reconnect loop recovers from.
///
/// Invoked from the supervisor task; keep it cheap and non-blocking.
pub type ErrorHandler = Arc<dyn Fn(&Error) + Send + Sync>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned by the builder when a setting is missing or invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Endpoint URL could not be parsed.
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Transport could not be established.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Handshake did not complete in time.
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// Transport closed while an operation was in flight.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Inbound frame is not a valid encoded value.
    ///
    /// Reported through the error sink; the frame is skipped and the
    /// connection stays open.
    #[error("Failed to decode inbound frame: {message} (frame: {frame})")]
    Decode {
        /// Parser error description.
        message: String,
        /// Leading part of the offending frame.
        frame: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        Self::ConnectionTimeout { timeout_ms }
    }

    /// Creates a decode error, keeping a bounded preview of the frame.
    pub fn decode(message: impl Into<String>, frame: &str) -> Self {
        let frame = match frame.char_indices().nth(FRAME_PREVIEW_CHARS) {
            Some((end, _)) => format!("{}...", &frame[..end]),
            None => frame.to_owned(),
        };

        Self::Decode {
            message: message.into(),
            frame,
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ConnectionTimeout { .. })
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::ConnectionTimeout { .. }
                | Self::ConnectionClosed
                | Self::WebSocket(_)
        )
    }

    /// Returns `true` if this is an inbound decode error.
    #[inline]
    #[must_use]
    pub fn is_decode_error(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    /// Returns `true` if this is a configuration error.
    #[inline]
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::InvalidUrl(_))
    }
}

// ============================================================================
// Tests
// ============================================================================
