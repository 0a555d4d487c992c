//! Reconnecting client.
//!
//! This module provides the caller-facing [`ConnectionManager`] and the
//! supervisor task that keeps it connected.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ConnectionManager`] | Handle: `connect`, `send`, `shutdown`, state |
//! | [`ConnectionManagerBuilder`] | Fluent configuration builder |
//! | [`Inbound`] | Receiver of decoded inbound events |
//! | [`RetryPolicy`] | Retry interval and optional attempt cap |
//! | [`Greeting`] | Post-connect one-shot message |
//! | [`ConnectionState`] | `Idle` / `Connecting` / `Open` / `Closed` |
//!
//! # Example
//!
//! ```no_run
//! use resocket::{ConnectionManager, Result};
//!
//! # async fn example() -> Result<()> {
//! let (manager, mut inbound) = ConnectionManager::builder()
//!     .endpoint("ws://localhost:9595/events/users")
//!     .build()?;
//!
//! manager.connect();
//! manager.send(&"hello")?;
//!
//! if let Some(event) = inbound.recv().await {
//!     println!("{}", event.value());
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder for manager configuration.
pub mod builder;

/// Retry policy, greeting and shared configuration.
pub mod config;

/// Manager handle and inbound receiver.
pub mod core;

/// Lifecycle state types.
pub mod state;

/// Reconnect loop task.
mod supervisor;


// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ConnectionManagerBuilder;
pub use config::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_GREETING_DELAY, DEFAULT_RETRY_INTERVAL, Greeting,
    RetryPolicy,
};
pub use self::core::{ConnectionManager, Inbound};
pub use state::{ConnectionState, ConnectionStatus};
