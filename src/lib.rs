//! resocket - Self-healing WebSocket event stream client.
//!
//! This library keeps a single logical, always-available bidirectional
//! event stream to a server over an unreliable transport. Drops are
//! recovered automatically; callers only see `send` and a stream of
//! decoded inbound events.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  send()   ┌──────────────────┐   WebSocket   ┌──────────┐
//! │   Caller     │──────────►│ ConnectionManager│◄─────────────►│  Server  │
//! │ (UI, store)  │◄──────────│  └ supervisor    │  JSON frames  │          │
//! └──────────────┘  Inbound  └──────────────────┘               └──────────┘
//! ```
//!
//! Key design principles:
//!
//! - One supervisor task owns the only transport; no process-wide state
//! - Constant-interval retry, unbounded by default
//! - Every attempt has a [`Generation`]; stale timers and messages are dropped
//! - `send` while disconnected is a silent no-op; nothing is buffered
//! - Decode failures are reported, never fatal
//!
//! # Quick Start
//!
//! ```no_run
//! use resocket::{ConnectionManager, Greeting, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let (manager, mut inbound) = ConnectionManager::builder()
//!         .endpoint("ws://localhost:9595/events/users")
//!         .greeting(Greeting::new("Yay connection complete!"))
//!         .build()?;
//!
//!     manager.connect();
//!
//!     while let Some(event) = inbound.recv().await {
//!         println!("{}", event.value());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | [`ConnectionManager`], builder, state, retry policy |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | [`Generation`] counter |
//! | [`protocol`] | JSON text frame encoding |
//! | [`transport`] | [`Connector`] seam and WebSocket transport |

// ============================================================================
// Modules
// ============================================================================

/// Reconnecting client.
///
/// Use [`ConnectionManager::builder()`] to create a configured manager.
pub mod client;

/// Error types and result aliases.
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Wire format of inbound and outbound frames.
pub mod protocol;

/// Connector seam and WebSocket transport.
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

// Client types
pub use client::{
    ConnectionManager, ConnectionManagerBuilder, ConnectionState, ConnectionStatus, Greeting,
    Inbound, RetryPolicy,
};

// Error types
pub use error::{Error, ErrorHandler, Result};

// Identifier types
pub use identifiers::Generation;

// Protocol types
pub use protocol::InboundEvent;

// Transport types
pub use transport::{Connector, FrameReader, FrameWriter, Transport, WsConnector};
