//! Transport layer.
//!
//! This module defines how one connection attempt is made and how frames
//! move over it. The reconnect policy lives one level up in
//! [`client`](crate::client); nothing here retries.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐                             ┌─────────────────┐
//! │ Supervisor task  │                             │  Server         │
//! │                  │         WebSocket           │                 │
//! │  Connector       │◄───────────────────────────►│  /events/users  │
//! │  → Transport     │      ws://host:port/path    │                 │
//! │   (writer/reader)│                             │                 │
//! └──────────────────┘                             └─────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | `Connector`, `Transport` and frame half traits |
//! | `websocket` | `tokio-tungstenite` implementation |

// ============================================================================
// Submodules
// ============================================================================

/// Connector and transport traits.
pub mod connection;

/// WebSocket client transport.
pub mod websocket;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{Connector, FrameReader, FrameWriter, Transport};
pub use websocket::WsConnector;
