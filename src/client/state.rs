//! Connection lifecycle state.
//!
//! ```text
//!          connect()
//!   Idle ───────────► Connecting ──────► Open
//!    ▲                   ▲   │             │
//!    │ cap reached /     │   │ failure     │ closure
//!    │ shutdown()        │   ▼             ▼
//!    └──────────────── Closed ◄────────────┘
//!                  (retry interval)
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use crate::identifiers::Generation;

// ============================================================================
// ConnectionState
// ============================================================================

/// Lifecycle state of the managed connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// No attempt in flight.
    #[default]
    Idle,
    /// Handshake requested.
    Connecting,
    /// Handshake succeeded; frames may flow.
    Open,
    /// Transport ended; a retry is pending.
    Closed,
}

impl ConnectionState {
    /// Returns `true` while a connection is being made, is open, or a
    /// retry is pending.
    #[inline]
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

// ============================================================================
// ConnectionStatus
// ============================================================================

/// State together with the generation of the attempt it belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionStatus {
    /// Current lifecycle state.
    pub state: ConnectionState,
    /// Attempt the state refers to. [`Generation::ZERO`] before the first.
    pub generation: Generation,
}

impl ConnectionStatus {
    /// Returns the open generation, if the connection is open.
    #[inline]
    #[must_use]
    pub fn open_generation(&self) -> Option<Generation> {
        (self.state == ConnectionState::Open).then_some(self.generation)
    }
}

// ============================================================================
// Tests
// ============================================================================
