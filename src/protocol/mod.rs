//! Wire protocol.
//!
//! The protocol is deliberately thin: one JSON document per text frame,
//! in both directions. There is no envelope, no message ids and no
//! acknowledgement.
//!
//! | Direction | Type | Encoding |
//! |-----------|------|----------|
//! | Client → Server | any `Serialize` value | [`encode`] |
//! | Server → Client | [`InboundEvent`] | [`decode`] |

// ============================================================================
// Submodules
// ============================================================================

/// Frame encoding and the inbound event type.
pub mod frame;

// ============================================================================
// Re-exports
// ============================================================================

pub use frame::{InboundEvent, decode, encode};
