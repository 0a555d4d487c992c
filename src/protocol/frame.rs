//! Text frame encoding and decoding.
//!
//! Every frame on the wire is a single JSON document carried in a
//! WebSocket text message. Outbound values are anything that implements
//! [`Serialize`]; inbound frames are decoded into an [`InboundEvent`]
//! wrapping a [`serde_json::Value`].
//!
//! # Format
//!
//! ```json
//! "Yay connection complete!"
//! {"op": "insert", "collection": "users", "doc": {"name": "Loke"}}
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, from_str, from_value, to_string};

use crate::error::{Error, Result};

// ============================================================================
// Encoding
// ============================================================================

/// Serializes an outbound value into the text of one frame.
///
/// # Errors
///
/// Returns [`Error::Json`] if the value cannot be represented as JSON
/// (e.g. a map with non-string keys).
#[inline]
pub fn encode<T>(value: &T) -> Result<String>
where
    T: Serialize + ?Sized,
{
    Ok(to_string(value)?)
}

/// Decodes the text of one inbound frame.
///
/// # Errors
///
/// Returns [`Error::Decode`] carrying a preview of the frame when the text
/// is not a valid JSON document.
pub fn decode(text: &str) -> Result<InboundEvent> {
    from_str::<Value>(text)
        .map(InboundEvent)
        .map_err(|e| Error::decode(e.to_string(), text))
}

// ============================================================================
// InboundEvent
// ============================================================================

/// A decoded value received from the server.
///
/// The payload is opaque to this crate; use [`InboundEvent::decode`] to
/// turn it into an application type.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent(Value);

impl InboundEvent {
    /// Wraps an already-decoded value.
    #[inline]
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Returns the raw JSON value.
    #[inline]
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Consumes the event, returning the raw JSON value.
    #[inline]
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Deserializes the payload into an application type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the payload does not match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(from_value(self.0.clone())?)
    }

    /// Returns the payload as a string slice if it is a JSON string.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_str()
    }
}

impl From<Value> for InboundEvent {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

// ============================================================================
// Tests
// ============================================================================
