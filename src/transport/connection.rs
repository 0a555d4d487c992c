//! Transport seams.
//!
//! The reconnect loop never talks to a socket type directly. It asks a
//! [`Connector`] for a fresh [`Transport`] on every attempt and drives the
//! two halves it gets back:
//!
//! - [`FrameWriter`] - outbound text frames and the closing handshake
//! - [`FrameReader`] - inbound text frames until the transport ends
//!
//! Keeping the halves separate lets the supervisor wait on inbound frames
//! and caller commands at the same time inside one `tokio::select!`.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use url::Url;

use crate::error::Result;

// ============================================================================
// Traits
// ============================================================================

/// Establishes transports to an endpoint.
///
/// Called once per connection attempt. Implementations must not keep a
/// reference to a transport they hand out.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Performs the handshake and returns the connected transport.
    ///
    /// # Errors
    ///
    /// Any error is treated as an establishment failure and retried
    /// according to the retry policy.
    async fn connect(&self, endpoint: &Url) -> Result<Transport>;
}

/// Outbound half of a transport.
#[async_trait]
pub trait FrameWriter: Send {
    /// Writes one text frame.
    async fn send_frame(&mut self, text: String) -> Result<()>;

    /// Starts the closing handshake.
    async fn close(&mut self) -> Result<()>;
}

/// Inbound half of a transport.
#[async_trait]
pub trait FrameReader: Send {
    /// Waits for the next text frame.
    ///
    /// Returns `None` once the transport has ended (remote close or end of
    /// stream) and `Some(Err(_))` on a transport failure. Must be cancel
    /// safe: dropping the future must not lose a frame.
    async fn next_frame(&mut self) -> Option<Result<String>>;
}

// ============================================================================
// Transport
// ============================================================================

/// One established connection, split into its two halves.
///
/// Owned exclusively by the supervisor task for as long as the connection
/// is open; dropping it releases the underlying socket.
pub struct Transport {
    pub(crate) writer: Box<dyn FrameWriter>,
    pub(crate) reader: Box<dyn FrameReader>,
}

impl Transport {
    /// Creates a transport from its halves.
    #[must_use]
    pub fn new<W, R>(writer: W, reader: R) -> Self
    where
        W: FrameWriter + 'static,
        R: FrameReader + 'static,
    {
        Self {
            writer: Box::new(writer),
            reader: Box::new(reader),
        }
    }

    /// Splits the transport into its halves.
    #[must_use]
    pub fn into_parts(self) -> (Box<dyn FrameWriter>, Box<dyn FrameReader>) {
        (self.writer, self.reader)
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport").finish_non_exhaustive()
    }
}
