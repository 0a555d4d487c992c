//! WebSocket transport.
//!
//! Dials the endpoint with `tokio-tungstenite` and exposes the split
//! stream as [`FrameWriter`] / [`FrameReader`].
//!
//! # Frame Handling
//!
//! | Frame | Behavior |
//! |-------|----------|
//! | Text | Delivered to the reader |
//! | Close | Ends the reader (`None`) |
//! | Binary | Not part of the wire contract, skipped with a warning |
//! | Ping / Pong / raw | Handled by tungstenite, skipped |

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::{Error, Result};

use super::connection::{Connector, FrameReader, FrameWriter, Transport};

// ============================================================================
// Types
// ============================================================================

/// Client-side WebSocket stream.
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ============================================================================
// WsConnector
// ============================================================================

/// Default [`Connector`]: a plain WebSocket client.
///
/// `wss://` endpoints require the `tls` cargo feature.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, endpoint: &Url) -> Result<Transport> {
        let (ws_stream, response) = connect_async(endpoint.as_str())
            .await
            .map_err(|e| Error::connection(format!("WebSocket handshake failed: {e}")))?;

        debug!(status = %response.status(), %endpoint, "WebSocket handshake completed");

        let (sink, stream) = ws_stream.split();
        Ok(Transport::new(WsWriter { sink }, WsReader { stream }))
    }
}

// ============================================================================
// WsWriter
// ============================================================================

/// Outbound half of a WebSocket connection.
struct WsWriter {
    sink: SplitSink<WsStream, Message>,
}

#[async_trait]
impl FrameWriter for WsWriter {
    async fn send_frame(&mut self, text: String) -> Result<()> {
        self.sink.send(Message::Text(text.into())).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.sink.close().await?;
        Ok(())
    }
}

// ============================================================================
// WsReader
// ============================================================================

/// Inbound half of a WebSocket connection.
struct WsReader {
    stream: SplitStream<WsStream>,
}

#[async_trait]
impl FrameReader for WsReader {
    async fn next_frame(&mut self) -> Option<Result<String>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_owned())),

                Ok(Message::Close(frame)) => {
                    debug!(?frame, "WebSocket closed by remote");
                    return None;
                }

                Ok(Message::Binary(data)) => {
                    warn!(len = data.len(), "Ignoring binary frame");
                }

                // Ping, Pong, raw frames
                Ok(other) => trace!(?other, "Ignoring control frame"),

                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
