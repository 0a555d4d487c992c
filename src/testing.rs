//! In-memory transport for tests.
//!
//! [`MockConnector`] hands out transports backed by channels. For every
//! accepted attempt the test receives a [`ServerEnd`] through which it can
//! push frames to the client, read what the client wrote, and simulate a
//! remote close by dropping it.

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use url::Url;

use crate::error::{Error, Result};
use crate::transport::{Connector, FrameReader, FrameWriter, Transport};

// ============================================================================
// Outcome
// ============================================================================

/// Scripted result of one connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Accept,
    Refuse,
    /// Handshake never completes.
    Hang,
}

// ============================================================================
// ServerEnd
// ============================================================================

/// Test-side view of one accepted transport.
pub(crate) struct ServerEnd {
    /// 1-based attempt number.
    pub(crate) attempt: usize,
    /// Frames pushed to the client.
    pub(crate) frames: mpsc::UnboundedSender<String>,
    /// Frames the client wrote.
    pub(crate) received: mpsc::UnboundedReceiver<String>,
    /// Set when the client started the closing handshake.
    pub(crate) closed_by_client: Arc<AtomicBool>,
}

impl ServerEnd {
    /// Pushes one frame to the client.
    pub(crate) fn push(&self, text: &str) {
        self.frames.send(text.to_owned()).expect("client reader alive");
    }

    /// Returns every frame the client has written so far.
    pub(crate) fn drain(&mut self) -> Vec<String> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.received.try_recv() {
            frames.push(frame);
        }
        frames
    }

    /// Returns `true` once the client dropped its transport.
    pub(crate) fn is_released(&self) -> bool {
        self.frames.is_closed()
    }
}

// ============================================================================
// MockConnector
// ============================================================================

struct MockState {
    script: Mutex<VecDeque<Outcome>>,
    server_ends: mpsc::UnboundedSender<ServerEnd>,
    attempts: AtomicUsize,
    active: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    overlapping: AtomicBool,
    close_delay: Mutex<Duration>,
}

/// Channel-backed [`Connector`].
#[derive(Clone)]
pub(crate) struct MockConnector {
    state: Arc<MockState>,
}

impl MockConnector {
    /// Creates a connector accepting every attempt unless scripted otherwise.
    pub(crate) fn new() -> (Self, mpsc::UnboundedReceiver<ServerEnd>) {
        let (server_ends, rx) = mpsc::unbounded_channel();
        let connector = Self {
            state: Arc::new(MockState {
                script: Mutex::new(VecDeque::new()),
                server_ends,
                attempts: AtomicUsize::new(0),
                active: Arc::new(AtomicUsize::new(0)),
                peak: Arc::new(AtomicUsize::new(0)),
                overlapping: AtomicBool::new(false),
                close_delay: Mutex::new(Duration::ZERO),
            }),
        };
        (connector, rx)
    }

    /// Queues outcomes for the next attempts.
    pub(crate) fn script(&self, outcomes: impl IntoIterator<Item = Outcome>) {
        self.state.script.lock().extend(outcomes);
    }

    /// Makes the client's closing handshake take `delay` on later transports.
    pub(crate) fn slow_close(&self, delay: Duration) {
        *self.state.close_delay.lock() = delay;
    }

    /// Number of attempts made so far.
    pub(crate) fn attempts(&self) -> usize {
        self.state.attempts.load(Ordering::SeqCst)
    }

    /// Transports currently alive.
    pub(crate) fn active(&self) -> usize {
        self.state.active.load(Ordering::SeqCst)
    }

    /// Most transports ever alive at once.
    pub(crate) fn peak(&self) -> usize {
        self.state.peak.load(Ordering::SeqCst)
    }

    /// `true` if an attempt started while a previous transport was alive.
    pub(crate) fn overlapped(&self) -> bool {
        self.state.overlapping.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, _endpoint: &Url) -> Result<Transport> {
        let attempt = self.state.attempts.fetch_add(1, Ordering::SeqCst) + 1;

        if self.active() > 0 {
            self.state.overlapping.store(true, Ordering::SeqCst);
        }

        let outcome = self
            .state
            .script
            .lock()
            .pop_front()
            .unwrap_or(Outcome::Accept);

        match outcome {
            Outcome::Refuse => return Err(Error::connection("connection refused")),
            Outcome::Hang => std::future::pending::<()>().await,
            Outcome::Accept => {}
        }

        let guard = Arc::new(ActiveGuard::new(
            Arc::clone(&self.state.active),
            Arc::clone(&self.state.peak),
        ));
        let (frames_tx, frames_rx) = mpsc::unbounded_channel();
        let (written_tx, written_rx) = mpsc::unbounded_channel();
        let closed_by_client = Arc::new(AtomicBool::new(false));

        let _ = self.state.server_ends.send(ServerEnd {
            attempt,
            frames: frames_tx,
            received: written_rx,
            closed_by_client: Arc::clone(&closed_by_client),
        });

        Ok(Transport::new(
            MockWriter {
                written: written_tx,
                closed: closed_by_client,
                close_delay: *self.state.close_delay.lock(),
                _guard: Arc::clone(&guard),
            },
            MockReader {
                frames: frames_rx,
                _guard: guard,
            },
        ))
    }
}

// ============================================================================
// Halves
// ============================================================================

/// Tracks how many transports are alive.
struct ActiveGuard {
    active: Arc<AtomicUsize>,
}

impl ActiveGuard {
    fn new(active: Arc<AtomicUsize>, peak: Arc<AtomicUsize>) -> Self {
        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        Self { active }
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

struct MockWriter {
    written: mpsc::UnboundedSender<String>,
    closed: Arc<AtomicBool>,
    close_delay: Duration,
    _guard: Arc<ActiveGuard>,
}

#[async_trait]
impl FrameWriter for MockWriter {
    async fn send_frame(&mut self, text: String) -> Result<()> {
        self.written.send(text).map_err(|_| Error::ConnectionClosed)
    }

    async fn close(&mut self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        if !self.close_delay.is_zero() {
            tokio::time::sleep(self.close_delay).await;
        }
        Ok(())
    }
}

struct MockReader {
    frames: mpsc::UnboundedReceiver<String>,
    _guard: Arc<ActiveGuard>,
}

#[async_trait]
impl FrameReader for MockReader {
    async fn next_frame(&mut self) -> Option<Result<String>> {
        self.frames.recv().await.map(Ok)
    }
}
