//! Connection manager implementation.
//!
//! [`ConnectionManager`] is the caller-facing handle. It is cheap to clone;
//! all clones drive the same supervisor task and observe the same state.

// ============================================================================
// Imports
// ============================================================================

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::Stream;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::{Mutex as LeaseLock, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, trace};
use url::Url;

use crate::error::Result;
use crate::identifiers::Generation;
use crate::protocol::{InboundEvent, encode};

use super::builder::ConnectionManagerBuilder;
use super::config::ManagerConfig;
use super::state::{ConnectionState, ConnectionStatus};
use super::supervisor::{Command, Supervisor};

// ============================================================================
// SupervisorHandle
// ============================================================================

/// Running supervisor task and the only strong sender to it.
struct SupervisorHandle {
    commands: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

// ============================================================================
// Inner
// ============================================================================

/// State shared by all clones of a manager.
struct Inner {
    config: Arc<ManagerConfig>,
    status: Arc<watch::Sender<ConnectionStatus>>,
    inbound: mpsc::UnboundedSender<InboundEvent>,
    supervisor: Mutex<Option<SupervisorHandle>>,
    /// Owned by the supervisor that currently may hold a transport.
    lease: Arc<LeaseLock<()>>,
}

// ============================================================================
// ConnectionManager
// ============================================================================

/// Self-healing connection to one endpoint.
///
/// Owns at most one transport at a time and reconnects after every
/// closure according to its [`RetryPolicy`](super::RetryPolicy).
///
/// # Thread Safety
///
/// `ConnectionManager` is `Send + Sync` and `Clone`. [`connect`](Self::connect)
/// and [`send`](Self::send) never block. When the last clone is dropped the
/// supervisor closes the transport and exits.
///
/// # Example
///
/// ```ignore
/// let (manager, mut inbound) = ConnectionManager::builder()
///     .endpoint("ws://localhost:9595/events/users")
///     .build()?;
///
/// manager.connect();
/// while let Some(event) = inbound.recv().await {
///     println!("{}", event.value());
/// }
/// ```
#[derive(Clone)]
pub struct ConnectionManager {
    inner: Arc<Inner>,
}

impl ConnectionManager {
    /// Creates a new builder.
    #[inline]
    #[must_use]
    pub fn builder() -> ConnectionManagerBuilder {
        ConnectionManagerBuilder::new()
    }

    /// Creates a manager from validated configuration.
    pub(crate) fn new(config: ManagerConfig) -> (Self, Inbound) {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (status, _) = watch::channel(ConnectionStatus::default());

        let manager = Self {
            inner: Arc::new(Inner {
                config: Arc::new(config),
                status: Arc::new(status),
                inbound: inbound_tx,
                supervisor: Mutex::new(None),
                lease: Arc::new(LeaseLock::new(())),
            }),
        };

        (manager, Inbound { rx: inbound_rx })
    }
}

// ============================================================================
// ConnectionManager - Lifecycle
// ============================================================================

impl ConnectionManager {
    /// Starts the reconnect loop.
    ///
    /// Idempotent: while the loop is connecting, open, or waiting to
    /// retry, this does nothing. From `Idle` (never started, or parked
    /// after the retry cap) it starts or resumes the loop.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn connect(&self) {
        let mut slot = self.inner.supervisor.lock();

        if let Some(handle) = slot.as_ref()
            && !handle.task.is_finished()
        {
            let _ = handle.commands.send(Command::Connect);
            return;
        }

        let (commands, commands_rx) = mpsc::unbounded_channel();
        let supervisor = Supervisor::new(
            Arc::clone(&self.inner.config),
            Arc::clone(&self.inner.status),
            self.inner.inbound.clone(),
            commands_rx,
            commands.downgrade(),
            Arc::clone(&self.inner.lease),
        );

        let task = tokio::spawn(supervisor.run());
        debug!(endpoint = %self.inner.config.endpoint, "Supervisor started");

        *slot = Some(SupervisorHandle { commands, task });
    }

    /// Closes the current transport and stops the reconnect loop.
    ///
    /// Waits until the transport has been released. The state is `Idle`
    /// afterwards unless another clone called [`connect`](Self::connect)
    /// in the meantime. A `connect` racing with `shutdown` starts a new
    /// loop that dials only after the old transport is gone.
    pub async fn shutdown(&self) {
        let handle = self.inner.supervisor.lock().take();
        let Some(handle) = handle else {
            return;
        };

        let _ = handle.commands.send(Command::Shutdown);

        if let Err(e) = handle.task.await {
            error!(error = %e, "Supervisor task failed");
        }
    }
}

// ============================================================================
// ConnectionManager - Messaging
// ============================================================================

impl ConnectionManager {
    /// Sends one value as a text frame.
    ///
    /// Fire-and-forget: if no connection is open the value is dropped and
    /// `Ok(())` is returned. Nothing is queued for a later connection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) only if `value` cannot be
    /// serialized.
    pub fn send<T>(&self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let text = encode(value)?;

        let Some(generation) = self.inner.status.borrow().open_generation() else {
            trace!("Not connected, dropping outbound message");
            return Ok(());
        };

        if let Some(handle) = self.inner.supervisor.lock().as_ref() {
            let _ = handle.commands.send(Command::Send { generation, text });
        }

        Ok(())
    }
}

// ============================================================================
// ConnectionManager - Observation
// ============================================================================

impl ConnectionManager {
    /// Returns the current lifecycle state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.inner.status.borrow().state
    }

    /// Returns the current state and generation.
    #[inline]
    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        *self.inner.status.borrow()
    }

    /// Returns the generation of the latest connection attempt.
    #[inline]
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.inner.status.borrow().generation
    }

    /// Returns `true` if a connection is open.
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Subscribes to status changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ConnectionStatus> {
        self.inner.status.subscribe()
    }

    /// Returns the configured endpoint.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.config.endpoint
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("config", &self.inner.config)
            .field("status", &self.status())
            .finish()
    }
}

// ============================================================================
// Inbound
// ============================================================================

/// Receiver of decoded inbound events.
///
/// Unbounded and non-restartable: one `Inbound` exists per manager and it
/// yields events from every connection the manager makes. Ends (`None`)
/// once every manager handle has been dropped and the supervisor exited.
#[derive(Debug)]
pub struct Inbound {
    rx: mpsc::UnboundedReceiver<InboundEvent>,
}

impl Inbound {
    /// Waits for the next event.
    pub async fn recv(&mut self) -> Option<InboundEvent> {
        self.rx.recv().await
    }

    /// Returns the next event if one is already buffered.
    pub fn try_recv(&mut self) -> Option<InboundEvent> {
        self.rx.try_recv().ok()
    }

    /// Returns the number of buffered events.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Returns `true` if no events are buffered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Stream for Inbound {
    type Item = InboundEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
