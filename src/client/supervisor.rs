//! Reconnect loop.
//!
//! The supervisor is the single task that owns the transport. Callers and
//! timers talk to it only through [`Command`]s, so every state transition
//! happens in one place and at most one transport exists at a time.
//!
//! # Loop
//!
//! 1. Bump the generation, publish `Connecting`, dial with a timeout
//! 2. On success publish `Open`, arm the greeting timer, pump frames
//! 3. On failure or closure drop the transport and publish `Closed`
//! 4. Wait the retry interval, then go to 1
//!
//! When a retry cap is configured and reached, the supervisor parks in
//! `Idle` until it receives [`Command::Connect`].
//!
//! A supervisor holds the manager's transport lease for its whole run. A
//! successor started while a previous supervisor is still closing waits for
//! the lease before its first dial.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex as LeaseLock, OwnedMutexGuard, mpsc, watch};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::Generation;
use crate::protocol::{InboundEvent, decode, encode};
use crate::transport::{FrameWriter, Transport};

use super::config::ManagerConfig;
use super::state::{ConnectionState, ConnectionStatus};

// ============================================================================
// Command
// ============================================================================

/// Messages processed by the supervisor task.
#[derive(Debug)]
pub(crate) enum Command {
    /// Resume the loop if parked; ignored otherwise.
    Connect,
    /// Write a frame if `generation` is still the open connection.
    Send {
        generation: Generation,
        text: String,
    },
    /// Greeting timer for `generation` elapsed.
    Greeting { generation: Generation },
    /// Close the transport and terminate.
    Shutdown,
}

// ============================================================================
// Internal Types
// ============================================================================

/// Whether the current phase should hand back to the loop or terminate.
enum Flow {
    Continue,
    Stop,
}

/// Why the reconnect loop returned.
enum LoopExit {
    Exhausted,
    Shutdown,
}

/// Outcome of one connection attempt.
enum Attempt {
    Open(Transport),
    Failed(Error),
    Stop,
}

// ============================================================================
// Supervisor
// ============================================================================

/// Task state for one run of the reconnect loop.
pub(crate) struct Supervisor {
    config: Arc<ManagerConfig>,
    status: Arc<watch::Sender<ConnectionStatus>>,
    inbound: mpsc::UnboundedSender<InboundEvent>,
    commands: mpsc::UnboundedReceiver<Command>,
    /// Handed to timer tasks; weak so timers never keep the loop alive.
    timers: mpsc::WeakUnboundedSender<Command>,
    /// Held for the whole run; at most one supervisor owns a transport.
    lease: Arc<LeaseLock<()>>,
    /// Generation of the latest attempt published by this supervisor.
    current: Generation,
}

impl Supervisor {
    pub(crate) fn new(
        config: Arc<ManagerConfig>,
        status: Arc<watch::Sender<ConnectionStatus>>,
        inbound: mpsc::UnboundedSender<InboundEvent>,
        commands: mpsc::UnboundedReceiver<Command>,
        timers: mpsc::WeakUnboundedSender<Command>,
        lease: Arc<LeaseLock<()>>,
    ) -> Self {
        let current = status.borrow().generation;
        Self {
            config,
            status,
            inbound,
            commands,
            timers,
            lease,
            current,
        }
    }

    /// Runs until shutdown or until every command sender is dropped.
    pub(crate) async fn run(mut self) {
        let Some(_lease) = self.acquire().await else {
            debug!("Supervisor stopped before acquiring the transport lease");
            return;
        };

        // A predecessor may have advanced the counter while we waited.
        self.current = self.status.borrow().generation;

        loop {
            match self.reconnect_loop().await {
                LoopExit::Shutdown => break,
                LoopExit::Exhausted => {
                    warn!(
                        endpoint = %self.config.endpoint,
                        max_attempts = ?self.config.retry.max_attempts,
                        "Retry limit reached, idle until connect()"
                    );
                    self.publish(ConnectionState::Idle, self.generation());

                    if let Flow::Stop = self.park().await {
                        break;
                    }
                }
            }
        }

        self.retire();
        debug!("Supervisor terminated");
    }

    /// Waits until no previous supervisor owns a transport.
    async fn acquire(&mut self) -> Option<OwnedMutexGuard<()>> {
        let pending = Arc::clone(&self.lease).lock_owned();
        tokio::pin!(pending);

        loop {
            tokio::select! {
                guard = &mut pending => return Some(guard),

                command = self.commands.recv() => {
                    match command {
                        Some(Command::Shutdown) | None => return None,
                        Some(command) => self.discard(command, None),
                    }
                }
            }
        }
    }

    /// Connect, pump, close, wait; repeat.
    async fn reconnect_loop(&mut self) -> LoopExit {
        let mut failures: u32 = 0;

        loop {
            let generation = self.generation().next();
            self.publish(ConnectionState::Connecting, generation);
            info!(%generation, endpoint = %self.config.endpoint, "Connecting");

            match self.establish(generation).await {
                Attempt::Open(transport) => {
                    failures = 0;
                    self.publish(ConnectionState::Open, generation);
                    info!(%generation, "Connected");

                    if let Flow::Stop = self.pump(generation, transport).await {
                        return LoopExit::Shutdown;
                    }
                }

                Attempt::Failed(e) => {
                    failures = failures.saturating_add(1);
                    warn!(%generation, error = %e, failures, "Connection attempt failed");
                }

                Attempt::Stop => return LoopExit::Shutdown,
            }

            // The transport has been dropped by now.
            self.publish(ConnectionState::Closed, generation);
            info!(%generation, "Connection closed");

            if !self.config.retry.allows(failures) {
                return LoopExit::Exhausted;
            }

            let interval = self.config.retry.interval;
            debug!(%generation, retry_in_ms = interval.as_millis() as u64, "Scheduling reconnect");

            if let Flow::Stop = self.wait(interval, generation).await {
                return LoopExit::Shutdown;
            }
        }
    }

    /// Dials the endpoint, still answering commands while the handshake runs.
    async fn establish(&mut self, generation: Generation) -> Attempt {
        let config = Arc::clone(&self.config);
        let connect = timeout(
            config.connect_timeout,
            config.connector.connect(&config.endpoint),
        );
        tokio::pin!(connect);

        loop {
            tokio::select! {
                result = &mut connect => {
                    return match result {
                        Ok(Ok(transport)) => Attempt::Open(transport),
                        Ok(Err(e)) => Attempt::Failed(e),
                        Err(_) => Attempt::Failed(Error::connection_timeout(
                            config.connect_timeout.as_millis() as u64,
                        )),
                    };
                }

                command = self.commands.recv() => {
                    match command {
                        Some(Command::Shutdown) | None => return Attempt::Stop,
                        Some(command) => {
                            trace!(%generation, "Command received while connecting");
                            self.discard(command, None);
                        }
                    }
                }
            }
        }
    }

    /// Moves frames while the connection is open.
    async fn pump(&mut self, generation: Generation, transport: Transport) -> Flow {
        let (mut writer, mut reader) = transport.into_parts();
        self.schedule_greeting(generation);

        loop {
            tokio::select! {
                frame = reader.next_frame() => {
                    match frame {
                        Some(Ok(text)) => self.deliver(generation, &text),

                        Some(Err(e)) => {
                            warn!(%generation, error = %e, "Transport error");
                            return Flow::Continue;
                        }

                        None => {
                            info!(%generation, "Connection closed by remote");
                            if let Err(e) = writer.close().await {
                                debug!(%generation, error = %e, "Close reply not sent");
                            }
                            return Flow::Continue;
                        }
                    }
                }

                command = self.commands.recv() => {
                    match command {
                        Some(Command::Send { generation: target, text }) if target == generation => {
                            if let Err(e) = writer.send_frame(text).await {
                                warn!(%generation, error = %e, "Failed to send frame");
                                self.report(&e);
                                return Flow::Continue;
                            }
                            trace!(%generation, "Frame sent");
                        }

                        Some(Command::Greeting { generation: target }) if target == generation => {
                            self.send_greeting(generation, writer.as_mut()).await;
                        }

                        Some(Command::Shutdown) | None => {
                            if let Err(e) = writer.close().await {
                                debug!(%generation, error = %e, "Close handshake failed");
                            }
                            return Flow::Stop;
                        }

                        Some(command) => self.discard(command, Some(generation)),
                    }
                }
            }
        }
    }

    /// Sleeps through the retry interval, still answering commands.
    async fn wait(&mut self, interval: Duration, generation: Generation) -> Flow {
        let delay = sleep(interval);
        tokio::pin!(delay);

        loop {
            tokio::select! {
                () = &mut delay => return Flow::Continue,

                command = self.commands.recv() => {
                    match command {
                        Some(Command::Shutdown) | None => return Flow::Stop,
                        Some(command) => {
                            trace!(%generation, "Command received while waiting to reconnect");
                            self.discard(command, None);
                        }
                    }
                }
            }
        }
    }

    /// Idles until asked to connect again.
    async fn park(&mut self) -> Flow {
        loop {
            match self.commands.recv().await {
                Some(Command::Connect) => {
                    info!("Resuming reconnect loop");
                    return Flow::Continue;
                }
                Some(Command::Shutdown) | None => return Flow::Stop,
                Some(command) => self.discard(command, None),
            }
        }
    }

    /// Drops a command that does not apply to the current phase.
    fn discard(&self, command: Command, open: Option<Generation>) {
        match command {
            Command::Connect => debug!(?open, "connect() ignored, loop already running"),
            Command::Send { generation, .. } => {
                trace!(submitted = %generation, ?open, "Dropping frame for a connection that is no longer open");
            }
            Command::Greeting { generation } => {
                debug!(stale = %generation, ?open, "Ignoring greeting timer of superseded connection");
            }
            // Handled by every caller before reaching here.
            Command::Shutdown => {}
        }
    }

    /// Decodes one inbound frame and hands it to the caller.
    fn deliver(&self, generation: Generation, text: &str) {
        match decode(text) {
            Ok(event) => {
                if self.inbound.send(event).is_err() {
                    trace!(%generation, "Inbound receiver dropped, discarding event");
                }
            }
            Err(e) => {
                warn!(%generation, error = %e, "Failed to decode inbound frame");
                self.report(&e);
            }
        }
    }

    /// Arms the one-shot greeting timer for `generation`.
    fn schedule_greeting(&self, generation: Generation) {
        let Some(greeting) = &self.config.greeting else {
            return;
        };

        let delay = greeting.delay;
        let timers = self.timers.clone();

        tokio::spawn(async move {
            sleep(delay).await;
            if let Some(commands) = timers.upgrade() {
                let _ = commands.send(Command::Greeting { generation });
            }
        });
    }

    /// Best-effort greeting; failures are logged and otherwise ignored.
    async fn send_greeting(&self, generation: Generation, writer: &mut dyn FrameWriter) {
        let Some(greeting) = &self.config.greeting else {
            return;
        };

        let result: Result<()> = async {
            let text = encode(&greeting.payload)?;
            writer.send_frame(text).await
        }
        .await;

        match result {
            Ok(()) => debug!(%generation, "Greeting sent"),
            Err(e) => debug!(%generation, error = %e, "Greeting not sent"),
        }
    }

    fn report(&self, error: &Error) {
        if let Some(handler) = &self.config.on_error {
            handler(error);
        }
    }

    fn generation(&self) -> Generation {
        self.current
    }

    fn publish(&mut self, state: ConnectionState, generation: Generation) {
        self.current = generation;
        self.status.send_replace(ConnectionStatus { state, generation });
    }

    /// Publishes `Idle` unless another supervisor has published since.
    fn retire(&self) {
        let generation = self.current;
        self.status.send_if_modified(|status| {
            if status.generation != generation || status.state == ConnectionState::Idle {
                return false;
            }
            status.state = ConnectionState::Idle;
            true
        });
    }
}
