// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Reconnect-aware framed channel over a raw socket.
//!
//! One [`FramedChannel`] models exactly one connection attempt:
//! `Connecting → Open → Closed`, no state re-entered. After a failure the
//! layer above decides whether to open a fresh channel (see
//! [`super::backoff`]); this component never retries on its own.
//!
//! The session - frame assembler, keepalive deadline, byte counters - is
//! owned by a single driver task. Commands arrive over an mpsc channel and
//! socket events over the socket itself, so keepalive firing and inbound
//! frame handling are serialized by construction; no lock guards the
//! session.
//!
//! Failure reporting: a disconnect the channel itself detects (socket
//! close/error, send failure, failed connect) is delivered exactly once as
//! [`ChannelEvent::Disconnected`] with whether the session ever reached
//! `Open` - the layer above uses that to decide whether to fall back to a
//! different transport kind. A local [`FramedChannel::close`] never
//! produces that event.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::config::TransportConfig;
use crate::metrics;

use super::framing::{frames_for_message, FrameAssembler, FrameOutcome, KEEPALIVE_FRAME};
use super::health::{self, HealthStore};
use super::socket::{Socket, SocketEvent, SocketFactory, TransportError};

/// Lifecycle of a channel session. States are never re-entered; a new
/// session object models a fresh connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Open,
    Closed,
}

/// Everything the channel delivers upward.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// A fully reassembled, parsed application message.
    Message(Value),
    /// A fully reassembled payload that failed to parse. Surfaced to the
    /// consumer, never swallowed here.
    Malformed { raw: String, error: String },
    /// The channel detected a disconnect. Sent exactly once per session,
    /// and never for a local `close()`.
    Disconnected { ever_connected: bool },
}

enum Command {
    Send(Value),
    Close,
}

/// Handle to one framed channel session.
pub struct FramedChannel {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<ChannelState>,
    health: Arc<dyn HealthStore>,
    health_key: String,
    bytes_sent: Arc<AtomicU64>,
    bytes_received: Arc<AtomicU64>,
}

impl FramedChannel {
    /// Open a new session. The previous-failure flag is set pessimistically
    /// *before* the connect attempt, so a crash mid-connect reads as a
    /// failure by default; call [`Self::mark_connection_healthy`] once the
    /// layer above considers the connection proven.
    ///
    /// Events (messages, malformed payloads, the final disconnect) arrive
    /// on `events`. Must be called within a tokio runtime.
    pub fn open(
        factory: Arc<dyn SocketFactory>,
        health_store: Arc<dyn HealthStore>,
        config: TransportConfig,
        events: mpsc::UnboundedSender<ChannelEvent>,
    ) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(ChannelState::Connecting);
        let bytes_sent = Arc::new(AtomicU64::new(0));
        let bytes_received = Arc::new(AtomicU64::new(0));
        let health_key = config.health_key.clone();

        // Assume failure until proven otherwise.
        health_store.set(&health_key, true);

        tokio::spawn(drive_session(
            factory,
            config,
            events,
            command_rx,
            state_tx,
            Arc::clone(&bytes_sent),
            Arc::clone(&bytes_received),
        ));

        Self {
            commands,
            state,
            health: health_store,
            health_key,
            bytes_sent,
            bytes_received,
        }
    }

    /// Queue a message for sending. Never fails: a socket-level send error
    /// is converted by the driver into an asynchronous disconnect instead
    /// of being surfaced here, and sends after close are dropped.
    pub fn send(&self, message: Value) {
        let _ = self.commands.send(Command::Send(message));
    }

    /// Close the channel locally. Idempotent, callable from any state, and
    /// never produces a `Disconnected` event.
    pub fn close(&self) {
        let _ = self.commands.send(Command::Close);
    }

    /// Watch the session lifecycle.
    #[must_use]
    pub fn state(&self) -> watch::Receiver<ChannelState> {
        self.state.clone()
    }

    /// Clear the previous-failure flag: the connection is confirmed healthy.
    pub fn mark_connection_healthy(&self) {
        self.health.remove(&self.health_key);
    }

    /// Whether this transport kind should be presumed to have failed
    /// before (advisory, biases transport selection in the layer above).
    #[must_use]
    pub fn previously_failed(&self) -> bool {
        health::previously_failed(self.health.as_ref(), &self.health_key)
    }

    #[must_use]
    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn bytes_received(&self) -> u64 {
        self.bytes_received.load(Ordering::Relaxed)
    }
}

/// Serialize and write one message: segments split at the frame cap, with
/// a count-header frame first when there is more than one segment.
fn write_message(
    socket: &mut dyn Socket,
    message: &Value,
    config: &TransportConfig,
    bytes_sent: &AtomicU64,
) -> Result<(), TransportError> {
    let payload = message.to_string();
    bytes_sent.fetch_add(payload.len() as u64, Ordering::Relaxed);
    metrics::record_bytes_sent(payload.len());

    for frame in frames_for_message(&payload, config.max_frame_bytes) {
        socket.send(&frame)?;
        metrics::record_frame("out");
    }
    Ok(())
}

/// The driver task owning one session end to end.
async fn drive_session(
    factory: Arc<dyn SocketFactory>,
    config: TransportConfig,
    events: mpsc::UnboundedSender<ChannelEvent>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    state: watch::Sender<ChannelState>,
    bytes_sent: Arc<AtomicU64>,
    bytes_received: Arc<AtomicU64>,
) {
    let mut socket = match factory.connect().await {
        Ok(socket) => socket,
        Err(error) => {
            warn!(%error, "socket connect failed");
            let _ = state.send(ChannelState::Closed);
            metrics::record_disconnect(false);
            let _ = events.send(ChannelEvent::Disconnected {
                ever_connected: false,
            });
            return;
        }
    };

    let keepalive = config.keepalive_interval();
    let mut deadline = Instant::now() + keepalive;
    let mut assembler = FrameAssembler::new();
    let mut ever_connected = false;

    // True when the channel itself detected the disconnect (as opposed to
    // a local close), which is the only case that reports upward.
    let report_disconnect = loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Send(message)) => {
                    if let Err(error) = write_message(socket.as_mut(), &message, &config, &bytes_sent) {
                        // Some platforms throw synchronously from send on a
                        // broken socket; callers of `send` must not be
                        // forced into handling that, so it becomes a
                        // disconnect.
                        warn!(%error, "socket send failed, closing connection");
                        break true;
                    }
                    deadline = Instant::now() + keepalive;
                }
                Some(Command::Close) | None => {
                    debug!("channel closed locally");
                    break false;
                }
            },
            event = socket.recv() => match event {
                Some(SocketEvent::Open) => {
                    info!("socket connected");
                    ever_connected = true;
                    let _ = state.send(ChannelState::Open);
                }
                Some(SocketEvent::Frame(data)) => {
                    bytes_received.fetch_add(data.len() as u64, Ordering::Relaxed);
                    metrics::record_bytes_received(data.len());
                    metrics::record_frame("in");
                    deadline = Instant::now() + keepalive;

                    match assembler.ingest(&data) {
                        FrameOutcome::Buffering | FrameOutcome::KeepAlive => {}
                        FrameOutcome::Complete(raw) => dispatch_payload(&events, raw),
                    }
                }
                Some(SocketEvent::Error(error)) => {
                    warn!(%error, "socket error, closing connection");
                    break true;
                }
                Some(SocketEvent::Closed) | None => {
                    debug!("socket was disconnected");
                    break true;
                }
            },
            () = sleep_until(deadline) => {
                // No activity for a whole interval: send a no-op frame to
                // keep intermediaries from dropping the connection.
                if let Err(error) = socket.send(KEEPALIVE_FRAME) {
                    warn!(%error, "keepalive send failed, closing connection");
                    break true;
                }
                metrics::record_keepalive();
                metrics::record_frame("out");
                deadline = Instant::now() + keepalive;
            }
        }
    };

    socket.close();
    let _ = state.send(ChannelState::Closed);
    if report_disconnect {
        metrics::record_disconnect(ever_connected);
        let _ = events.send(ChannelEvent::Disconnected { ever_connected });
    }
}

/// Parse a reassembled payload and hand it up. Parse failures are the
/// consumer's problem, not ours.
fn dispatch_payload(events: &mpsc::UnboundedSender<ChannelEvent>, raw: String) {
    match serde_json::from_str::<Value>(&raw) {
        Ok(message) => {
            metrics::record_message("ok");
            let _ = events.send(ChannelEvent::Message(message));
        }
        Err(error) => {
            metrics::record_message("malformed");
            warn!(%error, len = raw.len(), "inbound message failed to parse");
            let _ = events.send(ChannelEvent::Malformed {
                raw,
                error: error.to_string(),
            });
        }
    }
}
