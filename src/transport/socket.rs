//! The raw socket capability the channel is built over.
//!
//! The channel treats the socket as an opaque, platform-provided primitive:
//! something that can push string frames, surface lifecycle events, and be
//! closed. Real implementations wrap a websocket or similar; tests script
//! an in-memory pair.

use async_trait::async_trait;
use thiserror::Error;

/// Transport-level failures.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No usable socket implementation is available. Fatal; fails `open`.
    #[error("no socket implementation available")]
    Unavailable,
    /// Establishing the underlying connection failed.
    #[error("connect failed: {0}")]
    Connect(String),
    /// Writing a frame to the socket failed.
    #[error("socket send failed: {0}")]
    Send(String),
    /// The channel has already been closed.
    #[error("channel closed")]
    Closed,
}

/// Lifecycle and data events a socket emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    /// The low-level connection was confirmed open.
    Open,
    /// One inbound frame.
    Frame(String),
    /// The peer or transport closed the connection.
    Closed,
    /// A transport-level error; treated the same as a close.
    Error(String),
}

/// One live socket. `send` is synchronous and fallible because some
/// platforms throw from send on an already-broken socket; the channel turns
/// such errors into a disconnect instead of surfacing them to its caller.
#[async_trait]
pub trait Socket: Send {
    fn send(&mut self, frame: &str) -> Result<(), TransportError>;

    /// Next event, or `None` once the event stream is exhausted (which the
    /// channel treats as a close).
    async fn recv(&mut self) -> Option<SocketEvent>;

    fn close(&mut self);
}

/// Establishes sockets. One factory outlives many sessions; each `connect`
/// call produces a fresh socket for a fresh session.
#[async_trait]
pub trait SocketFactory: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn Socket>, TransportError>;
}
