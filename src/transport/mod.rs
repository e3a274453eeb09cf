// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Framed, reconnect-aware transport.
//!
//! # Layering
//!
//! ```text
//! consumer            send(json) ── channel events ──▶ messages
//!                        │                                ▲
//! FramedChannel       driver task: framing, keepalive, lifecycle
//!                        │                                ▲
//! Socket (trait)      string frames over a platform connection
//! ```
//!
//! The channel owns exactly one [`Socket`] session. Outbound messages are
//! serialized and split at a byte cap with a count-header frame; inbound
//! frames are reassembled by [`framing::FrameAssembler`]. An idle timer
//! sends no-op keepalive frames so intermediaries keep the connection up.
//!
//! One channel never reconnects. Reconnection is a policy decision layered
//! on top with [`backoff::retry`], biased by the previous-failure flag in
//! the injected [`HealthStore`].

pub mod backoff;
pub mod channel;
pub mod framing;
pub mod health;
pub mod socket;

pub use backoff::{retry, RetryConfig};
pub use channel::{ChannelEvent, ChannelState, FramedChannel};
pub use framing::{FrameAssembler, FrameOutcome, KEEPALIVE_FRAME, MAX_FRAME_COUNT_CHARS};
pub use health::{previously_failed, HealthStore, MemoryHealthStore, PREVIOUS_FAILURE_KEY};
pub use socket::{Socket, SocketEvent, SocketFactory, TransportError};
