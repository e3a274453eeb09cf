// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for pathmirror.
//!
//! Uses the `metrics` crate for backend-agnostic collection. The embedding
//! application is responsible for choosing the exporter (Prometheus, OTEL,
//! etc.)
//!
//! # Metric Naming Convention
//! - `pathmirror_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_bytes` suffix for size counters
//!
//! # Labels
//! - `direction`: in, out
//! - `status`: ok, malformed
//! - `kind`: added, removed, changed

use metrics::{counter, gauge};

/// Record bytes written to the socket.
pub fn record_bytes_sent(bytes: usize) {
    counter!("pathmirror_bytes_total", "direction" => "out").increment(bytes as u64);
}

/// Record bytes received from the socket.
pub fn record_bytes_received(bytes: usize) {
    counter!("pathmirror_bytes_total", "direction" => "in").increment(bytes as u64);
}

/// Record one frame on the wire.
pub fn record_frame(direction: &'static str) {
    counter!("pathmirror_frames_total", "direction" => direction).increment(1);
}

/// Record a keepalive no-op frame sent while idle.
pub fn record_keepalive() {
    counter!("pathmirror_keepalives_total").increment(1);
}

/// Record a fully reassembled application message by parse status.
pub fn record_message(status: &'static str) {
    counter!("pathmirror_messages_total", "status" => status.to_string()).increment(1);
}

/// Record a session disconnect detected by the channel.
pub fn record_disconnect(ever_connected: bool) {
    let reached_open = if ever_connected { "yes" } else { "no" };
    counter!("pathmirror_disconnects_total", "reached_open" => reached_open.to_string())
        .increment(1);
}

/// Record one subscriber-visible view edit.
pub fn record_view_change(kind: &'static str) {
    counter!("pathmirror_view_changes_total", "kind" => kind).increment(1);
}

/// Set the current size of a query window.
pub fn set_view_window_size(query: &str, size: usize) {
    gauge!("pathmirror_view_window_size", "query" => query.to_string()).set(size as f64);
}
