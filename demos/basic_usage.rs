// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Basic pathmirror usage example.
//!
//! Demonstrates:
//! 1. Building a persistent PathTree and sharing structure across versions
//! 2. Ordering children under an index and maintaining a limited window
//! 3. Running a FramedChannel against an in-memory socket pair
//! 4. Displaying metrics (OTEL-compatible)
//!
//! # Run
//!
//! ```bash
//! cargo run --example basic_usage
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::mpsc;

use pathmirror::transport::framing::{frames_for_message, FrameAssembler, FrameOutcome};
use pathmirror::{
    ChannelEvent, FramedChannel, Index, IndexedChildren, MemoryHealthStore, NodeFilter, Path,
    PathTree, QueryParams, Socket, SocketEvent, SocketFactory, TransportConfig, TransportError,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install metrics recorder (captures all metrics for OTEL export)
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("failed to install metrics recorder");

    // Simple logging (no filter for simplicity)
    tracing_subscriber::fmt().with_target(false).compact().init();

    println!("\n╔═══════════════════════════════════════════════════════════════╗");
    println!("║             pathmirror: Basic Usage Example                   ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    // ─────────────────────────────────────────────────────────────────────────
    // 1. Persistent tree: every write is a new version
    // ─────────────────────────────────────────────────────────────────────────
    println!("🌲 Building a persistent PathTree...");

    let empty: PathTree<serde_json::Value> = PathTree::empty();
    let v1 = empty.set(&Path::new("/users/alice"), Some(json!({"age": 30})));
    let v2 = v1.set(&Path::new("/users/bob"), Some(json!({"age": 25})));
    let v3 = v2.set(&Path::new("/config/theme"), Some(json!("dark")));

    println!("   └─ v1: alice only      → get(/users/alice) = {:?}", v1.get(&Path::new("/users/alice")));
    println!("   └─ v2: + bob           → get(/users/bob)   = {:?}", v2.get(&Path::new("/users/bob")));
    println!("   └─ v3: + config/theme");
    println!("   └─ v1 still has no bob → get(/users/bob)   = {:?}", v1.get(&Path::new("/users/bob")));

    let pruned = v3.remove(&Path::new("/config/theme"));
    println!("   └─ remove prunes empty ancestors: subtree(/config).is_empty() = {}",
        pruned.subtree(&Path::new("/config")).is_empty());

    println!("   └─ every stored value in v3:");
    v3.foreach(|path, value| println!("      {path} = {value}"));

    // ─────────────────────────────────────────────────────────────────────────
    // 2. Query windowing: keep the 2 youngest users
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n🔎 Maintaining a limited query window (2 youngest by 'age')...");

    let params = QueryParams::default()
        .order_by(Index::Field("age".into()))
        .limit_to_first(2);
    params.validate()?;
    println!("   └─ loads_all_data: {}", params.loads_all_data());

    let filter = NodeFilter::from_params(&params);
    let mut window = IndexedChildren::new(filter.index().clone());
    for (key, value) in [
        ("alice", json!({"age": 30})),
        ("bob", json!({"age": 25})),
        ("carol", json!({"age": 41})),
    ] {
        let update = filter.update_child(&window, key, Some(&value));
        window = update.children;
        println!("   └─ after {key:>5}: window = {:?}, changes = {:?}", window.keys(), update.changes);
    }

    // A younger user arrives: evicts the current window boundary.
    let update = filter.update_child(&window, "dana", Some(&json!({"age": 19})));
    window = update.children;
    println!("   └─ after  dana: window = {:?}, changes = {:?}", window.keys(), update.changes);
    pathmirror::metrics::set_view_window_size("youngest_users", window.len());

    // ─────────────────────────────────────────────────────────────────────────
    // 3. Framed channel over an in-memory socket pair
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n🔌 Opening a FramedChannel against an in-memory server...");

    let config = TransportConfig {
        max_frame_bytes: 48, // tiny cap so the demo actually splits frames
        ..Default::default()
    };
    let (factory, to_client, mut from_client) = in_memory_pair();

    // A scripted "server": reassembles what the client sends, then answers
    // with an update large enough to need splitting, then hangs up.
    let frame_cap = config.max_frame_bytes;
    let server = tokio::spawn(async move {
        let mut assembler = FrameAssembler::new();
        while let Some(frame) = from_client.recv().await {
            if let FrameOutcome::Complete(raw) = assembler.ingest(&frame) {
                println!("   └─ server received: {raw}");
                let reply = json!({
                    "op": "update",
                    "path": "/users/dana",
                    "data": {"age": 19, "bio": "newest user, straight into the window"}
                })
                .to_string();
                for frame in frames_for_message(&reply, frame_cap) {
                    let _ = to_client.send(SocketEvent::Frame(frame));
                }
                let _ = to_client.send(SocketEvent::Closed);
                break;
            }
        }
    });

    let (events_tx, mut events) = mpsc::unbounded_channel();
    let channel = FramedChannel::open(
        Arc::new(factory),
        Arc::new(MemoryHealthStore::new()),
        config,
        events_tx,
    );

    channel.send(json!({"op": "listen", "path": "/users"}));

    while let Some(event) = events.recv().await {
        match event {
            ChannelEvent::Message(message) => {
                println!("   └─ client received: {message}");
            }
            ChannelEvent::Malformed { error, .. } => {
                println!("   └─ client received malformed payload: {error}");
            }
            ChannelEvent::Disconnected { ever_connected } => {
                println!("   └─ disconnected (ever_connected = {ever_connected})");
                break;
            }
        }
    }
    server.await?;
    println!("   └─ bytes sent: {}, bytes received: {}", channel.bytes_sent(), channel.bytes_received());

    // ─────────────────────────────────────────────────────────────────────────
    // 4. Dump raw metrics (OTEL-compatible)
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n📈 Raw Metrics (OTEL export format):");
    dump_metrics(&snapshotter);

    println!("\n╔═══════════════════════════════════════════════════════════════╗");
    println!("║                    Example complete!                          ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    Ok(())
}

struct InMemorySocket {
    inbound: mpsc::UnboundedReceiver<SocketEvent>,
    outbound: mpsc::UnboundedSender<String>,
}

#[async_trait]
impl Socket for InMemorySocket {
    fn send(&mut self, frame: &str) -> Result<(), TransportError> {
        self.outbound
            .send(frame.to_string())
            .map_err(|_| TransportError::Send("peer gone".into()))
    }

    async fn recv(&mut self) -> Option<SocketEvent> {
        self.inbound.recv().await
    }

    fn close(&mut self) {}
}

struct InMemoryFactory {
    socket: Mutex<Option<InMemorySocket>>,
}

#[async_trait]
impl SocketFactory for InMemoryFactory {
    async fn connect(&self) -> Result<Box<dyn Socket>, TransportError> {
        match self.socket.lock().take() {
            Some(socket) => Ok(Box::new(socket)),
            None => Err(TransportError::Unavailable),
        }
    }
}

/// One in-memory socket: the factory hands it to the channel, the returned
/// ends let the demo's "server" feed events in and read frames out.
fn in_memory_pair() -> (
    InMemoryFactory,
    mpsc::UnboundedSender<SocketEvent>,
    mpsc::UnboundedReceiver<String>,
) {
    let (to_client, inbound) = mpsc::unbounded_channel();
    let (outbound, from_client) = mpsc::unbounded_channel();
    // The connection is "established" as soon as the channel starts reading.
    let _ = to_client.send(SocketEvent::Open);
    let factory = InMemoryFactory {
        socket: Mutex::new(Some(InMemorySocket { inbound, outbound })),
    };
    (factory, to_client, from_client)
}

/// Dump all captured metrics in OTEL-compatible format
fn dump_metrics(snapshotter: &Snapshotter) {
    let snapshot = snapshotter.snapshot();

    let mut counters: Vec<_> = vec![];
    let mut gauges: Vec<_> = vec![];

    for (composite_key, _, _, value) in snapshot.into_vec() {
        let (_kind, key) = composite_key.into_parts();
        let name = key.name();
        let labels: Vec<_> = key
            .labels()
            .map(|l| format!("{}={}", l.key(), l.value()))
            .collect();
        let label_str = if labels.is_empty() {
            String::new()
        } else {
            format!("{{{}}}", labels.join(","))
        };

        match value {
            DebugValue::Counter(v) => counters.push((name.to_string(), label_str, v)),
            DebugValue::Gauge(v) => gauges.push((name.to_string(), label_str, v.into_inner())),
            DebugValue::Histogram(_) => {}
        }
    }

    counters.sort_by(|a, b| a.0.cmp(&b.0));
    gauges.sort_by(|a, b| a.0.cmp(&b.0));

    if !counters.is_empty() {
        println!("   ┌─ Counters (cumulative)");
        for (name, labels, value) in &counters {
            println!("   │  └─ {}{} = {}", name, labels, value);
        }
    }
    if !gauges.is_empty() {
        println!("   └─ Gauges (current value)");
        for (name, labels, value) in &gauges {
            println!("      └─ {}{} = {:.2}", name, labels, value);
        }
    }
    if counters.is_empty() && gauges.is_empty() {
        println!("   └─ (no metrics recorded)");
    }
}
