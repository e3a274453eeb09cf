//! # Pathmirror
//!
//! Client-side core for mirroring a remote path-addressed JSON tree:
//! persistent tree storage, server-side query windowing, and a framed
//! reconnect-aware transport.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Tree Layer                             │
//! │  • Path: immutable slash-separated location                 │
//! │  • PathTree: persistent tree, structural sharing on write   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                    (children of one location)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      View Layer                             │
//! │  • Index: total order over children (key/value/priority)    │
//! │  • QueryParams: bounds, limit, anchor                       │
//! │  • NodeFilter: incremental window maintenance               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                      (messages to/from the server)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Transport Layer                          │
//! │  • FramedChannel: one session, framing + keepalive          │
//! │  • HealthStore: previous-failure flag across sessions       │
//! │  • backoff: reconnect policy on top of single sessions      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The layers are independent: the tree and view layers are pure data
//! structures, and the transport layer never interprets message contents.
//! A sync client wires them together by applying transport messages to a
//! `PathTree` and running changed children through each query's
//! `NodeFilter`.
//!
//! ## Quick Start
//!
//! ```rust
//! use pathmirror::{Path, PathTree, QueryParams, Index};
//! use serde_json::json;
//!
//! // Persistent tree: writes return new trees, old ones stay valid.
//! let tree: PathTree<serde_json::Value> = PathTree::empty();
//! let tree = tree.set(&Path::new("/users/alice"), Some(json!({"age": 30})));
//! let tree = tree.set(&Path::new("/users/bob"), Some(json!({"age": 25})));
//! assert_eq!(tree.get(&Path::new("/users/alice")), Some(&json!({"age": 30})));
//!
//! // Query windowing: first user ordered by the "age" child field.
//! let params = QueryParams::default()
//!     .order_by(Index::Field("age".into()))
//!     .limit_to_first(1);
//! assert!(!params.loads_all_data());
//! ```
//!
//! ## Modules
//!
//! - [`path`]: immutable slash-separated paths
//! - [`tree`]: the persistent [`PathTree`]
//! - [`view`]: indexes, query parameters, and window filters
//! - [`transport`]: framed channel, socket traits, health, backoff
//! - [`config`]: transport configuration
//! - [`metrics`]: backend-agnostic instrumentation

pub mod config;
pub mod metrics;
pub mod path;
pub mod transport;
pub mod tree;
pub mod view;

pub use config::TransportConfig;
pub use path::Path;
pub use transport::{
    ChannelEvent, ChannelState, FramedChannel, HealthStore, MemoryHealthStore, RetryConfig,
    Socket, SocketEvent, SocketFactory, TransportError,
};
pub use tree::PathTree;
pub use view::{
    Anchor, Bound, ChildEntry, ChildUpdate, Index, IndexValue, IndexedChildren, NodeFilter,
    QueryError, QueryParams, SortKey, ViewChange,
};
