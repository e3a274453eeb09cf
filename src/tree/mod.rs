// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Persistent path-indexed tree - the authoritative local cache.
//!
//! # Design
//!
//! Data known at a path lives in a [`PathTree`], one node per segment:
//!
//! ```text
//! /users/alice/posts
//!
//! Becomes:
//!
//! (root)
//! └── users
//!     └── alice ──── value: {...}
//!         └── posts ─ value: [...]
//! ```
//!
//! Every mutation (`set`, `remove`, `set_tree`) returns a **new** root and
//! leaves every previously handed-out tree untouched. Unchanged subtrees are
//! shared by reference between versions, so a subscriber can keep iterating
//! its snapshot while the next server update is folded in elsewhere. This is
//! the load-bearing property of the whole mirror: readers never need a lock.

mod path_tree;

pub use path_tree::PathTree;
