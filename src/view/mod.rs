// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query windowing: which children of a node are "in view" for a query.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       View Module                            │
//! ├──────────────────────────────────────────────────────────────┤
//! │  index.rs        - Child ordering strategies                 │
//! │  └─ Index: by key, by value, by priority, by named field     │
//! │  └─ SortKey: (index value, key) with open-bound sentinels    │
//! ├──────────────────────────────────────────────────────────────┤
//! │  children.rs     - Ordered child collection                  │
//! │  └─ IndexedChildren: sorted by (index value, key)            │
//! ├──────────────────────────────────────────────────────────────┤
//! │  query_params.rs - Immutable query description               │
//! │  └─ QueryParams: bounds + limit + anchor + index             │
//! ├──────────────────────────────────────────────────────────────┤
//! │  filter.rs       - Window maintenance under updates          │
//! │  └─ NodeFilter: Indexed | Ranged | Limited                   │
//! │  └─ ViewChange: Added | Removed | Changed                    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! One filter variant is active per query at a time, chosen from the
//! [`QueryParams`]: a limit makes it Limited, otherwise any bound makes it
//! Ranged, otherwise everything passes in index order (Indexed). Ties on
//! equal index values always break by key order, in both the index and the
//! filters, or sort order would drift between updates.

pub mod children;
pub mod filter;
pub mod index;
pub mod query_params;

pub use children::{ChildEntry, IndexedChildren};
pub use filter::{ChildUpdate, NodeFilter, ViewChange};
pub use index::{Index, IndexValue, KeyBound, SortKey, ValueBound};
pub use query_params::{Anchor, Bound, QueryError, QueryParams};
