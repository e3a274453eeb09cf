// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Window maintenance under incremental child updates.
//!
//! A [`NodeFilter`] decides, for one child-level change at a time, what the
//! visible window becomes and which [`ViewChange`]s a subscriber must be
//! told about. Exactly one variant is active per query, selected from its
//! [`QueryParams`]. The variants form a single enum with one `update_child`
//! dispatch so the compiler checks exhaustiveness.
//!
//! A single update can grow the window by at most one entry, so a Limited
//! filter never evicts more than one boundary element per call.

use serde_json::Value;
use tracing::trace;

use super::children::IndexedChildren;
use super::index::{Index, SortKey};
use super::query_params::QueryParams;

/// One edit a subscriber must apply to its copy of the window.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewChange {
    Added {
        key: String,
        value: Value,
    },
    Removed {
        key: String,
        value: Value,
    },
    Changed {
        key: String,
        old_value: Value,
        new_value: Value,
    },
}

/// Result of applying one child change: the window after, plus the edits.
#[derive(Debug, Clone)]
pub struct ChildUpdate {
    pub children: IndexedChildren,
    pub changes: Vec<ViewChange>,
}

/// Range filter: a child is in view iff its sort position lies within
/// `[start_post, end_post]`. Ties on equal index values break by key.
#[derive(Debug, Clone)]
pub struct RangedFilter {
    index: Index,
    start_post: SortKey,
    end_post: SortKey,
}

impl RangedFilter {
    fn matches(&self, key: &str, value: &Value) -> bool {
        let post = self.index.sort_key(key, value);
        self.start_post <= post && post <= self.end_post
    }
}

/// Range filter plus a window size cap with an anchor side. The anchored
/// side is filled first; eviction happens at the opposite side.
#[derive(Debug, Clone)]
pub struct LimitedFilter {
    ranged: RangedFilter,
    limit: usize,
    anchor_start: bool,
}

/// The active windowing policy for a query.
#[derive(Debug, Clone)]
pub enum NodeFilter {
    /// All children pass, visited in index order.
    Indexed { index: Index },
    /// Children within the bounds pass.
    Ranged(RangedFilter),
    /// Bounded children, truncated to a limit.
    Limited(LimitedFilter),
}

impl NodeFilter {
    /// Select the variant deterministically from query parameters. Assumes
    /// the params passed [`QueryParams::validate`]; a zero limit must never
    /// reach this point.
    #[must_use]
    pub fn from_params(params: &QueryParams) -> Self {
        if params.loads_all_data() {
            return NodeFilter::Indexed {
                index: params.index().clone(),
            };
        }
        let ranged = RangedFilter {
            index: params.index().clone(),
            start_post: params.start_post(),
            end_post: params.end_post(),
        };
        match params.limit_count() {
            None => NodeFilter::Ranged(ranged),
            Some(limit) => NodeFilter::Limited(LimitedFilter {
                ranged,
                limit,
                anchor_start: params.is_view_from_start(),
            }),
        }
    }

    /// The index this filter orders children by.
    #[must_use]
    pub fn index(&self) -> &Index {
        match self {
            NodeFilter::Indexed { index } => index,
            NodeFilter::Ranged(f) => &f.index,
            NodeFilter::Limited(f) => &f.ranged.index,
        }
    }

    /// An empty window under this filter's index.
    #[must_use]
    pub fn empty_window(&self) -> IndexedChildren {
        IndexedChildren::new(self.index().clone())
    }

    /// Apply one child-level change (`new_value` of `None` means the child
    /// was removed server-side) to the current window. Returns the window
    /// after, with sort order preserved, and the subscriber-visible edits.
    #[must_use]
    pub fn update_child(
        &self,
        children: &IndexedChildren,
        key: &str,
        new_value: Option<&Value>,
    ) -> ChildUpdate {
        let update = match self {
            NodeFilter::Indexed { .. } => apply_unfiltered(children, key, new_value),
            NodeFilter::Ranged(filter) => {
                // Out-of-range children are out of view even if they still
                // exist server-side.
                let effective = new_value.filter(|v| filter.matches(key, v));
                apply_unfiltered(children, key, effective)
            }
            NodeFilter::Limited(filter) => {
                let effective = new_value.filter(|v| filter.ranged.matches(key, v));
                apply_limited(filter, children, key, effective)
            }
        };
        for change in &update.changes {
            crate::metrics::record_view_change(match change {
                ViewChange::Added { .. } => "added",
                ViewChange::Removed { .. } => "removed",
                ViewChange::Changed { .. } => "changed",
            });
        }
        trace!(key, changes = update.changes.len(), "applied child update");
        update
    }
}

/// Indexed semantics: always admit, no eviction.
fn apply_unfiltered(
    children: &IndexedChildren,
    key: &str,
    new_value: Option<&Value>,
) -> ChildUpdate {
    let mut next = children.clone();
    let mut changes = Vec::new();
    match (next.remove(key), new_value) {
        (None, None) => {}
        (None, Some(value)) => {
            next.insert(key, value.clone());
            changes.push(ViewChange::Added {
                key: key.to_string(),
                value: value.clone(),
            });
        }
        (Some(old), None) => changes.push(ViewChange::Removed {
            key: old.key,
            value: old.value,
        }),
        (Some(old), Some(value)) => {
            next.insert(key, value.clone());
            if old.value != *value {
                changes.push(ViewChange::Changed {
                    key: key.to_string(),
                    old_value: old.value,
                    new_value: value.clone(),
                });
            }
        }
    }
    ChildUpdate {
        children: next,
        changes,
    }
}

/// Limited semantics on a range-qualified value (`new_value` is `None` both
/// for server-side removals and for out-of-range updates).
fn apply_limited(
    filter: &LimitedFilter,
    children: &IndexedChildren,
    key: &str,
    new_value: Option<&Value>,
) -> ChildUpdate {
    let in_view = children.contains_key(key);
    if in_view || children.len() < filter.limit {
        // The window is not contested: plain admit/replace/remove. A
        // removal shrinks the window; refilling it needs the full child
        // set, which the coordinating layer owns.
        return apply_unfiltered(children, key, new_value);
    }
    let Some(value) = new_value else {
        // Not in view and nothing to add.
        return ChildUpdate {
            children: children.clone(),
            changes: Vec::new(),
        };
    };

    // Window full and a new child qualified for the range. It displaces the
    // boundary element on the un-anchored side, or is ignored if it sorts
    // beyond that boundary.
    let index = &filter.ranged.index;
    let boundary = if filter.anchor_start {
        children.last()
    } else {
        children.first()
    }
    .expect("window is full, limit >= 1");

    let candidate_post = index.sort_key(key, value);
    let boundary_post = index.sort_key(&boundary.key, &boundary.value);
    let admitted = if filter.anchor_start {
        candidate_post < boundary_post
    } else {
        candidate_post > boundary_post
    };
    if !admitted {
        return ChildUpdate {
            children: children.clone(),
            changes: Vec::new(),
        };
    }

    let boundary_key = boundary.key.clone();
    let mut next = children.clone();
    let evicted = next
        .remove(&boundary_key)
        .expect("boundary entry is present");
    next.insert(key, value.clone());
    ChildUpdate {
        children: next,
        changes: vec![
            ViewChange::Removed {
                key: evicted.key,
                value: evicted.value,
            },
            ViewChange::Added {
                key: key.to_string(),
                value: value.clone(),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::index::Index;
    use serde_json::json;

    fn window(pairs: &[(&str, i64)]) -> IndexedChildren {
        IndexedChildren::from_children(
            Index::Value,
            pairs.iter().map(|(k, v)| (k.to_string(), json!(v))),
        )
    }

    fn ranged_2_to_3() -> NodeFilter {
        QueryParams::default()
            .order_by(Index::Value)
            .start_at(json!(2), None)
            .end_at(json!(3), None)
            .node_filter()
    }

    #[test]
    fn test_indexed_admits_everything() {
        let filter = QueryParams::default().order_by(Index::Value).node_filter();
        let update = filter.update_child(&window(&[("a", 5)]), "b", Some(&json!(1)));
        assert_eq!(update.children.keys(), vec!["b", "a"]);
        assert_eq!(
            update.changes,
            vec![ViewChange::Added {
                key: "b".into(),
                value: json!(1)
            }]
        );
    }

    #[test]
    fn test_indexed_unchanged_value_reports_nothing() {
        let filter = QueryParams::default().order_by(Index::Value).node_filter();
        let update = filter.update_child(&window(&[("a", 5)]), "a", Some(&json!(5)));
        assert!(update.changes.is_empty());
        assert_eq!(update.children.keys(), vec!["a"]);
    }

    #[test]
    fn test_ranged_window_contents() {
        // Children {a:1, b:2, c:3} with bounds [2, 3]: the view is {b, c}.
        let filter = ranged_2_to_3();
        let mut view = filter.empty_window();
        for (key, value) in [("a", 1), ("b", 2), ("c", 3)] {
            view = filter.update_child(&view, key, Some(&json!(value))).children;
        }
        assert_eq!(view.keys(), vec!["b", "c"]);
    }

    #[test]
    fn test_ranged_out_of_range_insert_is_invisible() {
        let filter = ranged_2_to_3();
        let view = window(&[("b", 2), ("c", 3)]);
        let update = filter.update_child(&view, "d", Some(&json!(0)));
        assert!(update.changes.is_empty());
        assert_eq!(update.children.keys(), vec!["b", "c"]);
    }

    #[test]
    fn test_ranged_in_range_insert_lands_sorted() {
        let filter = ranged_2_to_3();
        let view = window(&[("b", 2), ("c", 3)]);
        let update = filter.update_child(&view, "d", Some(&json!(2.5)));
        assert_eq!(update.children.keys(), vec!["b", "d", "c"]);
        assert_eq!(
            update.changes,
            vec![ViewChange::Added {
                key: "d".into(),
                value: json!(2.5)
            }]
        );
    }

    #[test]
    fn test_ranged_update_out_of_range_removes_from_view() {
        let filter = ranged_2_to_3();
        let view = window(&[("b", 2), ("c", 3)]);
        // b still exists server-side but left the range.
        let update = filter.update_child(&view, "b", Some(&json!(10)));
        assert_eq!(update.children.keys(), vec!["c"]);
        assert_eq!(
            update.changes,
            vec![ViewChange::Removed {
                key: "b".into(),
                value: json!(2)
            }]
        );
    }

    #[test]
    fn test_ranged_tie_break_by_key() {
        let filter = ranged_2_to_3();
        let view = window(&[("b", 2), ("c", 3)]);
        let update = filter.update_child(&view, "a", Some(&json!(2)));
        assert_eq!(update.children.keys(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_limited_fills_up_to_limit() {
        let filter = QueryParams::default()
            .order_by(Index::Value)
            .limit_to_first(2)
            .node_filter();
        let view = filter.empty_window();
        let view = filter.update_child(&view, "a", Some(&json!(1))).children;
        let update = filter.update_child(&view, "b", Some(&json!(2)));
        assert_eq!(update.children.keys(), vec!["a", "b"]);
        assert_eq!(update.changes.len(), 1);
    }

    #[test]
    fn test_limited_evicts_exactly_one_boundary_opposite_the_anchor() {
        // limit=2 anchored at the start, view {a:1, b:2}. Inserting c:0
        // evicts b (high-end boundary), not a.
        let filter = QueryParams::default()
            .order_by(Index::Value)
            .limit_to_first(2)
            .node_filter();
        let view = window(&[("a", 1), ("b", 2)]);
        let update = filter.update_child(&view, "c", Some(&json!(0)));
        assert_eq!(update.children.keys(), vec!["c", "a"]);
        assert_eq!(
            update.changes,
            vec![
                ViewChange::Removed {
                    key: "b".into(),
                    value: json!(2)
                },
                ViewChange::Added {
                    key: "c".into(),
                    value: json!(0)
                },
            ]
        );
    }

    #[test]
    fn test_limited_from_end_evicts_low_boundary() {
        let filter = QueryParams::default()
            .order_by(Index::Value)
            .limit_to_last(2)
            .node_filter();
        let view = window(&[("a", 1), ("b", 2)]);
        let update = filter.update_child(&view, "c", Some(&json!(9)));
        assert_eq!(update.children.keys(), vec!["b", "c"]);
    }

    #[test]
    fn test_limited_beyond_boundary_is_ignored() {
        let filter = QueryParams::default()
            .order_by(Index::Value)
            .limit_to_first(2)
            .node_filter();
        let view = window(&[("a", 1), ("b", 2)]);
        // Sorts after the high boundary of a start-anchored window.
        let update = filter.update_child(&view, "c", Some(&json!(5)));
        assert!(update.changes.is_empty());
        assert_eq!(update.children.keys(), vec!["a", "b"]);
    }

    #[test]
    fn test_limited_in_view_change_keeps_membership() {
        let filter = QueryParams::default()
            .order_by(Index::Value)
            .limit_to_first(2)
            .node_filter();
        let view = window(&[("a", 1), ("b", 2)]);
        let update = filter.update_child(&view, "a", Some(&json!(3)));
        assert_eq!(update.children.keys(), vec!["b", "a"]);
        assert_eq!(update.changes.len(), 1);
        assert!(matches!(update.changes[0], ViewChange::Changed { .. }));
    }

    #[test]
    fn test_limited_removal_shrinks_window() {
        let filter = QueryParams::default()
            .order_by(Index::Value)
            .limit_to_first(2)
            .node_filter();
        let view = window(&[("a", 1), ("b", 2)]);
        let update = filter.update_child(&view, "a", None);
        assert_eq!(update.children.keys(), vec!["b"]);
        assert_eq!(
            update.changes,
            vec![ViewChange::Removed {
                key: "a".into(),
                value: json!(1)
            }]
        );
    }

    #[test]
    fn test_limited_respects_range_bounds_too() {
        let filter = QueryParams::default()
            .order_by(Index::Value)
            .start_at(json!(2), None)
            .end_at(json!(3), None)
            .limit_to_first(1)
            .node_filter();
        let view = filter.empty_window();
        let view = filter.update_child(&view, "b", Some(&json!(2))).children;
        // In range but behind the boundary of a full start-anchored window.
        let ignored = filter.update_child(&view, "c", Some(&json!(3)));
        assert!(ignored.changes.is_empty());
        // Out of range entirely.
        let out = filter.update_child(&view, "z", Some(&json!(1)));
        assert!(out.changes.is_empty());
        // In range and before the boundary: displaces it.
        let update = filter.update_child(&view, "a", Some(&json!(2)));
        assert_eq!(update.children.keys(), vec!["a"]);
    }
}
