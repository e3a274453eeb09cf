// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Immutable query parameters.
//!
//! A [`QueryParams`] describes the range a query is interested in: optional
//! start/end bounds (index value plus optional tie-break key), an optional
//! limit with an anchor side, and the index children are ordered by.
//! The struct never mutates in place - every builder copies:
//!
//! ```
//! use pathmirror::view::{Index, QueryParams};
//! use serde_json::json;
//!
//! let params = QueryParams::default()
//!     .order_by(Index::Value)
//!     .start_at(json!(10), None)
//!     .limit_to_first(25);
//!
//! assert!(!params.loads_all_data());
//! assert!(params.is_view_from_start());
//! ```

use serde_json::Value;
use thiserror::Error;

use super::filter::NodeFilter;
use super::index::{Index, IndexValue, KeyBound, SortKey, ValueBound};

/// Query misconfiguration, rejected before any filter is built.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("query limit must be at least 1")]
    InvalidLimit,
}

/// One end of a range: an index value plus an optional key tie-break.
#[derive(Debug, Clone, PartialEq)]
pub struct Bound {
    pub value: Value,
    pub key: Option<String>,
}

/// Which side of a limited window is filled first (and therefore protected
/// from eviction).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    End,
}

/// Immutable description of a query's range, limit and ordering.
///
/// Parameter validation happens at the API boundary ([`QueryParams::validate`]);
/// everything downstream assumes valid params.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryParams {
    start: Option<Bound>,
    end: Option<Bound>,
    limit: Option<usize>,
    anchor: Option<Anchor>,
    index: Index,
}

impl QueryParams {
    /// Copy with a different child ordering.
    #[must_use]
    pub fn order_by(&self, index: Index) -> Self {
        let mut copy = self.clone();
        copy.index = index;
        copy
    }

    /// Copy with a start bound.
    #[must_use]
    pub fn start_at(&self, value: Value, key: Option<String>) -> Self {
        let mut copy = self.clone();
        copy.start = Some(Bound { value, key });
        copy
    }

    /// Copy with an end bound.
    #[must_use]
    pub fn end_at(&self, value: Value, key: Option<String>) -> Self {
        let mut copy = self.clone();
        copy.end = Some(Bound { value, key });
        copy
    }

    /// Copy with a limit and no explicit anchor (the anchor is then inferred
    /// from whichever bound is set).
    #[must_use]
    pub fn limit(&self, count: usize) -> Self {
        let mut copy = self.clone();
        copy.limit = Some(count);
        copy.anchor = None;
        copy
    }

    /// Copy with a limit anchored at the start of the window.
    #[must_use]
    pub fn limit_to_first(&self, count: usize) -> Self {
        let mut copy = self.clone();
        copy.limit = Some(count);
        copy.anchor = Some(Anchor::Start);
        copy
    }

    /// Copy with a limit anchored at the end of the window.
    #[must_use]
    pub fn limit_to_last(&self, count: usize) -> Self {
        let mut copy = self.clone();
        copy.limit = Some(count);
        copy.anchor = Some(Anchor::End);
        copy
    }

    #[must_use]
    pub fn has_start(&self) -> bool {
        self.start.is_some()
    }

    #[must_use]
    pub fn has_end(&self) -> bool {
        self.end.is_some()
    }

    #[must_use]
    pub fn has_limit(&self) -> bool {
        self.limit.is_some()
    }

    /// True if a limit is set and the anchor was chosen explicitly.
    #[must_use]
    pub fn has_anchored_limit(&self) -> bool {
        self.limit.is_some() && self.anchor.is_some()
    }

    #[must_use]
    pub fn limit_count(&self) -> Option<usize> {
        self.limit
    }

    #[must_use]
    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Anchor resolution: an explicit anchor is authoritative; otherwise a
    /// lone bound anchors the window at that bound; with no bound at all the
    /// window anchors at the end.
    #[must_use]
    pub fn is_view_from_start(&self) -> bool {
        match self.anchor {
            Some(Anchor::Start) => true,
            Some(Anchor::End) => false,
            None => self.start.is_some(),
        }
    }

    /// True iff no start, no end and no limit - the query loads all
    /// children unfiltered and the cheap Indexed filter applies.
    #[must_use]
    pub fn loads_all_data(&self) -> bool {
        self.start.is_none() && self.end.is_none() && self.limit.is_none()
    }

    /// `loads_all_data` plus the default index.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.loads_all_data() && self.index == Index::default()
    }

    /// The window's lower sort position; open if no start bound is set.
    /// A start bound without a key extends down to the minimum key.
    #[must_use]
    pub fn start_post(&self) -> SortKey {
        match &self.start {
            None => SortKey::min(),
            Some(bound) => SortKey {
                value: ValueBound::Value(IndexValue::from(&bound.value)),
                key: bound
                    .key
                    .as_ref()
                    .map_or(KeyBound::Min, |k| KeyBound::Key(k.clone())),
            },
        }
    }

    /// The window's upper sort position; open if no end bound is set.
    /// An end bound without a key extends up to the maximum key.
    #[must_use]
    pub fn end_post(&self) -> SortKey {
        match &self.end {
            None => SortKey::max(),
            Some(bound) => SortKey {
                value: ValueBound::Value(IndexValue::from(&bound.value)),
                key: bound
                    .key
                    .as_ref()
                    .map_or(KeyBound::Max, |k| KeyBound::Key(k.clone())),
            },
        }
    }

    /// Reject inconsistent parameters before a filter is constructed.
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.limit == Some(0) {
            return Err(QueryError::InvalidLimit);
        }
        Ok(())
    }

    /// The filter variant these parameters select: limit set → Limited,
    /// else any bound set → Ranged, else Indexed. Assumes [`Self::validate`]
    /// passed.
    #[must_use]
    pub fn node_filter(&self) -> NodeFilter {
        NodeFilter::from_params(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builders_copy_rather_than_mutate() {
        let base = QueryParams::default();
        let bounded = base.start_at(json!(1), None);
        assert!(!base.has_start());
        assert!(bounded.has_start());
        assert!(base.loads_all_data());
    }

    #[test]
    fn test_default_loads_all_data() {
        let params = QueryParams::default();
        assert!(params.loads_all_data());
        assert!(params.is_default());
        assert!(matches!(params.node_filter(), NodeFilter::Indexed { .. }));
    }

    #[test]
    fn test_non_default_index_is_not_default_params() {
        let params = QueryParams::default().order_by(Index::Value);
        assert!(params.loads_all_data());
        assert!(!params.is_default());
    }

    #[test]
    fn test_filter_selection() {
        let ranged = QueryParams::default().start_at(json!(1), None);
        assert!(matches!(ranged.node_filter(), NodeFilter::Ranged(_)));

        let limited = ranged.limit_to_first(5);
        assert!(matches!(limited.node_filter(), NodeFilter::Limited(_)));
    }

    #[test]
    fn test_anchor_explicit_wins() {
        let params = QueryParams::default()
            .start_at(json!(1), None)
            .limit_to_last(5);
        assert!(!params.is_view_from_start());
        assert!(params.has_anchored_limit());
    }

    #[test]
    fn test_anchor_inferred_from_lone_bound() {
        let from_start = QueryParams::default().start_at(json!(1), None).limit(5);
        assert!(from_start.is_view_from_start());
        assert!(!from_start.has_anchored_limit());

        let from_end = QueryParams::default().end_at(json!(9), None).limit(5);
        assert!(!from_end.is_view_from_start());
    }

    #[test]
    fn test_anchor_defaults_to_end_with_no_bounds() {
        let params = QueryParams::default().limit(5);
        assert!(!params.is_view_from_start());
    }

    #[test]
    fn test_posts_default_open() {
        let params = QueryParams::default();
        assert_eq!(params.start_post(), SortKey::min());
        assert_eq!(params.end_post(), SortKey::max());
    }

    #[test]
    fn test_bound_without_key_extends_to_key_extreme() {
        let params = QueryParams::default()
            .order_by(Index::Value)
            .start_at(json!(2), None)
            .end_at(json!(3), None);
        // Start without a key admits every key with index value 2.
        assert!(params.start_post() <= Index::Value.sort_key("any", &json!(2)));
        // End without a key admits every key with index value 3.
        assert!(Index::Value.sort_key("zzz", &json!(3)) <= params.end_post());
    }

    #[test]
    fn test_validate_rejects_zero_limit() {
        assert_eq!(
            QueryParams::default().limit_to_first(0).validate(),
            Err(QueryError::InvalidLimit)
        );
        assert!(QueryParams::default().limit_to_first(1).validate().is_ok());
    }
}
