// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Child ordering strategies.
//!
//! An [`Index`] decides the sort position of a child within its parent:
//! by key, by the child's value, by its priority field, or by a named
//! field. The position is a [`SortKey`] - the extracted index value plus
//! the child key as tie-break - and both ends are extensible with
//! [`ValueBound::Min`]/[`ValueBound::Max`] sentinels so range bounds can be
//! left open.

use std::cmp::Ordering;

use serde_json::Value;

/// Field consulted by [`Index::Priority`].
pub const PRIORITY_FIELD: &str = ".priority";

/// An index value extracted from a child, with a total order:
/// null < false < true < numbers < strings < composites. Numbers compare by
/// `f64::total_cmp`; composites (arrays/objects) compare equal among
/// themselves and fall through to the key tie-break.
#[derive(Debug, Clone)]
pub enum IndexValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Composite,
}

impl IndexValue {
    fn rank(&self) -> u8 {
        match self {
            IndexValue::Null => 0,
            IndexValue::Bool(_) => 1,
            IndexValue::Number(_) => 2,
            IndexValue::String(_) => 3,
            IndexValue::Composite => 4,
        }
    }
}

impl From<&Value> for IndexValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => IndexValue::Null,
            Value::Bool(b) => IndexValue::Bool(*b),
            Value::Number(n) => IndexValue::Number(n.as_f64().unwrap_or(f64::MAX)),
            Value::String(s) => IndexValue::String(s.clone()),
            Value::Array(_) | Value::Object(_) => IndexValue::Composite,
        }
    }
}

impl PartialEq for IndexValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for IndexValue {}

impl PartialOrd for IndexValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (IndexValue::Bool(a), IndexValue::Bool(b)) => a.cmp(b),
            (IndexValue::Number(a), IndexValue::Number(b)) => a.total_cmp(b),
            (IndexValue::String(a), IndexValue::String(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// An index value extended with open-bound sentinels.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValueBound {
    Min,
    Value(IndexValue),
    Max,
}

/// A child key extended with open-bound sentinels.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum KeyBound {
    Min,
    Key(String),
    Max,
}

/// The total sort position of a child under an index: index value first,
/// key as tie-break.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey {
    pub value: ValueBound,
    pub key: KeyBound,
}

impl SortKey {
    /// The position before every possible child.
    #[must_use]
    pub fn min() -> Self {
        Self {
            value: ValueBound::Min,
            key: KeyBound::Min,
        }
    }

    /// The position after every possible child.
    #[must_use]
    pub fn max() -> Self {
        Self {
            value: ValueBound::Max,
            key: KeyBound::Max,
        }
    }
}

/// Ordering strategy over a node's children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Index {
    /// Order by child key alone.
    Key,
    /// Order by the child's own value.
    Value,
    /// Order by the child's priority field (the default).
    #[default]
    Priority,
    /// Order by a named field of the child.
    Field(String),
}

impl Index {
    /// Extract the index value for a child. Missing fields index as null,
    /// which sorts before everything else.
    #[must_use]
    pub fn value_of(&self, key: &str, child: &Value) -> IndexValue {
        match self {
            Index::Key => IndexValue::String(key.to_string()),
            Index::Value => IndexValue::from(child),
            Index::Priority => child
                .get(PRIORITY_FIELD)
                .map_or(IndexValue::Null, IndexValue::from),
            Index::Field(field) => child.get(field).map_or(IndexValue::Null, IndexValue::from),
        }
    }

    /// The full sort position of a child under this index.
    #[must_use]
    pub fn sort_key(&self, key: &str, child: &Value) -> SortKey {
        SortKey {
            value: ValueBound::Value(self.value_of(key, child)),
            key: KeyBound::Key(key.to_string()),
        }
    }

    /// Sentinel before every child under this index.
    #[must_use]
    pub fn min_post(&self) -> SortKey {
        SortKey::min()
    }

    /// Sentinel after every child under this index.
    #[must_use]
    pub fn max_post(&self) -> SortKey {
        SortKey::max()
    }

    /// Compare two children: index value first, then key.
    #[must_use]
    pub fn cmp_children(&self, a_key: &str, a: &Value, b_key: &str, b: &Value) -> Ordering {
        self.sort_key(a_key, a).cmp(&self.sort_key(b_key, b))
    }
}
