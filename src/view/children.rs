// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Ordered child collection.
//!
//! [`IndexedChildren`] keeps a node's children sorted by their [`SortKey`]
//! under a fixed [`Index`]. Windows are small (bounded by the query limit),
//! so lookups scan and inserts binary-search.

use serde_json::Value;

use super::index::Index;

/// One child: key plus payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildEntry {
    pub key: String,
    pub value: Value,
}

/// A node's children, sorted by (index value, key).
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedChildren {
    index: Index,
    entries: Vec<ChildEntry>,
}

impl IndexedChildren {
    #[must_use]
    pub fn new(index: Index) -> Self {
        Self {
            index,
            entries: Vec::new(),
        }
    }

    /// Build from unordered children.
    pub fn from_children<I>(index: Index, children: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut out = Self::new(index);
        for (key, value) in children {
            out.insert(&key, value);
        }
        out
    }

    #[must_use]
    pub fn index(&self) -> &Index {
        &self.index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|e| e.key == key).map(|e| &e.value)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace a child, keeping sort order. Returns the previous
    /// entry for the key, if any.
    pub fn insert(&mut self, key: &str, value: Value) -> Option<ChildEntry> {
        let previous = self.remove(key);
        let sort_key = self.index.sort_key(key, &value);
        let at = self
            .entries
            .partition_point(|e| self.index.sort_key(&e.key, &e.value) < sort_key);
        self.entries.insert(
            at,
            ChildEntry {
                key: key.to_string(),
                value,
            },
        );
        previous
    }

    pub fn remove(&mut self, key: &str) -> Option<ChildEntry> {
        let at = self.entries.iter().position(|e| e.key == key)?;
        Some(self.entries.remove(at))
    }

    /// The entry at the low end of the index order.
    #[must_use]
    pub fn first(&self) -> Option<&ChildEntry> {
        self.entries.first()
    }

    /// The entry at the high end of the index order.
    #[must_use]
    pub fn last(&self) -> Option<&ChildEntry> {
        self.entries.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChildEntry> {
        self.entries.iter()
    }

    /// Keys in index order.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.key.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_keeps_index_order() {
        let mut children = IndexedChildren::new(Index::Value);
        children.insert("b", json!(2));
        children.insert("c", json!(3));
        children.insert("a", json!(1));
        assert_eq!(children.keys(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_equal_values_order_by_key() {
        let mut children = IndexedChildren::new(Index::Value);
        children.insert("z", json!(1));
        children.insert("a", json!(1));
        children.insert("m", json!(1));
        assert_eq!(children.keys(), vec!["a", "m", "z"]);
    }

    #[test]
    fn test_insert_replaces_and_repositions() {
        let mut children = IndexedChildren::new(Index::Value);
        children.insert("a", json!(1));
        children.insert("b", json!(2));

        let old = children.insert("a", json!(9));
        assert_eq!(old.map(|e| e.value), Some(json!(1)));
        assert_eq!(children.keys(), vec!["b", "a"]);
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn test_remove() {
        let mut children =
            IndexedChildren::from_children(Index::Value, [("a".into(), json!(1))]);
        assert_eq!(children.remove("a").map(|e| e.key), Some("a".into()));
        assert!(children.remove("a").is_none());
        assert!(children.is_empty());
    }

    #[test]
    fn test_first_and_last() {
        let children = IndexedChildren::from_children(
            Index::Value,
            [("a".into(), json!(3)), ("b".into(), json!(1))],
        );
        assert_eq!(children.first().map(|e| e.key.as_str()), Some("b"));
        assert_eq!(children.last().map(|e| e.key.as_str()), Some("a"));
    }
}
