// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Immutable tree with structural sharing.
//!
//! A node holds an optional value plus children keyed by path segment, in
//! segment order for deterministic traversal. Mutators clone only the nodes
//! along the touched path; siblings are shared by `Arc` reference with the
//! previous version. A node that ends up with no value and no children is
//! pruned from its parent (the root itself may be empty).

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::path::Path;

/// An immutable, path-indexed tree. Cloning is cheap (two `Arc` bumps).
#[derive(Debug)]
pub struct PathTree<T> {
    /// Value stored exactly at this node. `None` means nothing is stored
    /// here, but descendants may still hold values.
    value: Option<Arc<T>>,
    children: Arc<BTreeMap<String, PathTree<T>>>,
}

impl<T> Clone for PathTree<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            children: Arc::clone(&self.children),
        }
    }
}

impl<T> Default for PathTree<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> PathTree<T> {
    /// The empty tree. `BTreeMap::new()` does not allocate, so this is only
    /// an `Arc` control block.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            value: None,
            children: Arc::new(BTreeMap::new()),
        }
    }

    /// A tree holding a single value at the root.
    #[must_use]
    pub fn leaf(value: T) -> Self {
        Self {
            value: Some(Arc::new(value)),
            children: Arc::new(BTreeMap::new()),
        }
    }

    /// Build a tree by setting each `(path, value)` pair in turn.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Path, T)>,
    {
        let mut tree = Self::empty();
        for (path, value) in pairs {
            tree = tree.set(&path, Some(value));
        }
        tree
    }

    /// True iff no value is stored here and there are no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.children.is_empty()
    }

    /// The value stored exactly at this node.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        self.value.as_deref()
    }

    /// Direct children, in segment order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &PathTree<T>)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Value at `path`, or `None` if any segment is absent.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&T> {
        match path.front() {
            None => self.value.as_deref(),
            Some(front) => self.children.get(front)?.get(&path.pop_front()),
        }
    }

    /// A new tree with `value` stored at `path`. Only the nodes along the
    /// path are rebuilt; everything else is shared with `self`. Setting
    /// `None` clears the value but never prunes - use [`PathTree::remove`]
    /// for that.
    #[must_use]
    pub fn set(&self, path: &Path, value: Option<T>) -> Self {
        self.set_impl(path, value.map(Arc::new))
    }

    fn set_impl(&self, path: &Path, value: Option<Arc<T>>) -> Self {
        match path.front() {
            None => Self {
                value,
                children: Arc::clone(&self.children),
            },
            Some(front) => {
                let child = self
                    .children
                    .get(front)
                    .cloned()
                    .unwrap_or_else(Self::empty);
                let new_child = child.set_impl(&path.pop_front(), value);
                let mut children = (*self.children).clone();
                children.insert(front.to_string(), new_child);
                Self {
                    value: self.value.clone(),
                    children: Arc::new(children),
                }
            }
        }
    }

    /// A new tree with the value at `path` removed. Nodes left with no value
    /// and no children are pruned from their parent, recursively; the root
    /// is allowed to become empty.
    #[must_use]
    pub fn remove(&self, path: &Path) -> Self {
        match path.front() {
            None => {
                if self.children.is_empty() {
                    Self::empty()
                } else {
                    Self {
                        value: None,
                        children: Arc::clone(&self.children),
                    }
                }
            }
            Some(front) => {
                let Some(child) = self.children.get(front) else {
                    // Nothing stored under this path.
                    return self.clone();
                };
                let new_child = child.remove(&path.pop_front());
                let mut children = (*self.children).clone();
                if new_child.is_empty() {
                    children.remove(front);
                } else {
                    children.insert(front.to_string(), new_child);
                }
                if self.value.is_none() && children.is_empty() {
                    Self::empty()
                } else {
                    Self {
                        value: self.value.clone(),
                        children: Arc::new(children),
                    }
                }
            }
        }
    }

    /// A new tree with the entire subtree at `path` replaced by `new_tree`
    /// in one step (used when a full snapshot arrives, e.g. after a
    /// reconnect resync). An empty replacement prunes like `remove`.
    #[must_use]
    pub fn set_tree(&self, path: &Path, new_tree: PathTree<T>) -> Self {
        match path.front() {
            None => new_tree,
            Some(front) => {
                let child = self
                    .children
                    .get(front)
                    .cloned()
                    .unwrap_or_else(Self::empty);
                let new_child = child.set_tree(&path.pop_front(), new_tree);
                let mut children = (*self.children).clone();
                if new_child.is_empty() {
                    children.remove(front);
                } else {
                    children.insert(front.to_string(), new_child);
                }
                Self {
                    value: self.value.clone(),
                    children: Arc::new(children),
                }
            }
        }
    }

    /// The subtree rooted at `path`. Absent paths yield an empty tree;
    /// callers must not assume a distinct allocation per call.
    #[must_use]
    pub fn subtree(&self, path: &Path) -> Self {
        match path.front() {
            None => self.clone(),
            Some(front) => match self.children.get(front) {
                Some(child) => child.subtree(&path.pop_front()),
                None => Self::empty(),
            },
        }
    }

    /// Depth-first fold, children before parent. `f` receives the path to a
    /// node, its optional value, and the already-folded results of its
    /// children keyed by segment.
    pub fn fold<V, F>(&self, mut f: F) -> V
    where
        F: FnMut(&Path, Option<&T>, BTreeMap<String, V>) -> V,
    {
        self.fold_impl(&Path::root(), &mut f)
    }

    fn fold_impl<V, F>(&self, path_so_far: &Path, f: &mut F) -> V
    where
        F: FnMut(&Path, Option<&T>, BTreeMap<String, V>) -> V,
    {
        let mut folded_children = BTreeMap::new();
        for (segment, child) in self.children.iter() {
            let child_path = path_so_far.child(segment);
            folded_children.insert(segment.clone(), child.fold_impl(&child_path, f));
        }
        f(path_so_far, self.value.as_deref(), folded_children)
    }

    /// Walk from the root toward `path`, returning the *shallowest* node
    /// along the way whose value satisfies `predicate`, together with the
    /// path consumed to reach it.
    pub fn find_root_most_matching_path_and_value<P>(
        &self,
        path: &Path,
        predicate: P,
    ) -> Option<(Path, &T)>
    where
        P: Fn(&T) -> bool,
    {
        if let Some(value) = self.value.as_deref() {
            if predicate(value) {
                return Some((Path::root(), value));
            }
        }
        let front = path.front()?;
        let child = self.children.get(front)?;
        let (sub_path, value) =
            child.find_root_most_matching_path_and_value(&path.pop_front(), predicate)?;
        let full_path = Path::from_segments(vec![front.to_string()]).child_path(&sub_path);
        Some((full_path, value))
    }

    /// Shortest prefix of `path` that points at a stored value.
    pub fn find_root_most_value_and_path(&self, path: &Path) -> Option<(Path, &T)> {
        self.find_root_most_matching_path_and_value(path, |_| true)
    }

    /// Apply `f` to each value on the way to `path`, returning the first
    /// `Some` it produces.
    pub fn find_on_path<V, F>(&self, path: &Path, mut f: F) -> Option<V>
    where
        F: FnMut(&Path, &T) -> Option<V>,
    {
        self.find_on_path_impl(path, &Path::root(), &mut f)
    }

    fn find_on_path_impl<V, F>(&self, to_follow: &Path, so_far: &Path, f: &mut F) -> Option<V>
    where
        F: FnMut(&Path, &T) -> Option<V>,
    {
        if let Some(value) = self.value.as_deref() {
            if let Some(result) = f(so_far, value) {
                return Some(result);
            }
        }
        let front = to_follow.front()?;
        let child = self.children.get(front)?;
        child.find_on_path_impl(&to_follow.pop_front(), &so_far.child(front), f)
    }

    /// Visit every value stored strictly above `path`, then return the
    /// subtree at `path` (empty if the path dead-ends).
    pub fn foreach_on_path<F>(&self, path: &Path, mut f: F) -> Self
    where
        F: FnMut(&Path, &T),
    {
        self.foreach_on_path_impl(path, &Path::root(), &mut f)
    }

    fn foreach_on_path_impl<F>(&self, to_follow: &Path, so_far: &Path, f: &mut F) -> Self
    where
        F: FnMut(&Path, &T),
    {
        match to_follow.front() {
            None => self.clone(),
            Some(front) => {
                if let Some(value) = self.value.as_deref() {
                    f(so_far, value);
                }
                match self.children.get(front) {
                    Some(child) => child.foreach_on_path_impl(
                        &to_follow.pop_front(),
                        &so_far.child(front),
                        f,
                    ),
                    None => Self::empty(),
                }
            }
        }
    }

    /// Call `f` for every stored value, children (in segment order) before
    /// the node's own value, so aggregation callbacks always see fully
    /// visited subtrees first.
    pub fn foreach<F>(&self, mut f: F)
    where
        F: FnMut(&Path, &T),
    {
        self.foreach_impl(&Path::root(), &mut f);
    }

    fn foreach_impl<F>(&self, so_far: &Path, f: &mut F)
    where
        F: FnMut(&Path, &T),
    {
        for (segment, child) in self.children.iter() {
            child.foreach_impl(&so_far.child(segment), f);
        }
        if let Some(value) = self.value.as_deref() {
            f(so_far, value);
        }
    }

    /// Call `f` for each direct child that stores a value.
    pub fn foreach_child<F>(&self, mut f: F)
    where
        F: FnMut(&str, &T),
    {
        for (segment, child) in self.children.iter() {
            if let Some(value) = child.value.as_deref() {
                f(segment, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Path {
        Path::new(s)
    }

    #[test]
    fn test_round_trip() {
        let tree = PathTree::empty().set(&p("a/b/c"), Some(7));
        assert_eq!(tree.get(&p("a/b/c")), Some(&7));
        assert_eq!(tree.get(&p("a/b")), None);
        assert_eq!(tree.get(&p("a/b/c/d")), None);
        assert_eq!(tree.get(&p("x")), None);
    }

    #[test]
    fn test_set_does_not_mutate_original() {
        let before = PathTree::empty()
            .set(&p("a/x"), Some(1))
            .set(&p("a/y"), Some(2));
        let after = before.set(&p("a/x"), Some(10)).set(&p("b"), Some(3));

        assert_eq!(before.get(&p("a/x")), Some(&1));
        assert_eq!(before.get(&p("a/y")), Some(&2));
        assert_eq!(before.get(&p("b")), None);

        assert_eq!(after.get(&p("a/x")), Some(&10));
        assert_eq!(after.get(&p("a/y")), Some(&2));
        assert_eq!(after.get(&p("b")), Some(&3));
    }

    #[test]
    fn test_untouched_siblings_are_shared_by_reference() {
        let before = PathTree::empty()
            .set(&p("shared/deep/value"), Some(1))
            .set(&p("hot"), Some(2));
        let after = before.set(&p("hot"), Some(3));

        let old_shared = before.children.get("shared").unwrap();
        let new_shared = after.children.get("shared").unwrap();
        assert!(Arc::ptr_eq(&old_shared.children, &new_shared.children));
    }

    #[test]
    fn test_remove_prunes_empty_nodes() {
        let tree = PathTree::empty().set(&p("a/b"), Some(1)).remove(&p("a/b"));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_remove_keeps_populated_ancestors() {
        let tree = PathTree::empty()
            .set(&p("a/b"), Some(1))
            .set(&p("a/c"), Some(2))
            .remove(&p("a/b"));
        assert!(!tree.is_empty());
        assert_eq!(tree.get(&p("a/c")), Some(&2));
        assert_eq!(tree.get(&p("a/b")), None);
        // The pruned node is gone from its parent's children map.
        assert!(tree.subtree(&p("a/b")).is_empty());
    }

    #[test]
    fn test_remove_missing_path_is_identity() {
        let tree = PathTree::empty().set(&p("a"), Some(1));
        let removed = tree.remove(&p("x/y"));
        assert_eq!(removed.get(&p("a")), Some(&1));
    }

    #[test]
    fn test_set_none_clears_value_without_pruning() {
        let tree = PathTree::empty()
            .set(&p("a"), Some(1))
            .set(&p("a/b"), Some(2))
            .set(&p("a/b"), None);
        assert_eq!(tree.get(&p("a/b")), None);
        assert_eq!(tree.get(&p("a")), Some(&1));
        // The cleared node stays in the children map until removed.
        assert!(!tree.subtree(&p("a")).is_empty());
    }

    #[test]
    fn test_set_tree_replaces_whole_subtree() {
        let tree = PathTree::empty()
            .set(&p("a/old"), Some(1))
            .set(&p("a/stale"), Some(2));
        let snapshot = PathTree::empty().set(&p("new"), Some(9));
        let resynced = tree.set_tree(&p("a"), snapshot);

        assert_eq!(resynced.get(&p("a/old")), None);
        assert_eq!(resynced.get(&p("a/stale")), None);
        assert_eq!(resynced.get(&p("a/new")), Some(&9));
    }

    #[test]
    fn test_set_tree_empty_prunes() {
        let tree = PathTree::empty()
            .set(&p("a/b"), Some(1))
            .set_tree(&p("a"), PathTree::empty());
        assert!(tree.is_empty());
    }

    #[test]
    fn test_subtree_absent_is_empty() {
        let tree = PathTree::empty().set(&p("a"), Some(1));
        assert!(tree.subtree(&p("a/b/c")).is_empty());
        assert_eq!(tree.subtree(&p("a")).value(), Some(&1));
    }

    #[test]
    fn test_fold_visits_children_before_parent() {
        let tree = PathTree::from_pairs(vec![(p("x"), 1), (p("y"), 2)]);
        let sum = tree.fold(|_path, value, children| {
            // Children are already folded when the parent combines.
            let child_sum: i32 = children.values().sum();
            child_sum + value.copied().unwrap_or(0)
        });
        assert_eq!(sum, 3);

        let mut order = Vec::new();
        tree.fold(|path, _value, _children| order.push(path.to_string()));
        assert_eq!(order, vec!["/x", "/y", "/"]);
    }

    #[test]
    fn test_find_root_most_matching() {
        let tree = PathTree::empty()
            .set(&p("a"), Some(1))
            .set(&p("a/b/c"), Some(2));

        let (path, value) = tree
            .find_root_most_matching_path_and_value(&p("a/b/c"), |_| true)
            .unwrap();
        assert_eq!(path, p("a"));
        assert_eq!(*value, 1);

        let (path, value) = tree
            .find_root_most_matching_path_and_value(&p("a/b/c"), |v| *v > 1)
            .unwrap();
        assert_eq!(path, p("a/b/c"));
        assert_eq!(*value, 2);

        assert!(tree
            .find_root_most_matching_path_and_value(&p("a/b/c"), |v| *v > 5)
            .is_none());
    }

    #[test]
    fn test_find_on_path_stops_at_first_hit() {
        let tree = PathTree::empty()
            .set(&p("a"), Some(1))
            .set(&p("a/b"), Some(2));
        let hit = tree.find_on_path(&p("a/b"), |path, v| {
            if *v >= 1 {
                Some(path.clone())
            } else {
                None
            }
        });
        assert_eq!(hit, Some(p("a")));
    }

    #[test]
    fn test_foreach_on_path_visits_ancestors_only() {
        let tree = PathTree::empty()
            .set(&p("a"), Some(1))
            .set(&p("a/b"), Some(2))
            .set(&p("a/b/c"), Some(3));

        let mut seen = Vec::new();
        let at_path = tree.foreach_on_path(&p("a/b"), |path, v| seen.push((path.clone(), *v)));
        assert_eq!(seen, vec![(p("a"), 1)]);
        assert_eq!(at_path.value(), Some(&2));
    }

    #[test]
    fn test_foreach_is_post_order() {
        let tree = PathTree::empty()
            .set(&Path::root(), Some(0))
            .set(&p("a"), Some(1))
            .set(&p("a/b"), Some(2));

        let mut seen = Vec::new();
        tree.foreach(|path, v| seen.push((path.to_string(), *v)));
        assert_eq!(
            seen,
            vec![("/a/b".to_string(), 2), ("/a".to_string(), 1), ("/".to_string(), 0)]
        );
    }

    #[test]
    fn test_foreach_child() {
        let tree = PathTree::empty()
            .set(&p("a"), Some(1))
            .set(&p("b/deep"), Some(2))
            .set(&p("c"), Some(3));
        let mut direct = Vec::new();
        tree.foreach_child(|key, v| direct.push((key.to_string(), *v)));
        // "b" holds no value of its own, only a descendant.
        assert_eq!(direct, vec![("a".to_string(), 1), ("c".to_string(), 3)]);
    }
}
