// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Paths into the hierarchical namespace.
//!
//! A [`Path`] is an ordered, immutable sequence of string segments:
//! `/users/alice/posts` becomes `["users", "alice", "posts"]`.
//!
//! Recursive descent consumes a path front-to-back. To keep that cheap,
//! segments live in a shared `Arc` slice and [`Path::pop_front`] only bumps
//! an offset - no segment is ever copied during descent.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// An immutable location in the hierarchical namespace.
#[derive(Debug, Clone)]
pub struct Path {
    pieces: Arc<[String]>,
    offset: usize,
}

impl Path {
    /// The empty (root) path.
    #[must_use]
    pub fn root() -> Self {
        Self {
            pieces: Arc::from(Vec::new()),
            offset: 0,
        }
    }

    /// Parse a `/`-separated path string. Empty segments are dropped, so
    /// `"/a//b/"` and `"a/b"` are the same path.
    #[must_use]
    pub fn new(path: &str) -> Self {
        let pieces: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            pieces: Arc::from(pieces),
            offset: 0,
        }
    }

    /// Build a path from pre-split segments.
    #[must_use]
    pub fn from_segments(segments: Vec<String>) -> Self {
        Self {
            pieces: Arc::from(segments),
            offset: 0,
        }
    }

    /// The segments remaining in this view of the path.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.pieces[self.offset..]
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offset >= self.pieces.len()
    }

    /// Number of remaining segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pieces.len() - self.offset
    }

    /// First remaining segment, if any.
    #[must_use]
    pub fn front(&self) -> Option<&str> {
        self.segments().first().map(String::as_str)
    }

    /// Last segment, if any.
    #[must_use]
    pub fn back(&self) -> Option<&str> {
        self.segments().last().map(String::as_str)
    }

    /// Drop the first segment. The backing storage is shared, so this is
    /// an offset bump, not a copy. Popping the root path yields the root.
    #[must_use]
    pub fn pop_front(&self) -> Self {
        let offset = (self.offset + 1).min(self.pieces.len());
        Self {
            pieces: Arc::clone(&self.pieces),
            offset,
        }
    }

    /// Append one segment.
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        let mut pieces: Vec<String> = self.segments().to_vec();
        pieces.push(segment.to_string());
        Self {
            pieces: Arc::from(pieces),
            offset: 0,
        }
    }

    /// Append every segment of `other`.
    #[must_use]
    pub fn child_path(&self, other: &Path) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        let mut pieces: Vec<String> = self.segments().to_vec();
        pieces.extend(other.segments().iter().cloned());
        Self {
            pieces: Arc::from(pieces),
            offset: 0,
        }
    }

    /// The path with the last segment removed. `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let segs = self.segments();
        if segs.is_empty() {
            return None;
        }
        Some(Self::from_segments(segs[..segs.len() - 1].to_vec()))
    }

    /// True if `self` is an ancestor of `other` or equal to it.
    #[must_use]
    pub fn contains(&self, other: &Path) -> bool {
        let mine = self.segments();
        let theirs = other.segments();
        mine.len() <= theirs.len() && mine == &theirs[..mine.len()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.segments().iter().map(String::as_str)
    }
}

impl Default for Path {
    fn default() -> Self {
        Self::root()
    }
}

// Equality, hashing and ordering go through the offset view so that a
// popped path compares equal to a freshly parsed one.
impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.segments() == other.segments()
    }
}

impl Eq for Path {}

impl Hash for Path {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.segments().hash(state);
    }
}

impl PartialOrd for Path {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Path {
    fn cmp(&self, other: &Self) -> Ordering {
        self.segments().cmp(other.segments())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "/");
        }
        for segment in self.iter() {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl From<&str> for Path {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}
