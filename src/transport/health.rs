// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Transport health tracking.
//!
//! Whether the last connection attempt with this transport kind failed is
//! remembered across sessions through an injected [`HealthStore`] capability
//! rather than a module-level global, so tests can substitute an in-memory
//! fake and separate channels don't cross-contaminate unless they share a
//! store on purpose. The flag is advisory only - it biases future transport
//! selection, never correctness.

use std::collections::HashMap;

use parking_lot::Mutex;

/// Key under which the previous-failure flag is stored.
pub const PREVIOUS_FAILURE_KEY: &str = "previous_channel_failure";

/// Minimal persistent key-value capability for boolean health flags.
/// Concurrent writers are acceptable; last write wins.
pub trait HealthStore: Send + Sync {
    fn get(&self, key: &str) -> Option<bool>;
    fn set(&self, key: &str, value: bool);
    fn remove(&self, key: &str);

    /// Whether flags survive the process. Non-persistent stores cannot
    /// remember a failure, so health checks fail safe on them.
    fn is_persistent(&self) -> bool {
        true
    }
}

/// True if this transport kind should be presumed to have failed before:
/// either the store can't actually persist anything, or the flag is set.
#[must_use]
pub fn previously_failed(store: &dyn HealthStore, key: &str) -> bool {
    !store.is_persistent() || store.get(key) == Some(true)
}

/// In-memory store for tests and environments without persistent storage.
/// Reports itself as non-persistent, so [`previously_failed`] is always
/// true regardless of flag state - the fail-safe default.
#[derive(Debug, Default)]
pub struct MemoryHealthStore {
    flags: Mutex<HashMap<String, bool>>,
}

impl MemoryHealthStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl HealthStore for MemoryHealthStore {
    fn get(&self, key: &str) -> Option<bool> {
        self.flags.lock().get(key).copied()
    }

    fn set(&self, key: &str, value: bool) {
        self.flags.lock().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.flags.lock().remove(key);
    }

    fn is_persistent(&self) -> bool {
        false
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A `MemoryHealthStore` that claims persistence, for asserting flag
    /// transitions in channel tests.
    #[derive(Debug, Default)]
    pub struct FakePersistentStore {
        inner: MemoryHealthStore,
    }

    impl HealthStore for FakePersistentStore {
        fn get(&self, key: &str) -> Option<bool> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: bool) {
            self.inner.set(key, value);
        }

        fn remove(&self, key: &str) {
            self.inner.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::FakePersistentStore;
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryHealthStore::new();
        assert_eq!(store.get(PREVIOUS_FAILURE_KEY), None);
        store.set(PREVIOUS_FAILURE_KEY, true);
        assert_eq!(store.get(PREVIOUS_FAILURE_KEY), Some(true));
        store.remove(PREVIOUS_FAILURE_KEY);
        assert_eq!(store.get(PREVIOUS_FAILURE_KEY), None);
    }

    #[test]
    fn test_non_persistent_store_always_assumes_prior_failure() {
        let store = MemoryHealthStore::new();
        assert!(previously_failed(&store, PREVIOUS_FAILURE_KEY));
        store.remove(PREVIOUS_FAILURE_KEY);
        assert!(previously_failed(&store, PREVIOUS_FAILURE_KEY));
    }

    #[test]
    fn test_persistent_store_tracks_the_flag() {
        let store = FakePersistentStore::default();
        assert!(!previously_failed(&store, PREVIOUS_FAILURE_KEY));
        store.set(PREVIOUS_FAILURE_KEY, true);
        assert!(previously_failed(&store, PREVIOUS_FAILURE_KEY));
        store.remove(PREVIOUS_FAILURE_KEY);
        assert!(!previously_failed(&store, PREVIOUS_FAILURE_KEY));
    }
}
