//! Request table: the single source of truth for which URL each target wants.

use super::Target;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Map of target → desired URL, plus the cancel generation
///
/// Every operation holds the lock only for a constant-time map access, so
/// `enqueue` never waits on the worker.
pub(crate) struct RequestTable<K> {
    inner: Mutex<TableInner<K>>,
}

struct TableInner<K> {
    entries: HashMap<K, String>,
    /// Advanced by `clear()`; signals stamped with an older value are stale
    generation: u64,
}

impl<K: Target> RequestTable<K> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(TableInner {
                entries: HashMap::new(),
                generation: 0,
            }),
        }
    }

    /// Record `url` as the desired URL for `target`, replacing any earlier one
    ///
    /// Returns the generation the request belongs to.
    pub(crate) fn insert(&self, target: K, url: String) -> u64 {
        let mut inner = self.inner.lock();
        inner.entries.insert(target, url);
        inner.generation
    }

    pub(crate) fn remove(&self, target: &K) -> Option<String> {
        self.inner.lock().entries.remove(target)
    }

    /// The URL `target` currently wants, if the signal is still current
    pub(crate) fn desired_url(&self, target: &K, generation: u64) -> Option<String> {
        let inner = self.inner.lock();
        if inner.generation != generation {
            return None;
        }
        inner.entries.get(target).cloned()
    }

    /// Drop every entry and invalidate all outstanding signals
    ///
    /// Returns the new generation.
    pub(crate) fn clear(&self) -> u64 {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.generation += 1;
        inner.generation
    }

    /// Remove the entry for `target` if it still maps to `url`
    ///
    /// Returns `true` when the entry matched, i.e. the fetched result is
    /// still wanted.
    pub(crate) fn take_if_current(&self, target: &K, url: &str) -> bool {
        let mut inner = self.inner.lock();
        match inner.entries.get(target) {
            Some(desired) if desired == url => {
                inner.entries.remove(target);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_overwrites_previous_url() {
        let table = RequestTable::new();
        let generation = table.insert(1u32, "a.jpg".to_string());
        table.insert(1u32, "b.jpg".to_string());

        assert_eq!(table.len(), 1);
        assert_eq!(
            table.desired_url(&1, generation).as_deref(),
            Some("b.jpg")
        );
    }

    #[test]
    fn clear_invalidates_older_generations() {
        let table = RequestTable::new();
        let old = table.insert(1u32, "a.jpg".to_string());

        let new = table.clear();
        assert_eq!(new, old + 1);
        assert_eq!(table.len(), 0);

        // Re-requested after the clear: only the new generation sees it
        assert_eq!(table.insert(1u32, "a.jpg".to_string()), new);
        assert!(table.desired_url(&1, old).is_none());
        assert_eq!(table.desired_url(&1, new).as_deref(), Some("a.jpg"));
    }

    #[test]
    fn take_if_current_only_matches_same_url() {
        let table = RequestTable::new();
        table.insert("slot", "new.jpg".to_string());

        assert!(!table.take_if_current(&"slot", "old.jpg"));
        assert_eq!(table.len(), 1);

        assert!(table.take_if_current(&"slot", "new.jpg"));
        assert_eq!(table.len(), 0);

        // Already satisfied
        assert!(!table.take_if_current(&"slot", "new.jpg"));
    }

    #[test]
    fn remove_missing_target_is_harmless() {
        let table: RequestTable<u8> = RequestTable::new();
        assert!(table.remove(&7).is_none());
        assert!(table.desired_url(&7, 0).is_none());
    }
}
