use std::collections::VecDeque;
use std::sync::Mutex;

use tracing::debug;

use droid_use_common::mutex_lock_or_recover;
use droid_use_core::SelectorKey;

use crate::platform::NodeHandle;

/// Bounded LRU cache of previously-seen node handles, keyed by the
/// selector that last resolved to them.
///
/// Every stored handle is an owned copy; insertion past capacity evicts
/// the least-recently-used entry. Mutation happens under one lock, but
/// the evicted/cleared handles are returned to the caller so their
/// release (platform I/O) never runs while the lock is held; hand them
/// to [`release_handles`].
pub struct NodeSnapshotStore {
    capacity: usize,
    // Front is least recently used.
    entries: Mutex<VecDeque<(SelectorKey, NodeHandle)>>,
}

pub const DEFAULT_SNAPSHOT_CAPACITY: usize = 32;

impl NodeSnapshotStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(VecDeque::new()),
        }
    }

    /// Inserts an owned handle at the most-recently-used position,
    /// replacing any entry under the same key. Returns the handles the
    /// caller must release.
    pub fn insert(&self, key: SelectorKey, handle: NodeHandle) -> Vec<NodeHandle> {
        let mut evicted = Vec::new();
        let mut entries = mutex_lock_or_recover(&self.entries);
        if let Some(pos) = entries.iter().position(|(k, _)| *k == key) {
            if let Some((_, old)) = entries.remove(pos) {
                evicted.push(old);
            }
        }
        entries.push_back((key, handle));
        while entries.len() > self.capacity {
            if let Some((_, lru)) = entries.pop_front() {
                evicted.push(lru);
            }
        }
        evicted
    }

    /// Removes and returns the entry under `key`, marking nothing: the
    /// caller either re-inserts a validated handle or releases it.
    pub fn take(&self, key: &SelectorKey) -> Option<NodeHandle> {
        let mut entries = mutex_lock_or_recover(&self.entries);
        let pos = entries.iter().position(|(k, _)| k == key)?;
        entries.remove(pos).map(|(_, handle)| handle)
    }

    pub fn contains(&self, key: &SelectorKey) -> bool {
        mutex_lock_or_recover(&self.entries)
            .iter()
            .any(|(k, _)| k == key)
    }

    /// Drops every entry, returning the handles for release.
    pub fn clear(&self) -> Vec<NodeHandle> {
        let mut entries = mutex_lock_or_recover(&self.entries);
        let drained: Vec<NodeHandle> = entries.drain(..).map(|(_, handle)| handle).collect();
        if !drained.is_empty() {
            debug!(count = drained.len(), "snapshot store cleared");
        }
        drained
    }

    pub fn len(&self) -> usize {
        mutex_lock_or_recover(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Releases handles off the caller's thread when a runtime is available.
/// Node release is platform I/O; it must not run under the store lock or
/// on the callback-delivery context.
pub fn release_handles(handles: Vec<NodeHandle>) {
    if handles.is_empty() {
        return;
    }
    match tokio::runtime::Handle::try_current() {
        Ok(runtime) => {
            runtime.spawn_blocking(move || drop(handles));
        }
        Err(_) => drop(handles),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockNode;
    use droid_use_core::Selector;

    fn key(window_id: i32, view_id: &str) -> SelectorKey {
        Selector {
            view_id: Some(view_id.to_string()),
            window_id,
            ..Selector::default()
        }
        .key()
    }

    fn handle(view_id: &str) -> NodeHandle {
        MockNode::new().view_id(view_id).into_handle()
    }

    #[test]
    fn test_insert_and_take() {
        let store = NodeSnapshotStore::new(4);
        let evicted = store.insert(key(1, "a"), handle("a"));
        assert!(evicted.is_empty());
        assert_eq!(store.len(), 1);

        let taken = store.take(&key(1, "a")).unwrap();
        assert_eq!(taken.view_id().unwrap().as_deref(), Some("a"));
        assert!(store.is_empty());
        assert!(store.take(&key(1, "a")).is_none());
    }

    #[test]
    fn test_insert_replaces_same_key() {
        let store = NodeSnapshotStore::new(4);
        store.insert(key(1, "a"), handle("old"));
        let evicted = store.insert(key(1, "a"), handle("new"));
        assert_eq!(evicted.len(), 1);
        assert_eq!(store.len(), 1);
        let taken = store.take(&key(1, "a")).unwrap();
        assert_eq!(taken.view_id().unwrap().as_deref(), Some("new"));
    }

    #[test]
    fn test_size_never_exceeds_capacity() {
        let store = NodeSnapshotStore::new(3);
        for i in 0..10 {
            store.insert(key(1, &format!("v{}", i)), handle(&format!("v{}", i)));
            assert!(store.len() <= 3);
        }
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_eviction_removes_least_recently_used() {
        let store = NodeSnapshotStore::new(2);
        store.insert(key(1, "a"), handle("a"));
        store.insert(key(1, "b"), handle("b"));

        // Touch "a" so "b" becomes the LRU entry.
        let a = store.take(&key(1, "a")).unwrap();
        store.insert(key(1, "a"), a);

        let evicted = store.insert(key(1, "c"), handle("c"));
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].view_id().unwrap().as_deref(), Some("b"));
        assert!(store.contains(&key(1, "a")));
        assert!(store.contains(&key(1, "c")));
        assert!(!store.contains(&key(1, "b")));
    }

    #[test]
    fn test_clear_returns_all_handles() {
        let store = NodeSnapshotStore::new(4);
        store.insert(key(1, "a"), handle("a"));
        store.insert(key(2, "b"), handle("b"));
        let drained = store.clear();
        assert_eq!(drained.len(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_keys_distinguish_windows() {
        let store = NodeSnapshotStore::new(4);
        store.insert(key(1, "a"), handle("w1"));
        store.insert(key(2, "a"), handle("w2"));
        assert_eq!(store.len(), 2);
        let taken = store.take(&key(2, "a")).unwrap();
        assert_eq!(taken.view_id().unwrap().as_deref(), Some("a"));
    }

    #[test]
    fn test_release_handles_outside_runtime_drops_inline() {
        let node = MockNode::new().view_id("x");
        let tracker = node.release_tracker();
        release_handles(vec![node.into_handle()]);
        assert_eq!(tracker.released(), 1);
    }

    #[tokio::test]
    async fn test_release_handles_on_runtime_releases_eventually() {
        let node = MockNode::new().view_id("x");
        let tracker = node.release_tracker();
        release_handles(vec![node.into_handle()]);
        for _ in 0..50 {
            if tracker.released() == 1 {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("handle was not released on the blocking pool");
    }
}
