// ── Generic reactive entity collection ──
//
// Lock-free concurrent storage with O(1) lookups and push-based
// change notification via `watch` channels.

use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

/// A lock-free, reactive collection for a single entity type.
///
/// Uses `DashMap` for O(1) concurrent lookups and `watch` channels
/// for push-based change notification. Every mutation rebuilds the
/// snapshot that subscribers receive.
pub(crate) struct EntityCollection<K, T>
where
    K: Eq + Hash + Clone,
    T: Send + Sync + 'static,
{
    /// Primary storage: identity -> published snapshot.
    by_key: DashMap<K, Arc<T>>,

    /// Full snapshot, rebuilt on mutation for efficient subscription.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<K, T> EntityCollection<K, T>
where
    K: Eq + Hash + Clone,
    T: Send + Sync + 'static,
{
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_key: DashMap::new(),
            snapshot,
        }
    }

    /// Insert or replace an entity. Returns the previous snapshot, if any.
    pub(crate) fn upsert(&self, key: K, entity: Arc<T>) -> Option<Arc<T>> {
        let previous = self.by_key.insert(key, entity);
        self.rebuild_snapshot();
        previous
    }

    /// Remove an entity by key. Returns the removed entity if it existed.
    pub(crate) fn remove(&self, key: &K) -> Option<Arc<T>> {
        let removed = self.by_key.remove(key).map(|(_, v)| v);
        if removed.is_some() {
            self.rebuild_snapshot();
        }
        removed
    }

    /// Remove every entity whose key satisfies `matches`. Returns the removed ones.
    pub(crate) fn remove_where(&self, mut matches: impl FnMut(&K) -> bool) -> Vec<Arc<T>> {
        let doomed: Vec<K> = self
            .by_key
            .iter()
            .filter(|r| matches(r.key()))
            .map(|r| r.key().clone())
            .collect();
        let removed: Vec<Arc<T>> = doomed
            .iter()
            .filter_map(|key| self.by_key.remove(key).map(|(_, v)| v))
            .collect();
        if !removed.is_empty() {
            self.rebuild_snapshot();
        }
        removed
    }

    pub(crate) fn get(&self, key: &K) -> Option<Arc<T>> {
        self.by_key.get(key).map(|r| Arc::clone(r.value()))
    }

    /// Every entity whose key satisfies `matches`.
    pub(crate) fn filter(&self, mut matches: impl FnMut(&K) -> bool) -> Vec<Arc<T>> {
        self.by_key
            .iter()
            .filter(|r| matches(r.key()))
            .map(|r| Arc::clone(r.value()))
            .collect()
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Collect all values into a snapshot vec and broadcast to subscribers.
    ///
    /// The map is read while the channel is held, so concurrent mutations
    /// publish in order and the last snapshot sent reflects them all.
    fn rebuild_snapshot(&self) {
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| {
            *snap = Arc::new(self.by_key.iter().map(|r| Arc::clone(r.value())).collect());
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn collection() -> EntityCollection<String, String> {
        EntityCollection::new()
    }

    #[test]
    fn upsert_returns_previous_value() {
        let col = collection();
        assert!(col.upsert("key1".into(), Arc::new("hello".into())).is_none());
        let previous = col.upsert("key1".into(), Arc::new("world".into()));
        assert_eq!(*previous.unwrap(), "hello");
        assert_eq!(*col.get(&"key1".into()).unwrap(), "world");
    }

    #[test]
    fn remove_returns_entity_and_updates_snapshot() {
        let col = collection();
        col.upsert("key1".into(), Arc::new("hello".into()));

        let removed = col.remove(&"key1".into());
        assert_eq!(*removed.unwrap(), "hello");
        assert!(col.get(&"key1".into()).is_none());
        assert!(col.snapshot().is_empty());
    }

    #[test]
    fn remove_where_drops_matching_keys() {
        let col = collection();
        col.upsert("of:1/1".into(), Arc::new("a".into()));
        col.upsert("of:1/2".into(), Arc::new("b".into()));
        col.upsert("of:2/1".into(), Arc::new("c".into()));

        let removed = col.remove_where(|k| k.starts_with("of:1/"));
        assert_eq!(removed.len(), 2);
        assert_eq!(col.len(), 1);
    }

    #[test]
    fn removing_a_missing_key_publishes_nothing() {
        let col = collection();
        col.upsert("a".into(), Arc::new("x".into()));
        let mut rx = col.subscribe();
        assert!(col.remove(&"b".into()).is_none());
        assert!(col.remove_where(|k| k == "b").is_empty());
        assert!(!rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);
    }

    #[test]
    fn concurrent_upserts_leave_a_complete_snapshot() {
        let col = collection();
        std::thread::scope(|s| {
            for t in 0..4 {
                let col = &col;
                s.spawn(move || {
                    for i in 0..50 {
                        col.upsert(format!("{t}-{i}"), Arc::new(format!("v{i}")));
                    }
                });
            }
        });
        assert_eq!(col.len(), 200);
        assert_eq!(col.snapshot().len(), 200);
    }

    #[test]
    fn subscribers_see_new_snapshots() {
        let col = collection();
        let mut rx = col.subscribe();
        col.upsert("a".into(), Arc::new("x".into()));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);
    }
}
