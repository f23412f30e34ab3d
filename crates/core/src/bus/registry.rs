//! Subscriber registry
//!
//! Holds one ordered subscriber list per [`EventKind`]. Lists are immutable
//! snapshots (`Arc<[Arc<Subscription>]>`) rebuilt on every mutation, so a
//! dispatch keeps iterating the list it started with no matter what is
//! registered or removed meanwhile, on this thread or any other.

use std::sync::Arc;

use parking_lot::RwLock;
use slotmap::{new_key_type, SlotMap};

use crate::events::{Event, EventCallback, EventInfo, EventKind, EventPhase, HandlerResult};

new_key_type! {
    /// Handle for a registered subscription, used for removal
    pub struct SubscriptionKey;
}

/// Ordered, immutable view of the subscribers for one kind
pub type Snapshot = Arc<[Arc<Subscription>]>;

/// A registered subscriber
pub struct Subscription {
    key: SubscriptionKey,
    kind: EventKind,
    priority: i32,
    phase: Option<EventPhase>,
    /// Registration sequence number, tie-break for equal priorities
    seq: u64,
    /// Name of the module that registered this subscriber
    owner: Option<&'static str>,
    callback: EventCallback,
}

impl Subscription {
    pub fn key(&self) -> SubscriptionKey {
        self.key
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn phase(&self) -> Option<EventPhase> {
        self.phase
    }

    pub fn owner(&self) -> Option<&'static str> {
        self.owner
    }

    /// Whether this subscriber wants an event in `phase`
    #[inline]
    pub fn accepts(&self, phase: Option<EventPhase>) -> bool {
        EventPhase::matches(self.phase, phase)
    }

    #[inline]
    pub(crate) fn invoke(&self, event: &Event<'_>, info: &mut EventInfo) -> HandlerResult {
        (self.callback)(event, info)
    }

    fn order(&self) -> (i32, u64) {
        (self.priority, self.seq)
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("priority", &self.priority)
            .field("phase", &self.phase)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

struct RegistryInner {
    /// Key -> kind, for removal
    index: SlotMap<SubscriptionKey, EventKind>,
    lists: [Snapshot; EventKind::COUNT],
    next_seq: u64,
    /// Set by `close`; inserts are refused from then on
    closed: bool,
}

/// Subscriber registry shared by producers on every thread
pub struct Registry {
    inner: RwLock<RegistryInner>,
}

fn empty_snapshot() -> Snapshot {
    Arc::from(Vec::new())
}

impl Registry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RegistryInner {
                index: SlotMap::with_key(),
                lists: std::array::from_fn(|_| empty_snapshot()),
                next_seq: 0,
                closed: false,
            }),
        }
    }

    /// Add a subscriber and return its key, or `None` once the registry is closed
    ///
    /// Phase validation is the caller's job; the registry stores what it is given.
    pub fn insert(
        &self,
        owner: Option<&'static str>,
        kind: EventKind,
        priority: i32,
        phase: Option<EventPhase>,
        callback: EventCallback,
    ) -> Option<SubscriptionKey> {
        let mut inner = self.inner.write();
        if inner.closed {
            return None;
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        let key = inner.index.insert(kind);

        let subscription = Arc::new(Subscription {
            key,
            kind,
            priority,
            phase,
            seq,
            owner,
            callback,
        });

        let current = &inner.lists[kind.index()];
        let mut list: Vec<Arc<Subscription>> = Vec::with_capacity(current.len() + 1);
        list.extend(current.iter().cloned());
        // Sorted by (priority, seq); the new entry has the highest seq so it
        // goes after every existing entry of equal priority.
        let at = list.partition_point(|s| s.order() <= subscription.order());
        list.insert(at, subscription);
        inner.lists[kind.index()] = Arc::from(list);

        tracing::trace!(
            "Added {} subscriber {:?} (priority {}, total {})",
            kind,
            key,
            priority,
            inner.lists[kind.index()].len()
        );
        Some(key)
    }

    /// Remove a subscriber
    ///
    /// # Returns
    /// `true` if the key was registered; removing twice is a harmless no-op.
    pub fn remove(&self, key: SubscriptionKey) -> bool {
        let mut inner = self.inner.write();
        let Some(kind) = inner.index.remove(key) else {
            return false;
        };

        let list: Vec<Arc<Subscription>> = inner.lists[kind.index()]
            .iter()
            .filter(|s| s.key != key)
            .cloned()
            .collect();
        inner.lists[kind.index()] = Arc::from(list);

        tracing::trace!("Removed {} subscriber {:?}", kind, key);
        true
    }

    /// Current ordered subscribers for `kind`
    pub fn subscribers_for(&self, kind: EventKind) -> Snapshot {
        self.inner.read().lists[kind.index()].clone()
    }

    /// Check whether a key is still registered
    pub fn contains(&self, key: SubscriptionKey) -> bool {
        self.inner.read().index.contains_key(key)
    }

    /// Number of subscribers for `kind`
    pub fn len(&self, kind: EventKind) -> usize {
        self.inner.read().lists[kind.index()].len()
    }

    /// Total number of subscriptions across all kinds
    pub fn total(&self) -> usize {
        self.inner.read().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Remove every subscription
    ///
    /// Returns the number of subscriptions removed.
    pub fn clear(&self) -> usize {
        Self::clear_locked(&mut self.inner.write())
    }

    /// Remove every subscription and refuse further inserts
    ///
    /// Both happen under one write lock, so no insert can land after the
    /// clear. Returns the number of subscriptions removed.
    pub fn close(&self) -> usize {
        let mut inner = self.inner.write();
        inner.closed = true;
        Self::clear_locked(&mut inner)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.read().closed
    }

    fn clear_locked(inner: &mut RegistryInner) -> usize {
        let removed = inner.index.len();
        inner.index.clear();
        for list in inner.lists.iter_mut() {
            *list = empty_snapshot();
        }
        removed
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> EventCallback {
        Box::new(|_, _| Ok(()))
    }

    fn priorities(snapshot: &Snapshot) -> Vec<i32> {
        snapshot.iter().map(|s| s.priority()).collect()
    }

    #[test]
    fn test_ordered_by_priority_then_registration() {
        let registry = Registry::new();
        let a = registry.insert(None, EventKind::Tick, 10, None, noop()).unwrap();
        let b = registry.insert(None, EventKind::Tick, 5, None, noop()).unwrap();
        let c = registry.insert(None, EventKind::Tick, 10, None, noop()).unwrap();
        let d = registry.insert(None, EventKind::Tick, -3, None, noop()).unwrap();

        let snapshot = registry.subscribers_for(EventKind::Tick);
        let keys: Vec<_> = snapshot.iter().map(|s| s.key()).collect();
        assert_eq!(keys, vec![d, b, a, c]);
        assert_eq!(priorities(&snapshot), vec![-3, 5, 10, 10]);
    }

    #[test]
    fn test_kinds_are_separate() {
        let registry = Registry::new();
        registry.insert(None, EventKind::Tick, 0, None, noop()).unwrap();
        registry.insert(None, EventKind::WorldLoad, 0, None, noop()).unwrap();
        registry.insert(None, EventKind::WorldLoad, 0, None, noop()).unwrap();

        assert_eq!(registry.len(EventKind::Tick), 1);
        assert_eq!(registry.len(EventKind::WorldLoad), 2);
        assert_eq!(registry.len(EventKind::EntityJoin), 0);
        assert_eq!(registry.total(), 3);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let registry = Registry::new();
        let key = registry.insert(None, EventKind::EntityLeave, 0, None, noop()).unwrap();

        assert!(registry.contains(key));
        assert!(registry.remove(key));
        assert!(!registry.remove(key));
        assert!(!registry.contains(key));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_snapshot_unaffected_by_later_mutation() {
        let registry = Registry::new();
        let first = registry.insert(None, EventKind::Tick, 0, None, noop()).unwrap();

        let snapshot = registry.subscribers_for(EventKind::Tick);
        registry.insert(None, EventKind::Tick, 0, None, noop()).unwrap();
        registry.remove(first);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].key(), first);
        assert_eq!(registry.len(EventKind::Tick), 1);
    }

    #[test]
    fn test_closed_registry_refuses_inserts() {
        let registry = Registry::new();
        registry.insert(None, EventKind::Tick, 0, None, noop()).unwrap();

        assert_eq!(registry.close(), 1);
        assert!(registry.is_closed());
        assert!(registry.insert(None, EventKind::Tick, 0, None, noop()).is_none());
        assert!(registry.is_empty());
        assert!(registry.subscribers_for(EventKind::Tick).is_empty());
    }

    #[test]
    fn test_close_races_with_inserts() {
        let registry = Arc::new(Registry::new());
        let barrier = Arc::new(std::sync::Barrier::new(2));

        let inserter = {
            let registry = registry.clone();
            let barrier = barrier.clone();
            std::thread::spawn(move || {
                barrier.wait();
                (0..1000)
                    .filter_map(|_| registry.insert(None, EventKind::Tick, 0, None, noop()))
                    .count()
            })
        };
        barrier.wait();
        let removed = registry.close();
        let accepted = inserter.join().unwrap();

        // Whatever got in before the close was removed by it
        assert_eq!(removed, accepted);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_clear() {
        let registry = Registry::new();
        let key = registry.insert(Some("test"), EventKind::Tick, 0, None, noop()).unwrap();
        registry.insert(None, EventKind::ReceivePacket, 0, None, noop()).unwrap();

        assert_eq!(registry.clear(), 2);
        assert!(registry.is_empty());
        assert!(!registry.remove(key));
        assert!(registry.subscribers_for(EventKind::Tick).is_empty());
    }
}
