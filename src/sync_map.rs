use parking_lot::RwLock;
use std::{
    borrow::Borrow,
    collections::hash_map::RandomState,
    fmt,
    hash::{BuildHasher, Hash},
};
use tracing::{debug, trace};

use crate::{ordered_map::OrderedMap, reentrancy};

/// A hash map which is safe to share across threads and remembers the order
/// its keys were first inserted in.
///
/// Every operation takes the one lock guarding the map: lookups, `len` and
/// ranges in read mode, everything that mutates in write mode. Operations are
/// therefore linearizable, and the index and the insertion-order list can
/// never be observed disagreeing with each other.
///
/// # Deadlocks
///
/// The range callbacks run while the read lock is held. A callback must not
/// call *any* method of the map it is ranging over: the lock is not reentrant,
/// and a write from inside the callback waits forever for a read lock that is
/// waiting on the callback. Enable the `reentrancy_check` feature to turn
/// that hang into a panic while debugging.
///
/// To share a map between threads, wrap it in an [`Arc`](std::sync::Arc).
pub struct SyncMap<K, V, S = RandomState> {
    inner: RwLock<OrderedMap<K, V, S>>,
}

impl<K, V> SyncMap<K, V, RandomState> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::with_capacity_and_hasher(0, Default::default())
    }

    /// Creates an empty map with room for `capacity` entries before it has to
    /// reallocate.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, Default::default())
    }
}

impl<K, V, S> SyncMap<K, V, S> {
    /// Creates an empty map which hashes its keys with `hash_builder`.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(0, hash_builder)
    }

    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        if capacity > 0 {
            debug!(capacity, "preallocating ordered map");
        }

        Self {
            inner: RwLock::new(OrderedMap::with_capacity_and_hasher(
                capacity,
                hash_builder,
            )),
        }
    }

    /// Calls `visit` once for every entry, in no particular order. The order
    /// can differ between calls.
    ///
    /// `visit` must not call back into this map; see the type-level docs.
    pub fn unordered_range<F>(&self, visit: F)
    where
        F: FnMut(&K, &V),
    {
        reentrancy::check(self.id(), "unordered_range");
        let inner = self.inner.read();
        let _traversal = reentrancy::Traversal::enter(self.id());

        inner.for_each_unordered(visit);
    }

    /// Calls `visit` once for every entry in insertion order: the key which
    /// has been in the map the longest comes first. Overwriting a value
    /// doesn't move its key.
    ///
    /// This is a straight walk down a linked list, which is considerably
    /// cheaper per entry than [`unordered_range`](Self::unordered_range).
    ///
    /// `visit` must not call back into this map; see the type-level docs.
    pub fn ordered_range<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &V),
    {
        reentrancy::check(self.id(), "ordered_range");
        let inner = self.inner.read();
        let _traversal = reentrancy::Traversal::enter(self.id());

        for (k, v) in inner.iter() {
            visit(k, v);
        }
    }

    /// Like [`ordered_range`](Self::ordered_range), but the most recently
    /// inserted key comes first.
    pub fn ordered_range_rev<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &V),
    {
        reentrancy::check(self.id(), "ordered_range_rev");
        let inner = self.inner.read();
        let _traversal = reentrancy::Traversal::enter(self.id());

        for (k, v) in inner.iter_rev() {
            visit(k, v);
        }
    }

    /// The number of entries in the map right now.
    pub fn len(&self) -> usize {
        reentrancy::check(self.id(), "len");
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every entry. Allocated capacity is kept.
    pub fn clear(&self) {
        reentrancy::check(self.id(), "clear");
        let mut inner = self.inner.write();
        debug!(len = inner.len(), "clearing ordered map");
        inner.clear();
    }

    fn id(&self) -> usize {
        self as *const Self as usize
    }
}

impl<K, V, S> SyncMap<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    /// Sets the value for `k`. A new key goes after every key already in the
    /// map; an existing key has its value replaced, even by an equal value,
    /// and keeps its position.
    pub fn put(&self, k: K, v: V) {
        reentrancy::check(self.id(), "put");
        let mut inner = self.inner.write();

        if inner.insert(k, v).is_some() {
            trace!(len = inner.len(), "overwrote entry");
        } else {
            trace!(len = inner.len(), "inserted entry");
        }
    }

    /// Removes `k` from the map. Returns whether it was there.
    pub fn delete<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry("delete", k).is_some()
    }

    /// Removes `k` from the map, returning the value that was stored for it.
    pub fn get_and_delete<Q>(&self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry("get_and_delete", k)
    }

    /// Whether `k` is in the map right now.
    pub fn contains_key<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        reentrancy::check(self.id(), "contains_key");
        self.inner.read().contains_key(k)
    }

    fn remove_entry<Q>(&self, operation: &'static str, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        reentrancy::check(self.id(), operation);
        let mut inner = self.inner.write();

        let removed = inner.remove(k);
        if removed.is_some() {
            trace!(operation, len = inner.len(), "unlinked entry");
        }

        removed
    }
}

impl<K, V, S> SyncMap<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher,
{
    /// Gets a clone of the value stored for `k`, so the lock is released
    /// before the caller gets to look at it.
    pub fn get<Q>(&self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        reentrancy::check(self.id(), "get");
        self.inner.read().get(k).cloned()
    }

    /// Stores `v` for `k` in one critical section and reports whether `k`
    /// was already present.
    ///
    /// Despite the name, an existing value is *overwritten*, not kept: this
    /// is an upsert. The returned value is always `v`, and the returned flag
    /// is `true` when an older value was replaced and `false` when `k` was
    /// newly inserted.
    pub fn get_or_put(&self, k: K, v: V) -> (V, bool) {
        reentrancy::check(self.id(), "get_or_put");
        let mut inner = self.inner.write();

        let existed = inner.insert(k, v.clone()).is_some();
        trace!(existed, len = inner.len(), "upserted entry");

        (v, existed)
    }
}

impl<K, V, S> Default for SyncMap<K, V, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<K, V, S> fmt::Debug for SyncMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    /// Prints the entries in insertion order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        reentrancy::check(self.id(), "fmt");
        let inner = self.inner.read();
        // entry Debug impls run under the lock just like range callbacks
        let _traversal = reentrancy::Traversal::enter(self.id());

        f.debug_map().entries(inner.iter()).finish()
    }
}

impl<K, V, S> Extend<(K, V)> for SyncMap<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        // exclusive access already, no need to go through the lock
        let inner = self.inner.get_mut();
        for (k, v) in iter {
            inner.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for SyncMap<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}
