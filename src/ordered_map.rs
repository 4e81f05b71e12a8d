use crate::linked_list::{Iter, LinkedList, NodeHandle};
use std::{
    borrow::Borrow,
    collections::{hash_map::RandomState, HashMap},
    hash::{BuildHasher, Hash},
    mem,
};

/// A [`HashMap`] from keys to handles into a [`LinkedList`] of entries, so
/// entries can be looked up by key and walked in insertion order.
///
/// Every key in `index` has exactly one live node in `sequence` whose key is
/// equal to it, and the other way around. Nothing in here is synchronized;
/// [`SyncMap`](crate::SyncMap) puts the whole thing behind one lock.
pub(crate) struct OrderedMap<K, V, S = RandomState> {
    index: HashMap<K, NodeHandle, S>,
    sequence: LinkedList<(K, V)>,
}

impl<K, V> OrderedMap<K, V, RandomState> {
    #[cfg(test)]
    pub(crate) fn new() -> Self {
        Self::with_capacity_and_hasher(0, Default::default())
    }
}

impl<K, V, S> OrderedMap<K, V, S> {
    pub(crate) fn with_capacity_and_hasher(
        capacity: usize,
        hash_builder: S,
    ) -> Self {
        Self {
            index: HashMap::with_capacity_and_hasher(capacity, hash_builder),
            sequence: LinkedList::with_capacity(capacity),
        }
    }

    pub(crate) fn len(&self) -> usize {
        debug_assert_eq!(self.index.len(), self.sequence.len());
        self.sequence.len()
    }

    /// Entries in insertion order, oldest first.
    pub(crate) fn iter(&self) -> Entries<'_, K, V> {
        Entries(self.sequence.iter_from_back())
    }

    /// Entries in reverse insertion order, newest first.
    pub(crate) fn iter_rev(&self) -> Entries<'_, K, V> {
        Entries(self.sequence.iter_from_front())
    }

    /// Visits every entry in whatever order the index happens to hold them.
    pub(crate) fn for_each_unordered<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        for (k, node) in &self.index {
            if let Some((_, v)) = self.sequence.get(*node) {
                f(k, v);
            }
        }
    }

    /// Drops every entry. The allocations are kept around.
    pub(crate) fn clear(&mut self) {
        self.index.clear();
        self.sequence.clear();

        #[cfg(test)]
        {
            assert_eq!(0, self.len());
            assert_eq!(0, self.sequence.iter_from_front().count());
            assert_eq!(0, self.sequence.iter_from_back().count());
        }
    }
}

impl<K, V, S> OrderedMap<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    pub(crate) fn get<Q>(&self, k: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let node = self.index.get(k)?;
        self.sequence.get(*node).map(|(_, v)| v)
    }

    pub(crate) fn contains_key<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(k)
    }

    /// Inserts a value, returning the previous value at that key. A key that
    /// is already present keeps its place in the sequence; only a new key is
    /// pushed to the front.
    pub(crate) fn insert(&mut self, k: K, v: V) -> Option<V> {
        #[cfg(test)]
        let original_len = self.len();

        if let Some(node) = self.index.get(&k) {
            let previous = self
                .sequence
                .get_mut(*node)
                .map(|(_, slot)| mem::replace(slot, v));
            debug_assert!(previous.is_some(), "index points at a dead node");

            #[cfg(test)]
            {
                assert_eq!(original_len, self.len());
                self.continuity_test();
            }

            return previous;
        }

        let node = self.sequence.push_front((k.clone(), v));
        self.index.insert(k, node);

        #[cfg(test)]
        {
            assert_eq!(original_len + 1, self.len());
            self.continuity_test();
        }

        None
    }

    /// Unlinks the entry at `k`, returning its value.
    pub(crate) fn remove<Q>(&mut self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        #[cfg(test)]
        let original_len = self.len();

        let node = self.index.remove(k)?;
        let removed = self.sequence.remove(node).map(|(_, v)| v);
        debug_assert!(removed.is_some(), "index points at a dead node");

        #[cfg(test)]
        {
            assert_eq!(original_len - 1, self.len());
            self.continuity_test();
        }

        removed
    }

    #[cfg(test)]
    fn continuity_test(&self) {
        assert_eq!(self.index.len(), self.sequence.len());

        // walk the list both ways and make sure it matches the number of
        // elements in the map
        let mut count = 0;
        for (k, _) in self.iter() {
            count += 1;
            assert!(count <= self.len());

            // and that every node is the one its key is indexed to
            let node = self.index.get(k).copied();
            assert!(node.is_some());
            assert!(self.sequence.get(node.unwrap()).unwrap().0 == *k);
        }
        assert_eq!(self.len(), count);

        assert_eq!(self.len(), self.iter_rev().count());
    }
}

/// Borrowing walk over the entries of an [`OrderedMap`].
pub(crate) struct Entries<'a, K, V>(Iter<'a, (K, V)>);

impl<'a, K, V> Iterator for Entries<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Entries<'_, K, V> {}
