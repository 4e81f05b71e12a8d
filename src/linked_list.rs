//! A linked list that flattens all its nodes onto a Vec for storage, gaining
//! data locality and O(1) removal of any node whose handle is known.

/// The index of a node in the linked list's storage vec.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct NodeHandle(usize);

/// A node that lives in a linked list.
struct Node<T> {
    /// The value being stored. `None` while the slot sits on the freelist.
    value: Option<T>,

    /// The node pushed right after this one, towards the front.
    prev: NodeHandle,

    /// The node pushed right before this one, towards the back.
    next: NodeHandle,
}

/// A circular doubly-linked list living in a single contiguous Vec of nodes,
/// which are addressed by their position in the Vec. Removed slots are
/// freelisted and reused by later pushes. There is no compaction: the store
/// stays at its high-water mark until the list is cleared.
///
/// New nodes always go in at the front. The back of the list is reachable
/// from the front in one hop (`head.prev`), so walking the list from either
/// end costs the same.
///
/// Handles are leaked to the owner of the list on purpose. [`OrderedMap`]
/// keeps the handle of every entry in its index so it can unlink an entry
/// without scanning for it.
///
/// [`OrderedMap`]: crate::ordered_map::OrderedMap
pub(crate) struct LinkedList<T> {
    /// The nodes in the list.
    store: Vec<Node<T>>,

    /// Entries in the list which aren't in use anymore. These will be reused.
    free: Vec<NodeHandle>,

    /// The front node in the list, which is the most recently pushed one.
    head: Option<NodeHandle>,
}

impl<T> LinkedList<T> {
    /// Creates a new linked list with a specific capacity.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            store: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
        }
    }

    /// The length of this linked list.
    pub(crate) fn len(&self) -> usize {
        self.store.len() - self.free.len()
    }

    /// Gets an element from the list.
    pub(crate) fn get(&self, node: NodeHandle) -> Option<&T> {
        self.store.get(node.0).and_then(|n| n.value.as_ref())
    }

    pub(crate) fn get_mut(&mut self, node: NodeHandle) -> Option<&mut T> {
        self.store.get_mut(node.0).and_then(|n| n.value.as_mut())
    }

    /// Pushes t onto the front of the list and returns a handle to the node.
    pub(crate) fn push_front(&mut self, t: T) -> NodeHandle {
        // use the first available location in the storage vec, or infer what
        // the next location will be on push.
        let idx = self
            .free
            .pop()
            .unwrap_or_else(|| NodeHandle(self.store.len()));

        // a lone node links to itself
        let mut n = Node {
            value: Some(t),
            prev: idx,
            next: idx,
        };

        if let Some(head) = self.head {
            // splice in between the back node and the current head
            n.prev = self.store[head.0].prev;
            n.next = head;

            self.store[n.prev.0].next = idx;
            self.store[head.0].prev = idx;
        }

        self.head = Some(idx);

        if self.store.len() <= idx.0 {
            self.store.push(n);
        } else {
            self.store[idx.0] = n;
        }

        idx
    }

    /// Removes an arbitrary node from the list, returning its value. Returns
    /// `None` if the handle doesn't point at a live node.
    pub(crate) fn remove(&mut self, node: NodeHandle) -> Option<T> {
        let value = self.store.get_mut(node.0)?.value.take()?;

        if self.len() == 1 {
            // just reset head and freelist the node
            self.head = None;
        } else {
            let prev = self.store[node.0].prev;
            let next = self.store[node.0].next;

            if self.head == Some(node) {
                self.head = Some(next);
            }

            // link prev to next and next to prev so node doesn't exist in the
            // chain anymore; it'll get overwritten at some later push by
            // placing its handle on the freelist
            self.store[prev.0].next = next;
            self.store[next.0].prev = prev;
        }

        self.free.push(node);

        Some(value)
    }

    /// Walks the list from the front (newest) to the back (oldest).
    pub(crate) fn iter_from_front(&self) -> Iter<'_, T> {
        Iter {
            store: &self.store,
            cursor: self.head,
            remaining: self.len(),
            towards_back: true,
        }
    }

    /// Walks the list from the back (oldest) to the front (newest).
    pub(crate) fn iter_from_back(&self) -> Iter<'_, T> {
        Iter {
            store: &self.store,
            cursor: self.head.map(|head| self.store[head.0].prev),
            remaining: self.len(),
            towards_back: false,
        }
    }

    /// Clears this linked list. Does not free the underlying buffers.
    pub(crate) fn clear(&mut self) {
        self.store.clear();
        self.free.clear();
        self.head = None;
    }
}

/// Borrowing walk over a [`LinkedList`] in either direction. The list is
/// circular, so the walk is bounded by the number of live nodes rather than by
/// running off the end.
pub(crate) struct Iter<'a, T> {
    store: &'a [Node<T>],
    cursor: Option<NodeHandle>,
    remaining: usize,
    towards_back: bool,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let node = &self.store[self.cursor?.0];
        self.cursor = Some(if self.towards_back {
            node.next
        } else {
            node.prev
        });
        self.remaining -= 1;

        debug_assert!(node.value.is_some(), "walked onto a freelisted node");
        node.value.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
