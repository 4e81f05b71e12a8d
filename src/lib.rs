//! A thread safe hash map which remembers the order its keys were inserted in.
//!
//! [`SyncMap`] is an unholy union of a [`HashMap`](std::collections::HashMap)
//! and a Vec-backed doubly-linked list, guarded by a single reader/writer
//! lock. Lookups, upserts and deletes are O(1), deleting from the middle of
//! the insertion order included, and the whole map can be walked either in
//! hash order or in insertion order.
//!
//! ```
//! use ordered_sync_map::SyncMap;
//!
//! let map = SyncMap::new();
//! map.put("a", 1);
//! map.put("b", 2);
//! map.put("a", 3);
//!
//! let mut entries = Vec::new();
//! map.ordered_range(|k, v| entries.push((*k, *v)));
//! assert_eq!(vec![("a", 3), ("b", 2)], entries);
//!
//! assert_eq!(Some(2), map.get_and_delete("b"));
//! assert_eq!(1, map.len());
//! ```
//!
//! Range callbacks run with the lock held and must never call back into the
//! map they are ranging over, or they will deadlock.

mod error;
mod linked_list;
mod ordered_map;
mod reentrancy;
mod sync_map;

pub use error::ReentrancyError;
pub use sync_map::SyncMap;
