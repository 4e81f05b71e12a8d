//! Opt-in detection of range callbacks calling back into their own map.
//!
//! Every map is identified by its address, which can't change while a range
//! over it is borrowing it. A traversal registers the map with the current
//! thread for as long as the callback runs; every operation checks the
//! registry first.

#[cfg(feature = "reentrancy_check")]
mod imp {
    use crate::error::ReentrancyError;
    use std::cell::RefCell;

    thread_local! {
        static TRAVERSING: RefCell<Vec<usize>> = RefCell::new(Vec::new());
    }

    pub(crate) fn check(map: usize, operation: &'static str) {
        let reentered = TRAVERSING
            .try_with(|maps| maps.borrow().contains(&map))
            .unwrap_or(false);

        if reentered {
            let err = ReentrancyError { operation };
            tracing::error!(operation, "map re-entered from a range callback");
            panic!("{}", err);
        }
    }

    /// Keeps a map registered as being traversed until dropped, including
    /// when the callback unwinds.
    pub(crate) struct Traversal(usize);

    impl Traversal {
        pub(crate) fn enter(map: usize) -> Self {
            let _ = TRAVERSING.try_with(|maps| maps.borrow_mut().push(map));
            Traversal(map)
        }
    }

    impl Drop for Traversal {
        fn drop(&mut self) {
            let _ = TRAVERSING.try_with(|maps| {
                let mut maps = maps.borrow_mut();
                if let Some(pos) = maps.iter().rposition(|m| *m == self.0) {
                    maps.swap_remove(pos);
                }
            });
        }
    }
}

#[cfg(not(feature = "reentrancy_check"))]
mod imp {
    #[inline(always)]
    pub(crate) fn check(_map: usize, _operation: &'static str) {}

    pub(crate) struct Traversal;

    impl Traversal {
        #[inline(always)]
        pub(crate) fn enter(_map: usize) -> Self {
            Traversal
        }
    }
}

pub(crate) use imp::{check, Traversal};

#[cfg(all(test, feature = "reentrancy_check"))]
mod tests {
    use super::{check, Traversal};

    #[test]
    fn test_unregistered_map_passes() {
        check(1, "get");
        {
            let _t = Traversal::enter(2);
            check(1, "get");
        }
        check(2, "get");
    }

    #[test]
    #[should_panic(expected = "inside one of its own range callbacks")]
    fn test_registered_map_panics() {
        let _t = Traversal::enter(3);
        check(3, "put");
    }

    /// Maps ranged over from a thread-local destructor may outlive the
    /// registry itself; that must not abort the thread.
    #[test]
    fn test_traversal_during_thread_teardown() {
        struct RangesOnDrop;

        impl Drop for RangesOnDrop {
            fn drop(&mut self) {
                check(5, "ordered_range");
                let _t = Traversal::enter(5);
            }
        }

        thread_local! {
            static LATE: RangesOnDrop = RangesOnDrop;
        }

        let handle = std::thread::spawn(|| {
            // both thread-locals are live when the thread exits
            check(6, "len");
            LATE.with(|_| {});
        });
        assert!(handle.join().is_ok());
    }

    #[test]
    fn test_nested_traversals_of_same_map() {
        let outer = Traversal::enter(4);
        let inner = Traversal::enter(4);
        drop(inner);

        let still_registered = std::panic::catch_unwind(|| check(4, "len"));
        assert!(still_registered.is_err());

        drop(outer);
        check(4, "len");
    }
}
