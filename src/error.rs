use thiserror::Error;

/// A map was called from inside one of its own range callbacks.
///
/// The lock is held for the whole traversal and is not reentrant, so such a
/// call would block forever. With the `reentrancy_check` feature enabled the
/// map panics with this error's message instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error(
    "`{operation}` called on a map from inside one of its own range \
     callbacks, which would deadlock"
)]
pub struct ReentrancyError {
    /// The operation that re-entered the map.
    pub operation: &'static str,
}
