//! Error types for tree operations.

use thiserror::Error;

/// Errors reported by [`AneTree`](crate::AneTree) operations.
///
/// Every error is local to the failing call: the tree is left exactly as it
/// was before the operation started.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AneError {
    /// Insert without replace hit a key that is already stored.
    #[error("key already present in tree")]
    DuplicateKey,

    /// Lookup or removal of a key that is not stored.
    #[error("key not found")]
    NotFound,

    /// The placement hasher returned a slot outside `0..order`.
    #[error("hasher returned slot {slot} at level {level}, but order is {order}")]
    InvalidHashResult {
        slot: usize,
        order: usize,
        level: usize,
    },
}

/// Result type for tree operations.
pub type Result<T> = std::result::Result<T, AneError>;
