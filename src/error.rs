//! Error types.

use std::fmt;

/// Returned by [`ChainHashMap::at`](crate::ChainHashMap::at) when the key is absent.
/// The failed lookup leaves the map untouched.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct OutOfRange;

impl fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("key not found")
    }
}

impl std::error::Error for OutOfRange {}

/// Returned by [`ChainHashMap::try_insert`](crate::ChainHashMap::try_insert).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InsertError {
    /// The key was already present; the stored value was kept.
    DuplicateKey,
}

impl fmt::Display for InsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertError::DuplicateKey => f.write_str("duplicate key"),
        }
    }
}

impl std::error::Error for InsertError {}
