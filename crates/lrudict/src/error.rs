//! Error types for lrudict

use std::fmt;

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cache operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Capacity must be a positive number
    InvalidCapacity,

    /// Key not present in the cache
    KeyNotFound,

    /// Operation requires a non-empty cache
    Empty,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidCapacity => write!(f, "capacity should be a positive number"),
            Error::KeyNotFound => write!(f, "key not found"),
            Error::Empty => write!(f, "cache is empty"),
        }
    }
}

impl std::error::Error for Error {}
