//! Error types for the index and the sample cache.

use thiserror::Error;

/// Structural errors raised by [`OrderedIndex`](crate::OrderedIndex) and
/// [`IntervalIndex`](crate::IntervalIndex).
///
/// Misses are not errors: lookups and removals return `None`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexError {
    #[error("Key is already present in the index")]
    DuplicateKey,
    #[error("Index has never held a key")]
    Empty,
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Duplicate sample for '{entity}' at t={timestamp}")]
    DuplicateTimestamp { entity: String, timestamp: f64 },
    #[error("Invalid timestamp {0}: must be finite")]
    InvalidTimestamp(f64),
    #[error("Index error: {0}")]
    Index(#[from] IndexError),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, CacheError>;
