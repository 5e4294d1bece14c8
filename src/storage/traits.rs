//! Page cache trait and error types
//!
//! This module defines the trait interface for raw page caches and
//! associated error types.

use thiserror::Error;

/// Errors that can occur during cache operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Cache entry already exists: {0}")]
    AlreadyCached(String),

    #[error("Invalid cache key: {0:?}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for cache operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for raw page caches
///
/// Entries are write-once: the presence of an entry is the only record that
/// a page has already been fetched, and entries never expire.
pub trait PageCache {
    /// Returns the cached bytes for `key`
    ///
    /// # Returns
    ///
    /// * `Some(bytes)` - The page was cached earlier
    /// * `None` - No entry, or the entry could not be read
    fn lookup(&self, key: &str) -> Option<Vec<u8>>;

    /// Stores the raw bytes of a page under `key`
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Entry written
    /// * `Err(StorageError::AlreadyCached)` - An entry already exists
    /// * `Err(StorageError)` - The entry could not be written
    fn store(&self, key: &str, bytes: &[u8]) -> StorageResult<()>;
}
