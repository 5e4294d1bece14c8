//! Storage module for caching raw chapter pages
//!
//! Every fetched page is kept on disk so that re-running a book after a
//! crash or an aborted traversal never requests a completed page twice.

mod disk;
mod traits;

pub use disk::DiskCache;
pub use traits::{PageCache, StorageError, StorageResult};
