//! On-disk page cache
//!
//! One file per page, named by the cache key, inside the book's cache
//! directory. Files are written to a `.part` sibling first and renamed into
//! place, so a crash mid-write never leaves a truncated entry behind.

use crate::storage::traits::{PageCache, StorageError, StorageResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Page cache backed by a directory of raw page files
#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
}

impl DiskCache {
    /// Creates a cache rooted at `dir`; the directory is not created yet
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory holding the cache entries
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the cache directory (and its parents) if missing
    pub fn ensure_dir(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Returns the file path for `key`
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Path of the entry inside the cache directory
    /// * `Err(StorageError::InvalidKey)` - The key would escape the directory
    pub fn entry_path(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(key))
    }

    /// Returns true if an entry exists for `key`
    pub fn contains(&self, key: &str) -> bool {
        self.entry_path(key)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }
}

impl PageCache for DiskCache {
    fn lookup(&self, key: &str) -> Option<Vec<u8>> {
        let path = match self.entry_path(key) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("Skipping cache lookup: {}", e);
                return None;
            }
        };

        match fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!("Failed to open cache file {}: {}", path.display(), e);
                None
            }
        }
    }

    fn store(&self, key: &str, bytes: &[u8]) -> StorageResult<()> {
        let path = self.entry_path(key)?;
        if path.exists() {
            return Err(StorageError::AlreadyCached(key.to_string()));
        }

        let partial = self.dir.join(format!(".{}.part", key));
        fs::write(&partial, bytes)?;
        if let Err(e) = fs::rename(&partial, &path) {
            let _ = fs::remove_file(&partial);
            return Err(e.into());
        }

        tracing::debug!("Cached {} bytes at {}", bytes.len(), path.display());
        Ok(())
    }
}

/// Rejects keys that are empty or could resolve outside the cache directory
fn validate_key(key: &str) -> StorageResult<()> {
    let escapes = key.is_empty()
        || key == "."
        || key == ".."
        || key.contains(|c: char| matches!(c, '/' | '\\' | '\0'));

    if escapes {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}
