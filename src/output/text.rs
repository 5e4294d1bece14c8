//! Append-only chapter text file

use crate::output::{OutputError, OutputResult};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Formats one chapter block
///
/// # Examples
///
/// ```
/// use novel_spider::output::format_chapter;
///
/// assert_eq!(
///     format_chapter(3, "The Gate", "It was open."),
///     "Chapter 3 The Gate\n\nIt was open.\n\n"
/// );
/// ```
pub fn format_chapter(index: u32, title: &str, content: &str) -> String {
    format!("Chapter {} {}\n\n{}\n\n", index, title, content)
}

/// Append-only writer for the book's text file
///
/// The file is opened once per run and closed when the writer is dropped,
/// on every exit path.
#[derive(Debug)]
pub struct ChapterWriter {
    file: File,
    path: PathBuf,
}

impl ChapterWriter {
    /// Opens `path` for appending, creating it if absent
    ///
    /// # Returns
    ///
    /// * `Ok(ChapterWriter)` - File ready for appending
    /// * `Err(OutputError::Open)` - The file could not be opened
    pub fn open(path: &Path) -> OutputResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| OutputError::Open {
                path: path.display().to_string(),
                source,
            })?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Path of the output file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one chapter and syncs it to disk
    ///
    /// Each chapter is synced before the next page is requested, so an
    /// aborted run keeps every chapter it reported as done.
    pub fn write_chapter(&mut self, index: u32, title: &str, content: &str) -> OutputResult<()> {
        let block = format_chapter(index, title, content);
        self.file
            .write_all(block.as_bytes())
            .and_then(|_| self.file.sync_data())
            .map_err(|source| OutputError::Write { index, source })
    }

    /// Flushes and closes the file
    pub fn close(self) -> OutputResult<()> {
        self.file.sync_all()?;
        Ok(())
    }
}
