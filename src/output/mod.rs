//! Output module for the assembled book text
//!
//! Chapters are appended to `<dest>/<book>.txt` in traversal order as
//! plain-text blocks separated by blank lines.

mod text;

pub use text::{format_chapter, ChapterWriter};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to write chapter {index}: {source}")]
    Write { index: u32, source: std::io::Error },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
