//! Novel-Spider: a polite chapter-by-chapter novel downloader
//!
//! This crate follows the "next chapter" links of a web-serialized novel,
//! caching every raw page on disk and appending the extracted chapter text
//! to a single output file.

pub mod config;
pub mod crawler;
pub mod output;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Novel-Spider operations
#[derive(Debug, Error)]
pub enum SpiderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP error for {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("Unexpected status {status} for {url}")]
    BadStatus { url: String, status: u16 },

    #[error("HTML parse error for {url}: {message}")]
    HtmlParse { url: String, message: String },

    #[error("Failed to extract chapter {field}: {source}")]
    Extract {
        field: crawler::ChapterField,
        source: crawler::ExtractError,
    },

    #[error("Cache key {key} already holds {cached_url}, refusing to reuse it for {requested_url}")]
    CacheCollision {
        key: String,
        cached_url: String,
        requested_url: String,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Chapter index {0} is the largest possible, cannot go further")]
    IndexOverflow(u32),

    #[error("Chapter {index} URL {url}: {source}; traversal aborted")]
    Aborted {
        index: u32,
        url: String,
        source: Box<SpiderError>,
    },
}

impl SpiderError {
    /// Wraps a step failure with the chapter position it happened at
    pub fn aborted(self, index: u32, url: &str) -> Self {
        SpiderError::Aborted {
            index,
            url: url.to_string(),
            source: Box::new(self),
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),

    #[error("Invalid request header: {0}")]
    InvalidHeader(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Result type alias for Novel-Spider operations
pub type Result<T> = std::result::Result<T, SpiderError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{CacheKeyStrategy, Config, SpiderConfig};
pub use crawler::{ChapterParser, ParsedPage, RunSummary, SelectorParser, Spider};
pub use output::ChapterWriter;
