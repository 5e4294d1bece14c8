use serde::Deserialize;
use std::collections::BTreeMap;

/// Main configuration structure for Novel-Spider
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub book: BookConfig,
    pub paths: PathsConfig,
    #[serde(default)]
    pub request: RequestConfig,
    pub selectors: SelectorConfig,
}

/// The book to download
#[derive(Debug, Clone, Deserialize)]
pub struct BookConfig {
    /// Name of the book; used for the output file and the cache directory
    pub name: String,

    /// URL of the first chapter to download, scheme optional
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Index given to the first downloaded chapter
    #[serde(rename = "start-index", default = "default_start_index")]
    pub start_index: u32,
}

/// Filesystem locations
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Directory receiving `<book>.txt`
    pub dest: String,

    /// Root of the page cache; pages land in `<cache>/<book>/`
    pub cache: String,

    /// How cache file names are derived from page URLs
    #[serde(rename = "cache-key", default)]
    pub cache_key: CacheKeyStrategy,
}

/// Request behavior
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestConfig {
    /// Seconds to wait between two chapters
    #[serde(rename = "wait-secs", default)]
    pub wait_secs: u64,

    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// CSS selectors locating the chapter parts on a page
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorConfig {
    /// Element holding the chapter title
    pub title: String,

    /// Element holding the chapter text
    pub content: String,

    /// Anchor pointing at the next chapter
    #[serde(rename = "next-link")]
    pub next_link: String,
}

/// Strategy for naming cache entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheKeyStrategy {
    /// Last path segment of the URL (e.g. `12.html`); distinct URLs sharing
    /// a file name collide
    #[default]
    LastSegment,

    /// Hex SHA-256 of the full URL
    UrlHash,
}

fn default_start_index() -> u32 {
    1
}
