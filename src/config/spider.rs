use crate::config::types::{CacheKeyStrategy, Config};
use crate::url::{site_root, split_scheme};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Immutable settings of one book download
///
/// The start URL and site root are stored without a scheme; the scheme is
/// kept separately and used for every scheme-less URL met during the run.
/// The cache directory is always `<cache root>/<book name>`.
#[derive(Debug, Clone)]
pub struct SpiderConfig {
    book_name: String,
    start_url: String,
    scheme: String,
    site_root: String,
    dest_dir: PathBuf,
    cache_dir: PathBuf,
    start_index: u32,
    headers: BTreeMap<String, String>,
    wait: Duration,
    cache_key: CacheKeyStrategy,
}

impl SpiderConfig {
    /// Creates the settings for downloading `book_name` starting at `url`
    ///
    /// # Arguments
    ///
    /// * `book_name` - Name of the book
    /// * `url` - First chapter URL; `http://` is honored, anything else
    ///   scheme-less is fetched over `https://`
    /// * `dest_path` - Directory receiving `<book_name>.txt`
    /// * `cache_root` - Root of the page cache
    /// * `start_index` - Index of the first chapter
    /// * `wait_secs` - Delay between two chapters
    ///
    /// # Example
    ///
    /// ```
    /// use novel_spider::SpiderConfig;
    /// use std::path::Path;
    ///
    /// let config = SpiderConfig::new("Test", "https://www.example.com/book/1.html", "out", "cache", 1, 2);
    /// assert_eq!(config.site_root(), "www.example.com");
    /// assert_eq!(config.start_url(), "www.example.com/book/1.html");
    /// assert_eq!(config.cache_dir(), Path::new("cache/Test"));
    /// ```
    pub fn new(
        book_name: &str,
        url: &str,
        dest_path: impl Into<PathBuf>,
        cache_root: impl AsRef<Path>,
        start_index: u32,
        wait_secs: u64,
    ) -> Self {
        let url = url.trim();
        let (scheme, start_url) = match split_scheme(url) {
            (Some(s), rest) if s.eq_ignore_ascii_case("http") => ("http", rest),
            (Some(s), rest) if s.eq_ignore_ascii_case("https") => ("https", rest),
            _ => ("https", url),
        };

        Self {
            book_name: book_name.to_string(),
            start_url: start_url.to_string(),
            scheme: scheme.to_string(),
            site_root: site_root(start_url).to_string(),
            dest_dir: dest_path.into(),
            cache_dir: cache_root.as_ref().join(book_name),
            start_index,
            headers: BTreeMap::new(),
            wait: Duration::from_secs(wait_secs),
            cache_key: CacheKeyStrategy::default(),
        }
    }

    /// Builds the settings described by a configuration file
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.book.name,
            &config.book.start_url,
            &config.paths.dest,
            &config.paths.cache,
            config.book.start_index,
            config.request.wait_secs,
        )
        .with_headers(config.request.headers.clone())
        .with_cache_key(config.paths.cache_key)
    }

    /// Replaces the custom request headers
    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Adds one custom request header
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// Selects how cache entries are named
    pub fn with_cache_key(mut self, cache_key: CacheKeyStrategy) -> Self {
        self.cache_key = cache_key;
        self
    }

    pub fn book_name(&self) -> &str {
        &self.book_name
    }

    /// First chapter URL, without scheme
    pub fn start_url(&self) -> &str {
        &self.start_url
    }

    /// Scheme used for URLs that carry none
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// `host[:port]` of the start URL
    pub fn site_root(&self) -> &str {
        &self.site_root
    }

    pub fn dest_dir(&self) -> &Path {
        &self.dest_dir
    }

    /// `<dest>/<book name>.txt`
    pub fn output_path(&self) -> PathBuf {
        self.dest_dir.join(format!("{}.txt", self.book_name))
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn start_index(&self) -> u32 {
        self.start_index
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Delay between two chapters
    pub fn wait(&self) -> Duration {
        self.wait
    }

    pub fn cache_key(&self) -> CacheKeyStrategy {
        self.cache_key
    }
}
