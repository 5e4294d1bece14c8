//! Cache-or-fetch access to chapter pages
//!
//! The page store is the only component that talks to both the page cache
//! and the network. A page is requested at most once: the first successful
//! response is cached and every later lookup is served from disk, across
//! runs as well.

use crate::config::{CacheKeyStrategy, SpiderConfig};
use crate::crawler::fetcher::fetch_page;
use crate::crawler::parser::ParsedPage;
use crate::storage::{DiskCache, PageCache};
use crate::url::{last_path_segment, page_url};
use crate::SpiderError;
use scraper::Html;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use url::Url;

/// Parses raw page bytes into a document
///
/// # Returns
///
/// * `Ok(ParsedPage)` - The document
/// * `Err(SpiderError::HtmlParse)` - The bytes are not UTF-8 text
pub fn parse_page(url: &str, bytes: Vec<u8>) -> Result<ParsedPage, SpiderError> {
    let text = String::from_utf8(bytes).map_err(|e| SpiderError::HtmlParse {
        url: url.to_string(),
        message: format!("page is not valid UTF-8: {}", e),
    })?;

    Ok(Html::parse_document(&text))
}

/// Resolves page URLs to parsed documents, fetching on cache misses
pub struct PageStore<C: PageCache = DiskCache> {
    cache: C,
    scheme: String,
    headers: BTreeMap<String, String>,
    key_strategy: CacheKeyStrategy,
    /// Cache keys handed out during this run, with the URL that owns each
    claimed: HashMap<String, String>,
}

impl PageStore<DiskCache> {
    /// Creates a store over the book's cache directory
    pub fn from_config(config: &SpiderConfig) -> Self {
        Self::new(
            DiskCache::new(config.cache_dir()),
            config.scheme(),
            config.headers().clone(),
            config.cache_key(),
        )
    }
}

impl<C: PageCache> PageStore<C> {
    /// Creates a store
    ///
    /// # Arguments
    ///
    /// * `cache` - Where raw pages are kept
    /// * `scheme` - Scheme for URLs given without one
    /// * `headers` - Custom headers sent with every request
    /// * `key_strategy` - How cache entries are named
    pub fn new(
        cache: C,
        scheme: &str,
        headers: BTreeMap<String, String>,
        key_strategy: CacheKeyStrategy,
    ) -> Self {
        Self {
            cache,
            scheme: scheme.to_string(),
            headers,
            key_strategy,
            claimed: HashMap::new(),
        }
    }

    /// The underlying page cache
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Cache key of an absolute URL under this store's strategy
    pub fn cache_key(&self, url: &Url) -> String {
        match self.key_strategy {
            CacheKeyStrategy::LastSegment => last_path_segment(url.as_str()),
            CacheKeyStrategy::UrlHash => hex::encode(Sha256::digest(url.as_str().as_bytes())),
        }
    }

    /// Returns the parsed page at `url`, from cache when possible
    ///
    /// # Resolution Flow
    ///
    /// 1. Prepend the default scheme if `url` has none
    /// 2. Derive the cache key; fail if another URL already used it this run
    /// 3. Cache hit → parse the cached bytes
    /// 4. Cache miss → GET; any status but 200 fails without caching,
    ///    otherwise the body is cached and parsed
    ///
    /// # Returns
    ///
    /// * `Ok(ParsedPage)` - The document
    /// * `Err(SpiderError)` - `Url`, `CacheCollision`, `Network`,
    ///   `BadStatus`, `Storage` or `HtmlParse`
    pub async fn resolve(&mut self, url: &str) -> Result<ParsedPage, SpiderError> {
        let url = page_url(url, &self.scheme)?;
        let key = self.cache_key(&url);
        self.claim(&key, &url)?;

        if let Some(bytes) = self.cache.lookup(&key) {
            tracing::info!("Using cache of {}: {}", url, key);
            return parse_page(url.as_str(), bytes);
        }

        tracing::info!("Sending request: {}", url);
        let fetched = fetch_page(url.as_str(), &self.headers).await?;

        if fetched.status != 200 {
            return Err(SpiderError::BadStatus {
                url: url.to_string(),
                status: fetched.status,
            });
        }

        self.cache.store(&key, &fetched.body)?;
        parse_page(url.as_str(), fetched.body)
    }

    /// Records that `key` belongs to `url` for the rest of the run
    fn claim(&mut self, key: &str, url: &Url) -> Result<(), SpiderError> {
        match self.claimed.get(key) {
            Some(owner) if owner != url.as_str() => Err(SpiderError::CacheCollision {
                key: key.to_string(),
                cached_url: owner.clone(),
                requested_url: url.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                self.claimed.insert(key.to_string(), url.to_string());
                Ok(())
            }
        }
    }
}
