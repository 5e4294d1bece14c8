//! Crawler module for chapter fetching and traversal
//!
//! This module contains the core spider logic, including:
//! - HTTP fetching with custom headers
//! - Cache-or-fetch page resolution
//! - Pluggable chapter extraction
//! - The chapter-by-chapter traversal loop

mod coordinator;
mod fetcher;
mod page_store;
mod parser;

pub use coordinator::{Cursor, RunSummary, Spider};
pub use fetcher::{build_http_client, fetch_page, header_map, FetchedPage};
pub use page_store::{parse_page, PageStore};
pub use parser::{ChapterField, ChapterParser, ExtractError, ParsedPage, SelectorParser};

use crate::config::SpiderConfig;
use crate::SpiderError;

/// Downloads a complete book
///
/// This is the main entry point for a one-shot download. It will:
/// 1. Create the cache and destination directories
/// 2. Open `<dest>/<book>.txt` for appending
/// 3. Walk the chapters from the configured start URL and index
/// 4. Stop once the parser reports no next chapter
///
/// # Arguments
///
/// * `config` - The book settings
/// * `parser` - Extraction rules for the target site
///
/// # Returns
///
/// * `Ok(RunSummary)` - The book was downloaded to its last chapter
/// * `Err(SpiderError::Aborted)` - A chapter failed
pub async fn crawl<P: ChapterParser>(
    config: SpiderConfig,
    parser: P,
) -> Result<RunSummary, SpiderError> {
    Spider::new(config, parser).run().await
}
