//! Spider coordinator - the chapter traversal loop
//!
//! This module contains the main loop that walks a book one chapter at a
//! time:
//! - Resolving the current page through the page store
//! - Extracting title, text and next link with the site's parser
//! - Appending the chapter to the output file
//! - Waiting between chapters and following the next link
//!
//! Chapters form an implicit linked list: the next URL is only known once
//! the current page has been parsed, so there is no frontier and no
//! parallelism.

use crate::config::SpiderConfig;
use crate::crawler::page_store::PageStore;
use crate::crawler::parser::{ChapterField, ChapterParser};
use crate::output::ChapterWriter;
use crate::url::{page_url, resolve_link, with_scheme};
use crate::SpiderError;

/// Position of the traversal: the next page to process and its index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    url: String,
    index: u32,
}

impl Cursor {
    /// URL of the chapter about to be processed
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Index of the chapter about to be processed
    pub fn index(&self) -> u32 {
        self.index
    }

    fn advance(&mut self, next_url: String) -> Result<(), SpiderError> {
        self.index = self
            .index
            .checked_add(1)
            .ok_or(SpiderError::IndexOverflow(self.index))?;
        self.url = next_url;
        Ok(())
    }
}

/// Outcome of a traversal that reached the last chapter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of chapters appended during this run
    pub chapters_written: u32,

    /// Index of the last chapter written
    pub last_index: Option<u32>,

    /// URL of the last chapter written
    pub last_url: Option<String>,
}

/// Downloads one book by following next-chapter links
///
/// # Example
///
/// ```no_run
/// use novel_spider::{SelectorParser, Spider, SpiderConfig};
///
/// # async fn example() -> novel_spider::Result<()> {
/// let config = SpiderConfig::new("Test", "www.example.com/book/1.html", "books", "cache", 1, 1);
/// let parser = SelectorParser::new("h1", "#content", "a#next")?;
///
/// let mut spider = Spider::new(config, parser);
/// let summary = spider.run().await?;
/// println!("{} chapters written", summary.chapters_written);
/// # Ok(())
/// # }
/// ```
pub struct Spider<P> {
    config: SpiderConfig,
    parser: P,
    cursor: Cursor,
}

impl<P: ChapterParser> Spider<P> {
    /// Creates a spider positioned at the configured start chapter
    pub fn new(config: SpiderConfig, parser: P) -> Self {
        let url = match page_url(config.start_url(), config.scheme()) {
            Ok(url) => url.to_string(),
            // Reported by the first resolve
            Err(_) => with_scheme(config.start_url(), config.scheme()),
        };
        let cursor = Cursor {
            url,
            index: config.start_index(),
        };

        Self {
            config,
            parser,
            cursor,
        }
    }

    pub fn config(&self) -> &SpiderConfig {
        &self.config
    }

    /// Where the traversal stands
    ///
    /// After a failed or cancelled run this is the chapter to resume from.
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Runs the traversal until the book ends or a chapter fails
    ///
    /// Every chapter written before a failure stays in the output file and
    /// every fetched page stays cached, so running again from
    /// [`Spider::cursor`] repeats no request.
    ///
    /// The future may be dropped at any await point (a fetch or the wait
    /// between chapters) without leaving partial writes behind.
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - The parser reported no next chapter
    /// * `Err(SpiderError::Aborted)` - Setup or a chapter failed; wraps the
    ///   cause with the chapter index and URL
    pub async fn run(&mut self) -> Result<RunSummary, SpiderError> {
        let (mut store, mut output) = self
            .prepare()
            .map_err(|e| e.aborted(self.cursor.index, &self.cursor.url))?;

        tracing::info!(
            "{} {} spider started, writing to {}",
            self.config.book_name(),
            self.cursor.url,
            output.path().display()
        );

        let mut summary = RunSummary::default();

        loop {
            let index = self.cursor.index;
            let url = self.cursor.url.clone();

            let next = self
                .step(&mut store, &mut output)
                .await
                .map_err(|e| e.aborted(index, &url))?;

            summary.chapters_written += 1;
            summary.last_index = Some(index);
            summary.last_url = Some(url.clone());

            let next_url = match next {
                Some(next_url) => next_url,
                None => {
                    tracing::info!("Chapter {} has no next chapter, book complete", index);
                    break;
                }
            };

            self.cursor
                .advance(next_url)
                .map_err(|e| e.aborted(index, &url))?;

            tokio::time::sleep(self.config.wait()).await;
        }

        output
            .close()
            .map_err(|e| SpiderError::from(e).aborted(self.cursor.index, &self.cursor.url))?;

        Ok(summary)
    }

    /// Creates the directories, opens the output file and the page store
    fn prepare(&self) -> Result<(PageStore, ChapterWriter), SpiderError> {
        let store = PageStore::from_config(&self.config);
        store.cache().ensure_dir()?;
        std::fs::create_dir_all(self.config.dest_dir())?;

        let output = ChapterWriter::open(&self.config.output_path())?;
        Ok((store, output))
    }

    /// Processes the chapter under the cursor
    ///
    /// # Returns
    ///
    /// * `Ok(Some(url))` - Chapter written; absolute URL of the next one
    /// * `Ok(None)` - Chapter written; it was the last one
    /// * `Err(SpiderError)` - Page, content or next link unavailable
    async fn step(
        &self,
        store: &mut PageStore,
        output: &mut ChapterWriter,
    ) -> Result<Option<String>, SpiderError> {
        let index = self.cursor.index;
        let url = self.cursor.url.as_str();

        let page = store.resolve(url).await?;

        let title = match self.parser.title(&page) {
            Ok(title) => title,
            Err(e) => {
                tracing::warn!("Chapter {} URL {}: failed to get chapter title: {}", index, url, e);
                String::new()
            }
        };

        let content = self
            .parser
            .content(&page)
            .map_err(|source| SpiderError::Extract {
                field: ChapterField::Content,
                source,
            })?;

        output.write_chapter(index, &title, &content)?;
        tracing::info!("Chapter {} {} done", index, title);

        let href = self
            .parser
            .next_link(&page)
            .map_err(|source| SpiderError::Extract {
                field: ChapterField::NextLink,
                source,
            })?;

        let href = match href {
            Some(href) => href,
            None => return Ok(None),
        };

        let next = resolve_link(&href, self.config.site_root(), self.config.scheme())?;
        tracing::debug!("Next chapter link {} resolved to {}", href, next);

        Ok(Some(next.to_string()))
    }
}
