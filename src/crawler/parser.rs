//! Chapter extraction rules
//!
//! Every target site lays out its chapter pages differently, so the three
//! pieces the spider needs from a page (title, text and the link to the
//! next chapter) are extracted through the [`ChapterParser`] trait.
//! [`SelectorParser`] implements it with three CSS selectors, which covers
//! most novel sites.

use crate::config::SelectorConfig;
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use std::fmt;
use thiserror::Error;

/// A parsed chapter page
pub type ParsedPage = Html;

/// The part of a chapter page being extracted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterField {
    Title,
    Content,
    NextLink,
}

impl fmt::Display for ChapterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChapterField::Title => "title",
            ChapterField::Content => "content",
            ChapterField::NextLink => "next link",
        };
        f.write_str(name)
    }
}

/// Errors raised while extracting a chapter field from a valid page
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no element matches `{0}`")]
    NoMatch(String),

    #[error("element matching `{0}` has no text")]
    Empty(String),

    #[error("element matching `{selector}` has no `{attribute}` attribute")]
    MissingAttribute {
        selector: String,
        attribute: &'static str,
    },

    #[error("{0}")]
    Other(String),
}

/// Site-specific extraction of chapter fields
///
/// Title failures are tolerated by the spider; content and next-link
/// failures abort the traversal.
pub trait ChapterParser {
    /// Extracts the chapter title
    fn title(&self, page: &ParsedPage) -> Result<String, ExtractError>;

    /// Extracts the chapter text
    fn content(&self, page: &ParsedPage) -> Result<String, ExtractError>;

    /// Extracts the raw link to the next chapter
    ///
    /// # Returns
    ///
    /// * `Ok(Some(href))` - Link to follow, possibly relative
    /// * `Ok(None)` - This is the last chapter
    /// * `Err(ExtractError)` - The page does not look as expected
    fn next_link(&self, page: &ParsedPage) -> Result<Option<String>, ExtractError>;
}

/// A CSS selector together with its source text, for error messages
#[derive(Debug, Clone)]
struct Rule {
    source: String,
    selector: Selector,
}

impl Rule {
    fn parse(field: &str, source: &str) -> Result<Self, ConfigError> {
        let selector = Selector::parse(source).map_err(|e| {
            ConfigError::InvalidSelector(format!("{} selector '{}': {:?}", field, source, e))
        })?;

        Ok(Self {
            source: source.to_string(),
            selector,
        })
    }

    fn first<'a>(&self, page: &'a ParsedPage) -> Option<ElementRef<'a>> {
        page.select(&self.selector).next()
    }

    fn require<'a>(&self, page: &'a ParsedPage) -> Result<ElementRef<'a>, ExtractError> {
        self.first(page)
            .ok_or_else(|| ExtractError::NoMatch(self.source.clone()))
    }
}

/// [`ChapterParser`] driven by three CSS selectors
///
/// # Extraction Rules
///
/// | Field | Rule |
/// |-------|------|
/// | title | text of the first match, trimmed |
/// | content | text nodes of the first match, trimmed, blank ones dropped, one per line |
/// | next link | `href` of the first match; `#`, empty or `javascript:` ends the book, no match is an error |
///
/// # Example
///
/// ```
/// use novel_spider::{ChapterParser, SelectorParser};
/// use scraper::Html;
///
/// let parser = SelectorParser::new("h1", "#content", "a.next").unwrap();
/// let page = Html::parse_document(
///     r#"<h1>Chapter One</h1><div id="content">Hello<br>World</div><a class="next" href="/2.html">Next</a>"#,
/// );
///
/// assert_eq!(parser.title(&page).unwrap(), "Chapter One");
/// assert_eq!(parser.content(&page).unwrap(), "Hello\nWorld");
/// assert_eq!(parser.next_link(&page).unwrap(), Some("/2.html".to_string()));
/// ```
#[derive(Debug, Clone)]
pub struct SelectorParser {
    title: Rule,
    content: Rule,
    next_link: Rule,
}

impl SelectorParser {
    /// Creates a parser from selector strings
    ///
    /// # Returns
    ///
    /// * `Ok(SelectorParser)` - All three selectors parsed
    /// * `Err(ConfigError::InvalidSelector)` - A selector is malformed
    pub fn new(title: &str, content: &str, next_link: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            title: Rule::parse("title", title)?,
            content: Rule::parse("content", content)?,
            next_link: Rule::parse("next-link", next_link)?,
        })
    }

    /// Creates a parser from the `[selectors]` configuration section
    pub fn from_config(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Self::new(&config.title, &config.content, &config.next_link)
    }
}

impl ChapterParser for SelectorParser {
    fn title(&self, page: &ParsedPage) -> Result<String, ExtractError> {
        let element = self.title.require(page)?;
        let title = element.text().collect::<String>().trim().to_string();

        if title.is_empty() {
            return Err(ExtractError::Empty(self.title.source.clone()));
        }
        Ok(title)
    }

    fn content(&self, page: &ParsedPage) -> Result<String, ExtractError> {
        let element = self.content.require(page)?;
        let lines: Vec<&str> = element
            .text()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        if lines.is_empty() {
            return Err(ExtractError::Empty(self.content.source.clone()));
        }
        Ok(lines.join("\n"))
    }

    fn next_link(&self, page: &ParsedPage) -> Result<Option<String>, ExtractError> {
        let element = self.next_link.require(page)?;

        let href = element
            .value()
            .attr("href")
            .ok_or_else(|| ExtractError::MissingAttribute {
                selector: self.next_link.source.clone(),
                attribute: "href",
            })?
            .trim();

        if is_dead_link(href) {
            return Ok(None);
        }
        Ok(Some(href.to_string()))
    }
}

/// Links that do not lead anywhere; sites use them on the last chapter
fn is_dead_link(href: &str) -> bool {
    href.is_empty() || href == "#" || href.to_ascii_lowercase().starts_with("javascript:")
}
