//! Configuration module for Novel-Spider
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and turning them into the immutable [`SpiderConfig`] used by a run.
//!
//! # Example
//!
//! ```no_run
//! use novel_spider::config::{load_config, SpiderConfig};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("book.toml")).unwrap();
//! let spider_config = SpiderConfig::from_config(&config);
//! println!("Downloading {} from {}", spider_config.book_name(), spider_config.start_url());
//! ```

mod parser;
mod spider;
mod types;
mod validation;

// Re-export types
pub use spider::SpiderConfig;
pub use types::{BookConfig, CacheKeyStrategy, Config, PathsConfig, RequestConfig, SelectorConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
