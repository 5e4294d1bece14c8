use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration text
///
/// # Example
///
/// ```
/// use novel_spider::config::parse_config;
///
/// let config = parse_config(r##"
/// [book]
/// name = "Test"
/// start-url = "www.example.com/book/1.html"
///
/// [paths]
/// dest = "books"
/// cache = "cache"
///
/// [selectors]
/// title = "h1"
/// content = "#content"
/// next-link = "a#next"
/// "##).unwrap();
/// assert_eq!(config.book.start_index, 1);
/// ```
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}
