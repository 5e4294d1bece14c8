use crate::config::types::{BookConfig, Config, PathsConfig, RequestConfig, SelectorConfig};
use crate::crawler::{header_map, SelectorParser};
use crate::url::page_url;
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_book_config(&config.book)?;
    validate_paths_config(&config.paths)?;
    validate_request_config(&config.request)?;
    validate_selector_config(&config.selectors)?;
    Ok(())
}

/// Validates the book section
fn validate_book_config(config: &BookConfig) -> Result<(), ConfigError> {
    let name = config.name.trim();
    if name.is_empty() {
        return Err(ConfigError::Validation(
            "book name cannot be empty".to_string(),
        ));
    }

    // The name becomes a file name and a directory name
    if name == "." || name == ".." || name.contains(|c: char| matches!(c, '/' | '\\' | '\0')) {
        return Err(ConfigError::Validation(format!(
            "book name must be usable as a file name, got '{}'",
            config.name
        )));
    }

    if config.start_url.trim().is_empty() {
        return Err(ConfigError::Validation(
            "start-url cannot be empty".to_string(),
        ));
    }

    page_url(&config.start_url, "https")
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid start-url: {}", e)))?;

    Ok(())
}

/// Validates the paths section
fn validate_paths_config(config: &PathsConfig) -> Result<(), ConfigError> {
    if config.dest.trim().is_empty() {
        return Err(ConfigError::Validation("dest cannot be empty".to_string()));
    }

    if config.cache.trim().is_empty() {
        return Err(ConfigError::Validation("cache cannot be empty".to_string()));
    }

    Ok(())
}

/// Validates request headers
fn validate_request_config(config: &RequestConfig) -> Result<(), ConfigError> {
    header_map(&config.headers)?;
    Ok(())
}

/// Validates that every selector parses
fn validate_selector_config(config: &SelectorConfig) -> Result<(), ConfigError> {
    SelectorParser::from_config(config)?;
    Ok(())
}
