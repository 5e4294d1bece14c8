//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the spider:
//! - Building HTTP clients with sane timeouts
//! - Turning the configured header table into a header map
//! - GET requests returning the raw status and body
//!
//! The fetcher does not judge the status code; the page store decides what
//! counts as a usable page. Nothing is retried.

use crate::{ConfigError, SpiderError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::collections::BTreeMap;
use std::time::Duration;

/// Raw result of a GET request
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP status code
    pub status: u16,

    /// Response body, undecoded
    pub body: Vec<u8>,
}

/// Builds an HTTP client with the spider's timeouts
///
/// Custom headers are applied per request, so a request-level
/// `User-Agent` overrides the default one set here.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!("novel-spider/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Converts configured headers into a header map, one value per name
///
/// # Returns
///
/// * `Ok(HeaderMap)` - All names and values are valid HTTP
/// * `Err(ConfigError::InvalidHeader)` - A name or value is not
pub fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, ConfigError> {
    let mut map = HeaderMap::new();

    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ConfigError::InvalidHeader(format!("{}: {}", name, e)))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| ConfigError::InvalidHeader(format!("{}: {}", name, e)))?;
        map.insert(header_name, header_value);
    }

    Ok(map)
}

/// Sends a GET request for `url` with the given custom headers
///
/// A fresh client is built for every call.
///
/// # Arguments
///
/// * `url` - Absolute URL to fetch
/// * `headers` - Custom request headers
///
/// # Returns
///
/// * `Ok(FetchedPage)` - A response arrived, whatever its status
/// * `Err(SpiderError::Network)` - The remote host could not be reached
///   or the body could not be read
/// * `Err(SpiderError::Config)` - A header is not valid HTTP
pub async fn fetch_page(
    url: &str,
    headers: &BTreeMap<String, String>,
) -> Result<FetchedPage, SpiderError> {
    let network = |source: reqwest::Error| SpiderError::Network {
        url: url.to_string(),
        source,
    };

    let headers = header_map(headers)?;
    let client = build_http_client().map_err(network)?;

    let response = client
        .get(url)
        .headers(headers)
        .send()
        .await
        .map_err(network)?;

    let status = response.status().as_u16();
    let body = response.bytes().await.map_err(network)?.to_vec();

    tracing::debug!("GET {} -> {} ({} bytes)", url, status, body.len());

    Ok(FetchedPage { status, body })
}
