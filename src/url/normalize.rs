use crate::UrlError;
use url::Url;

/// Schemes the spider is willing to request
const SUPPORTED_SCHEMES: &[&str] = &["http", "https"];

/// Splits an optional `scheme://` prefix off a URL string
///
/// # Examples
///
/// ```
/// use novel_spider::url::split_scheme;
///
/// assert_eq!(split_scheme("https://example.com/a"), (Some("https"), "example.com/a"));
/// assert_eq!(split_scheme("example.com/a"), (None, "example.com/a"));
/// ```
pub fn split_scheme(url: &str) -> (Option<&str>, &str) {
    if let Some(pos) = url.find("://") {
        let scheme = &url[..pos];
        let is_scheme = !scheme.is_empty()
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if is_scheme {
            return (Some(scheme), &url[pos + 3..]);
        }
    }
    (None, url)
}

/// Removes the scheme prefix from a URL string, if any
pub fn strip_scheme(url: &str) -> &str {
    split_scheme(url).1
}

/// Returns the site root (`host[:port]`) of a URL, never including a scheme
///
/// # Examples
///
/// ```
/// use novel_spider::url::site_root;
///
/// assert_eq!(site_root("https://www.example.com/book/1.html"), "www.example.com");
/// assert_eq!(site_root("127.0.0.1:8080/1.html"), "127.0.0.1:8080");
/// ```
pub fn site_root(url: &str) -> &str {
    let rest = strip_scheme(url);
    let end = rest
        .find(|c: char| matches!(c, '/' | '?' | '#'))
        .unwrap_or(rest.len());
    &rest[..end]
}

/// Prepends `default_scheme://` when the URL carries no scheme of its own
pub fn with_scheme(url: &str, default_scheme: &str) -> String {
    match split_scheme(url) {
        (Some(_), _) => url.to_string(),
        (None, rest) => format!("{}://{}", default_scheme, rest),
    }
}

/// Parses a possibly scheme-less page URL into an absolute HTTP(S) URL
///
/// # Arguments
///
/// * `url` - The URL, with or without a scheme
/// * `default_scheme` - Scheme to use when `url` has none
///
/// # Returns
///
/// * `Ok(Url)` - Absolute URL with a host
/// * `Err(UrlError)` - Malformed URL, unsupported scheme or missing host
pub fn page_url(url: &str, default_scheme: &str) -> Result<Url, UrlError> {
    let full = with_scheme(url.trim(), default_scheme);
    let parsed = Url::parse(&full).map_err(|e| UrlError::Parse(format!("{}: {}", full, e)))?;

    if !SUPPORTED_SCHEMES.contains(&parsed.scheme()) {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            parsed.scheme()
        )));
    }

    if parsed.host_str().is_none() {
        return Err(UrlError::MissingHost(full));
    }

    Ok(parsed)
}

/// Resolves a next-chapter href against the site root
///
/// # Resolution Rules
///
/// | href | Result |
/// |------|--------|
/// | `https://host/path` | used as-is |
/// | `//host/path` | `scheme://host/path` |
/// | `/path` or `path` | `scheme://site_root/path` |
///
/// # Arguments
///
/// * `href` - The raw link taken from the page
/// * `site_root` - Site root without scheme
/// * `scheme` - Scheme used for links that lack one
///
/// # Examples
///
/// ```
/// use novel_spider::url::resolve_link;
///
/// let url = resolve_link("3.html", "www.example.com", "https").unwrap();
/// assert_eq!(url.as_str(), "https://www.example.com/3.html");
/// ```
pub fn resolve_link(href: &str, site_root: &str, scheme: &str) -> Result<Url, UrlError> {
    let href = href.trim();

    if split_scheme(href).0.is_some() {
        return page_url(href, scheme);
    }

    if let Some(rest) = href.strip_prefix("//") {
        return page_url(rest, scheme);
    }

    page_url(site_root, scheme)?
        .join(href)
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))
}

/// Derives the legacy cache file name of a URL: its last path segment
///
/// The query string stays part of the name (with `/` escaped) so that
/// `read?id=1` and `read?id=2` do not share an entry; the fragment is
/// dropped. A bare host yields the host itself.
///
/// # Examples
///
/// ```
/// use novel_spider::url::last_path_segment;
///
/// assert_eq!(last_path_segment("https://example.com/book/12.html"), "12.html");
/// assert_eq!(last_path_segment("example.com/book/12/"), "12");
/// assert_eq!(last_path_segment("example.com/read.php?id=3"), "read.php?id=3");
/// ```
pub fn last_path_segment(url: &str) -> String {
    let rest = strip_scheme(url);
    let rest = rest.split('#').next().unwrap_or_default();
    let (path, query) = match rest.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (rest, None),
    };

    let base = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();

    let mut segment = match query {
        Some(q) if !q.is_empty() => format!("{}?{}", base, q.replace('/', "%2F")),
        _ => base.to_string(),
    };

    if segment.is_empty() || segment == "." || segment == ".." {
        segment = "index".to_string();
    }

    segment
}
