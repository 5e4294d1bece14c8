//! Integration tests for the spider
//!
//! These tests use wiremock to serve chapter pages and run the fetcher,
//! the page store and full traversals end-to-end.

use novel_spider::config::CacheKeyStrategy;
use novel_spider::crawler::{
    crawl, fetch_page, ChapterField, ExtractError, PageStore, SelectorParser, Spider,
};
use novel_spider::storage::{DiskCache, PageCache};
use novel_spider::{SpiderConfig, SpiderError};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a chapter page
///
/// A missing title or content leaves the element out; a missing next link
/// renders the `#` anchor sites put on their last chapter.
fn chapter_page(title: Option<&str>, content: Option<&str>, next: Option<&str>) -> String {
    let mut body = String::from("<html><head><title>Site</title></head><body>");
    if let Some(title) = title {
        body.push_str(&format!(r#"<div class="bookname"><h1>{}</h1></div>"#, title));
    }
    if let Some(content) = content {
        body.push_str(&format!(r#"<div id="content">{}</div>"#, content));
    }
    body.push_str(&format!(
        r#"<a id="next" href="{}">Next</a>"#,
        next.unwrap_or("#")
    ));
    body.push_str("</body></html>");
    body
}

/// Serves `body` at `route`, expecting exactly one request
async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .expect(1)
        .mount(server)
        .await;
}

fn parser() -> SelectorParser {
    SelectorParser::new("div.bookname > h1", "#content", "a#next").unwrap()
}

fn spider_config(dir: &TempDir, server: &MockServer, book: &str, start: &str, index: u32) -> SpiderConfig {
    SpiderConfig::new(
        book,
        &format!("{}{}", server.uri(), start),
        dir.path().join("books"),
        dir.path().join("cache"),
        index,
        0,
    )
}

fn disk_store(dir: &TempDir, strategy: CacheKeyStrategy) -> PageStore {
    let cache = DiskCache::new(dir.path().join("cache"));
    cache.ensure_dir().unwrap();
    PageStore::new(cache, "https", BTreeMap::new(), strategy)
}

fn read_output(config: &SpiderConfig) -> String {
    std::fs::read_to_string(config.output_path()).unwrap()
}

#[tokio::test]
async fn test_fetch_sends_custom_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/book/1.html"))
        .and(header("referer", "https://example.com/"))
        .and(header("user-agent", "TestAgent/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .expect(1)
        .mount(&server)
        .await;

    let mut headers = BTreeMap::new();
    headers.insert("Referer".to_string(), "https://example.com/".to_string());
    headers.insert("User-Agent".to_string(), "TestAgent/1.0".to_string());

    let fetched = fetch_page(&format!("{}/book/1.html", server.uri()), &headers)
        .await
        .expect("fetch failed");

    assert_eq!(fetched.status, 200);
    assert_eq!(fetched.body, b"hello".to_vec());
}

#[tokio::test]
async fn test_fetch_reports_status_without_judging() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410).set_body_string("gone"))
        .mount(&server)
        .await;

    let fetched = fetch_page(&format!("{}/gone", server.uri()), &BTreeMap::new())
        .await
        .unwrap();
    assert_eq!(fetched.status, 410);
}

#[tokio::test]
async fn test_fetch_unreachable_host_is_network_error() {
    // Grab a free port, then close it
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let result = fetch_page(&format!("http://127.0.0.1:{}/1.html", port), &BTreeMap::new()).await;
    assert!(matches!(result, Err(SpiderError::Network { .. })));
}

#[tokio::test]
async fn test_resolve_fetches_once_then_serves_from_cache() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let url = format!("{}/book/1.html", server.uri());

    mount_page(
        &server,
        "/book/1.html",
        chapter_page(Some("One"), Some("Text"), None),
    )
    .await;

    let mut store = disk_store(&dir, CacheKeyStrategy::LastSegment);
    let first = store.resolve(&url).await.expect("first resolve failed");
    let first_html = first.root_element().html();
    assert!(store.cache().contains("1.html"));

    // Checks the single request; nothing answers for this route anymore
    drop(server);

    let second = store.resolve(&url).await.expect("second resolve failed");
    assert_eq!(second.root_element().html(), first_html);
}

#[tokio::test]
async fn test_cache_survives_new_store() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let url = format!("{}/book/7.html", server.uri());

    mount_page(&server, "/book/7.html", chapter_page(None, Some("Seven"), None)).await;

    disk_store(&dir, CacheKeyStrategy::LastSegment)
        .resolve(&url)
        .await
        .unwrap();

    // A later run reads the entry written by the first one
    let mut store = disk_store(&dir, CacheKeyStrategy::LastSegment);
    let page = store.resolve(&url).await.unwrap();
    assert!(page.root_element().html().contains("Seven"));
}

#[tokio::test]
async fn test_not_found_is_bad_status_and_not_cached() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/book/missing.html"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let mut store = disk_store(&dir, CacheKeyStrategy::LastSegment);
    let result = store
        .resolve(&format!("{}/book/missing.html", server.uri()))
        .await;

    match result {
        Err(SpiderError::BadStatus { status, url }) => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/book/missing.html"));
        }
        other => panic!("expected BadStatus, got {:?}", other.map(|_| ())),
    }
    assert!(!store.cache().contains("missing.html"));
    assert_eq!(store.cache().lookup("missing.html"), None);
}

#[tokio::test]
async fn test_last_segment_collision_is_rejected() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/a/1.html", chapter_page(None, Some("from a"), None)).await;
    Mock::given(method("GET"))
        .and(path("/b/1.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("from b"))
        .expect(0)
        .mount(&server)
        .await;

    let mut store = disk_store(&dir, CacheKeyStrategy::LastSegment);
    store
        .resolve(&format!("{}/a/1.html", server.uri()))
        .await
        .unwrap();
    let result = store.resolve(&format!("{}/b/1.html", server.uri())).await;

    assert!(matches!(result, Err(SpiderError::CacheCollision { .. })));

    // The first entry is untouched
    let cached = String::from_utf8(store.cache().lookup("1.html").unwrap()).unwrap();
    assert!(cached.contains("from a"));
}

#[tokio::test]
async fn test_url_hash_keys_keep_entries_apart() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/a/1.html", chapter_page(None, Some("from a"), None)).await;
    mount_page(&server, "/b/1.html", chapter_page(None, Some("from b"), None)).await;

    let mut store = disk_store(&dir, CacheKeyStrategy::UrlHash);
    let a = store
        .resolve(&format!("{}/a/1.html", server.uri()))
        .await
        .unwrap();
    let b = store
        .resolve(&format!("{}/b/1.html", server.uri()))
        .await
        .unwrap();

    assert!(a.root_element().html().contains("from a"));
    assert!(b.root_element().html().contains("from b"));
    assert_eq!(std::fs::read_dir(store.cache().dir()).unwrap().count(), 2);
}

#[tokio::test]
async fn test_full_book_in_order() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/book/1.html", chapter_page(Some("Arrival"), Some("Rain."), Some("/book/2.html"))).await;
    mount_page(&server, "/book/2.html", chapter_page(Some("Harbor"), Some("Ships."), Some("book/3.html"))).await;
    mount_page(&server, "/book/3.html", chapter_page(Some("Storm"), Some("Wind.<br>Waves."), Some(&format!("{}/book/4.html", server.uri())))).await;
    mount_page(&server, "/book/4.html", chapter_page(Some("Calm"), Some("Sun."), None)).await;

    let config = spider_config(&dir, &server, "Voyage", "/book/1.html", 5);
    let summary = crawl(config.clone(), parser()).await.expect("crawl failed");

    assert_eq!(summary.chapters_written, 4);
    assert_eq!(summary.last_index, Some(8));

    let text = read_output(&config);
    assert_eq!(
        text,
        "Chapter 5 Arrival\n\nRain.\n\n\
         Chapter 6 Harbor\n\nShips.\n\n\
         Chapter 7 Storm\n\nWind.\nWaves.\n\n\
         Chapter 8 Calm\n\nSun.\n\n"
    );

    let cache_dir = dir.path().join("cache").join("Voyage");
    for key in ["1.html", "2.html", "3.html", "4.html"] {
        assert!(cache_dir.join(key).is_file(), "missing cache entry {}", key);
    }
}

#[tokio::test]
async fn test_missing_title_does_not_abort() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/book/1.html", chapter_page(None, Some("Untitled text."), Some("/book/2.html"))).await;
    mount_page(&server, "/book/2.html", chapter_page(Some("Two"), Some("More."), None)).await;

    let config = spider_config(&dir, &server, "Untitled", "/book/1.html", 1);
    let summary = Spider::new(config.clone(), parser()).run().await.unwrap();

    assert_eq!(summary.chapters_written, 2);
    assert_eq!(
        read_output(&config),
        "Chapter 1 \n\nUntitled text.\n\nChapter 2 Two\n\nMore.\n\n"
    );
}

#[tokio::test]
async fn test_missing_content_aborts_and_keeps_earlier_chapters() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/book/10.html", chapter_page(Some("Ten"), Some("Kept."), Some("/book/11.html"))).await;
    mount_page(&server, "/book/11.html", chapter_page(Some("Eleven"), None, Some("/book/12.html"))).await;

    let config = spider_config(&dir, &server, "Broken", "/book/10.html", 10);
    let mut spider = Spider::new(config.clone(), parser());
    let err = spider.run().await.unwrap_err();

    match err {
        SpiderError::Aborted { index, url, source } => {
            assert_eq!(index, 11);
            assert!(url.ends_with("/book/11.html"));
            assert!(matches!(
                *source,
                SpiderError::Extract {
                    field: ChapterField::Content,
                    ..
                }
            ));
        }
        other => panic!("expected an aborted run, got {:?}", other),
    }

    assert_eq!(read_output(&config), "Chapter 10 Ten\n\nKept.\n\n");
}

#[tokio::test]
async fn test_broken_next_link_aborts_after_writing_chapter() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let page = r#"<html><body><div class="bookname"><h1>One</h1></div>
        <div id="content">Body.</div><a id="next">Next</a></body></html>"#;
    mount_page(&server, "/book/1.html", page.to_string()).await;

    let config = spider_config(&dir, &server, "NoHref", "/book/1.html", 1);
    let err = Spider::new(config.clone(), parser()).run().await.unwrap_err();

    match err {
        SpiderError::Aborted { index, source, .. } => {
            assert_eq!(index, 1);
            assert!(matches!(
                *source,
                SpiderError::Extract {
                    field: ChapterField::NextLink,
                    ..
                }
            ));
        }
        other => panic!("expected an aborted run, got {:?}", other),
    }

    assert_eq!(read_output(&config), "Chapter 1 One\n\nBody.\n\n");
}

#[tokio::test]
async fn test_renamed_next_anchor_is_not_the_end_of_the_book() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let page = r#"<html><body><div class="bookname"><h1>One</h1></div>
        <div id="content">Body.</div><a class="next-chapter" href="2.html">Next</a></body></html>"#;
    mount_page(&server, "/book/1.html", page.to_string()).await;

    let config = spider_config(&dir, &server, "Relayout", "/book/1.html", 1);
    let err = crawl(config.clone(), parser()).await.unwrap_err();

    match err {
        SpiderError::Aborted { index, url, source } => {
            assert_eq!(index, 1);
            assert!(url.ends_with("/book/1.html"));
            assert!(matches!(
                *source,
                SpiderError::Extract {
                    field: ChapterField::NextLink,
                    source: ExtractError::NoMatch(_),
                }
            ));
        }
        other => panic!("expected an aborted run, got {:?}", other),
    }

    assert_eq!(read_output(&config), "Chapter 1 One\n\nBody.\n\n");
}

#[tokio::test]
async fn test_book_test_stops_at_third_page() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/test/1.html", chapter_page(Some("First"), Some("One."), Some("/test/2.html"))).await;
    mount_page(&server, "/test/2.html", chapter_page(Some("Second"), Some("Two."), Some("/test/3.html"))).await;
    mount_page(&server, "/test/3.html", "<html><body><p>The end?</p></body></html>".to_string()).await;

    let config = spider_config(&dir, &server, "Test", "/test/1.html", 1);
    let err = crawl(config.clone(), parser()).await.unwrap_err();

    let message = err.to_string();
    assert!(message.contains("Chapter 3"), "unexpected error: {}", message);
    assert!(message.contains("traversal aborted"));
    assert!(matches!(err, SpiderError::Aborted { index: 3, .. }));

    let text = read_output(&config);
    assert_eq!(text.matches("Chapter ").count(), 2);
    assert_eq!(text, "Chapter 1 First\n\nOne.\n\nChapter 2 Second\n\nTwo.\n\n");
    assert!(config.output_path().ends_with("books/Test.txt"));
}

#[tokio::test]
async fn test_rerun_after_failure_reuses_cache() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/book/1.html", chapter_page(Some("One"), Some("A."), Some("/book/2.html"))).await;
    mount_page(&server, "/book/2.html", chapter_page(Some("Two"), Some("B."), Some("/book/3.html"))).await;

    // Page 3 fails once, then recovers
    Mock::given(method("GET"))
        .and(path("/book/3.html"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/book/3.html", chapter_page(Some("Three"), Some("C."), None)).await;

    let first = spider_config(&dir, &server, "Retry", "/book/1.html", 1);
    let err = crawl(first, parser()).await.unwrap_err();
    match err {
        SpiderError::Aborted { index, source, .. } => {
            assert_eq!(index, 3);
            assert!(matches!(*source, SpiderError::BadStatus { status: 503, .. }));
        }
        other => panic!("expected an aborted run, got {:?}", other),
    }

    // Same cache, fresh output directory: pages 1 and 2 come from disk
    let second = SpiderConfig::new(
        "Retry",
        &format!("{}/book/1.html", server.uri()),
        dir.path().join("second"),
        dir.path().join("cache"),
        1,
        0,
    );
    let summary = crawl(second.clone(), parser()).await.unwrap();

    assert_eq!(summary.chapters_written, 3);
    assert_eq!(
        read_output(&second),
        "Chapter 1 One\n\nA.\n\nChapter 2 Two\n\nB.\n\nChapter 3 Three\n\nC.\n\n"
    );
}

#[tokio::test]
async fn test_waits_between_chapters() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/book/1.html", chapter_page(Some("One"), Some("A."), Some("/book/2.html"))).await;
    mount_page(&server, "/book/2.html", chapter_page(Some("Two"), Some("B."), None)).await;

    let config = SpiderConfig::new(
        "Slow",
        &format!("{}/book/1.html", server.uri()),
        dir.path().join("books"),
        dir.path().join("cache"),
        1,
        1,
    );

    let started = Instant::now();
    crawl(config, parser()).await.unwrap();
    assert!(started.elapsed() >= Duration::from_secs(1));
}

#[tokio::test]
async fn test_configured_headers_reach_every_chapter() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    for (route, body) in [
        ("/book/1.html", chapter_page(Some("One"), Some("A."), Some("/book/2.html"))),
        ("/book/2.html", chapter_page(Some("Two"), Some("B."), None)),
    ] {
        Mock::given(method("GET"))
            .and(path(route))
            .and(header("cookie", "session=abc"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;
    }

    let config = spider_config(&dir, &server, "Cookies", "/book/1.html", 1)
        .with_header("Cookie", "session=abc");
    let summary = crawl(config, parser()).await.unwrap();
    assert_eq!(summary.chapters_written, 2);
}
