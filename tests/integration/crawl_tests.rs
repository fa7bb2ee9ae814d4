//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! fetch -> extract -> render -> export cycle end-to-end.

use chrono::{NaiveDate, NaiveDateTime};
use legaldoc_crawler::clock::ManualClock;
use legaldoc_crawler::config::{parse_config, Config};
use legaldoc_crawler::crawler::HttpFetcher;
use legaldoc_crawler::output::RecordingProgress;
use legaldoc_crawler::{CrawlStage, Crawler, ErrorKind, ItemOutcome};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTICLE: &str = r#"<html><head><title>Luật</title></head><body>
    <div class="header"><a href="/">Trang chủ</a></div>
    <div class="content1"><h1>Title</h1><p>Para one.</p><ul><li>Item A</li></ul></div>
    <div class="footer">Footer</div>
</body></html>"#;

fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 8, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

/// Creates a config whose requests go out with a test user agent
fn test_config(output_dir: &std::path::Path) -> Config {
    let mut config = parse_config(
        r#"
        [crawler]
        user-agent = "LegaldocTest/1.0"
        timeout-seconds = 5
        delay-seconds = 2
        "#,
    )
    .unwrap();
    config.output.directory = output_dir.display().to_string();
    config
}

fn test_crawler(config: Config) -> (Crawler, Arc<ManualClock>, Arc<RecordingProgress>) {
    let clock = Arc::new(ManualClock::new(start_time()));
    let progress = Arc::new(RecordingProgress::new());
    let fetcher = HttpFetcher::new(&config.crawler).unwrap();
    let crawler =
        Crawler::with_components(config, Arc::new(fetcher), clock.clone(), progress.clone());
    (crawler, clock, progress)
}

async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Splits a document into its frontmatter lines and its body
fn split_document(contents: &str) -> (Vec<&str>, &str) {
    let rest = contents.strip_prefix("---\n").unwrap();
    let end = rest.find("\n---\n").unwrap();
    let frontmatter = rest[..end].lines().collect();
    let body = rest[end + "\n---\n".len()..].strip_prefix('\n').unwrap();
    (frontmatter, body)
}

#[tokio::test]
async fn test_crawl_one_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/van-ban/Luat-Dat-dai-2024.aspx"))
        .and(header("user-agent", "LegaldocTest/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ARTICLE))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (crawler, _, _) = test_crawler(test_config(dir.path()));
    let url = format!("{}/van-ban/Luat-Dat-dai-2024.aspx", server.uri());

    let file = crawler.crawl_one(&url, None).await.unwrap();

    assert_eq!(
        file.path.file_name().unwrap().to_str().unwrap(),
        "Luat-Dat-dai-2024_20240801_090000.md"
    );

    let contents = std::fs::read_to_string(&file.path).unwrap();
    assert_eq!(file.byte_size, contents.len() as u64);

    let (frontmatter, body) = split_document(&contents);
    assert_eq!(
        frontmatter,
        vec![
            "title: \"Nội dung từ thuvienphapluat.vn\"".to_string(),
            format!("url: {}", url),
            "crawled_at: 2024-08-01 09:00:00".to_string(),
            "source: 127.0.0.1".to_string(),
        ]
    );
    assert_eq!(body, "# Title\n\nPara one.\n\n- Item A\n\n");
    assert!(!body.contains("Footer"));
    assert!(!body.contains("Trang chủ"));
}

#[tokio::test]
async fn test_crawl_many_continues_after_http_error() {
    let server = MockServer::start().await;
    mount_page(&server, "/a.aspx", ARTICLE).await;
    Mock::given(method("GET"))
        .and(path("/b.aspx"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_page(&server, "/c.aspx", ARTICLE).await;

    let dir = TempDir::new().unwrap();
    let (crawler, clock, progress) = test_crawler(test_config(dir.path()));
    let urls: Vec<String> = ["/a.aspx", "/b.aspx", "/c.aspx"]
        .iter()
        .map(|p| format!("{}{}", server.uri(), p))
        .collect();

    let result = crawler.crawl_many(&urls, None, None).await;

    assert_eq!(result.len(), 3);
    assert_eq!(result.succeeded(), 2);
    assert_eq!(result.failed(), 1);

    match &result.outcomes()[1] {
        ItemOutcome::Failure(failure) => {
            assert_eq!(failure.url, urls[1]);
            assert_eq!(failure.stage, CrawlStage::Fetching);
            assert_eq!(failure.error.kind(), ErrorKind::HttpStatus);
        }
        ItemOutcome::Success(_) => panic!("404 must not be exported"),
    }

    assert!(clock.total_slept() >= Duration::from_secs(4));
    assert_eq!(progress.snapshots().len(), 3);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
}

#[tokio::test]
async fn test_crawl_many_continues_after_unreachable_host() {
    let server = MockServer::start().await;
    mount_page(&server, "/a.aspx", ARTICLE).await;

    let dir = TempDir::new().unwrap();
    let (crawler, _, _) = test_crawler(test_config(dir.path()));
    let urls = vec![
        "http://127.0.0.1:1/unreachable.aspx".to_string(),
        format!("{}/a.aspx", server.uri()),
    ];

    let result = crawler.crawl_many(&urls, None, Some(Duration::ZERO)).await;

    let failure = result.failures().next().unwrap();
    assert_eq!(failure.url, urls[0]);
    assert_eq!(failure.error.kind(), ErrorKind::Network);
    assert!(result.outcomes()[1].is_success());
}

#[tokio::test]
async fn test_page_without_container_writes_nothing() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/empty.aspx",
        r#"<html><body><div class="content2"><p>Elsewhere</p></div></body></html>"#,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let (crawler, _, _) = test_crawler(test_config(dir.path()));

    let failure = crawler
        .crawl_one(&format!("{}/empty.aspx", server.uri()), None)
        .await
        .unwrap_err();

    assert_eq!(failure.stage, CrawlStage::Locating);
    assert_eq!(failure.error.kind(), ErrorKind::ContentNotFound);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_repeated_crawls_one_second_apart_keep_both_files() {
    let server = MockServer::start().await;
    mount_page(&server, "/a.aspx", ARTICLE).await;

    let dir = TempDir::new().unwrap();
    let (crawler, clock, _) = test_crawler(test_config(dir.path()));
    let url = format!("{}/a.aspx", server.uri());

    let first = crawler.crawl_one(&url, None).await.unwrap();
    clock.advance(Duration::from_secs(1));
    let second = crawler.crawl_one(&url, None).await.unwrap();

    assert_ne!(first.path, second.path);
    assert!(first.path.exists());
    assert!(second.path.exists());
}

#[tokio::test]
async fn test_render_options_from_config() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/list.aspx",
        r#"<div class="content1"><ol><li>Điều *1*</li><li>Điều 2</li></ol></div>"#,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path());
    config.render.escape_markdown = true;
    config.render.number_ordered_lists = true;
    let (crawler, _, _) = test_crawler(config);

    let file = crawler
        .crawl_one(&format!("{}/list.aspx", server.uri()), None)
        .await
        .unwrap();

    let contents = std::fs::read_to_string(&file.path).unwrap();
    let (_, body) = split_document(&contents);
    assert_eq!(body, "1. Điều \\*1\\*\n\n2. Điều 2\n\n");
}
