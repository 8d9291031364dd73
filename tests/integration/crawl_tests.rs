//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the recipe site and test the
//! full crawl cycle end-to-end against a file-backed store.

use recipe_scout::config::CrawlerConfig;
use recipe_scout::crawler::crawl;
use recipe_scout::state::{CrawlTracker, RunStatus};
use recipe_scout::storage::{open_store, RecipeLog, RecipeStore, StorageError, StorageResult};
use recipe_scout::ScoutError;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fast test configuration rooted at the mock server's /recipes page
fn create_test_config(base_url: &str) -> CrawlerConfig {
    let mut config = CrawlerConfig::new(format!("{}/recipes", base_url));
    config.politeness_delay_ms = 0;
    config.claim_timeout_ms = 20;
    config.request_timeout_secs = 5;
    config.max_concurrency = 2;
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><head><title>Test</title></head><body>{}</body></html>", body),
        "text/html",
    )
}

fn recipe_page(name: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!(
            r#"<html><head>
            <script type="application/ld+json">{{"@context":"https://schema.org","@type":"Recipe","name":"{}"}}</script>
            </head><body><h1>{}</h1></body></html>"#,
            name, name
        ),
        "text/html",
    )
}

async fn mount_page(server: &MockServer, page: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn run_crawl(
    config: &CrawlerConfig,
    store: &Arc<RecipeStore>,
) -> (recipe_scout::crawler::CrawlSummary, Arc<CrawlTracker>) {
    let progress = Arc::new(CrawlTracker::new());
    let summary = crawl(
        config,
        Arc::clone(store),
        Arc::clone(&progress),
        CancellationToken::new(),
    )
    .await
    .expect("crawl should succeed");
    (summary, progress)
}

/// Recipe log that cannot persist anything
struct FullDiskLog;

impl RecipeLog for FullDiskLog {
    fn load(&mut self) -> StorageResult<Vec<String>> {
        Ok(Vec::new())
    }

    fn append(&mut self, _entry: &str) -> StorageResult<()> {
        Err(StorageError::Io(std::io::Error::other("no space left on device")))
    }

    fn clear(&mut self) -> StorageResult<()> {
        Ok(())
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .expect("recipe file should exist")
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_recipe_and_plain_page_discovered() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/recipes",
        html(r#"<a href="/recipes/lemon-tart">Lemon tart</a><a href="/about">About</a>"#),
    )
    .await;
    mount_page(&server, "/recipes/lemon-tart", recipe_page("Lemon tart")).await;
    mount_page(&server, "/about", html("<p>No recipes here</p>")).await;

    let dir = TempDir::new().unwrap();
    let recipes_path = dir.path().join("recipes.txt");
    let store = Arc::new(open_store(&recipes_path).unwrap());

    let (summary, progress) = run_crawl(&create_test_config(&base), &store).await;

    let expected = format!("{}/recipes/lemon-tart", base);
    assert_eq!(store.snapshot().await, vec![expected.clone()]);
    assert_eq!(store.live().await, vec![expected.clone()]);
    assert_eq!(read_lines(&recipes_path), vec![expected]);

    let progress = progress.snapshot();
    assert!(progress.pages_fetched >= 2);
    assert_eq!(progress.recipes_found, 1);
    assert_eq!(progress.status, RunStatus::Done);
    assert!(!summary.cancelled);
}

#[tokio::test]
async fn test_candidate_without_recipe_data_not_stored() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/recipes",
        html(r#"<a href="/recipes/collection/summer">Summer</a>"#),
    )
    .await;
    mount_page(
        &server,
        "/recipes/collection/summer",
        html(r#"<script type="application/ld+json">{"@type":"CollectionPage"}</script>"#),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let store = Arc::new(open_store(&dir.path().join("recipes.txt")).unwrap());

    let (summary, _) = run_crawl(&create_test_config(&base), &store).await;

    assert!(store.is_empty().await);
    assert_eq!(summary.recipes_found, 0);
}

#[tokio::test]
async fn test_resumed_crawl_skips_known_recipes() {
    let server = MockServer::start().await;
    let base = server.uri();
    let known = format!("{}/recipes/known-stew", base);

    mount_page(
        &server,
        "/recipes",
        html(r#"<a href="/recipes/known-stew">Stew</a><a href="/recipes/new-soup">Soup</a>"#),
    )
    .await;
    mount_page(&server, "/recipes/new-soup", recipe_page("Soup")).await;

    // A confirmed recipe from an earlier run is never fetched again
    Mock::given(method("GET"))
        .and(path("/recipes/known-stew"))
        .respond_with(recipe_page("Stew"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let recipes_path = dir.path().join("recipes.txt");
    std::fs::write(&recipes_path, format!("{}\n", known)).unwrap();
    let store = Arc::new(open_store(&recipes_path).unwrap());

    let (summary, _) = run_crawl(&create_test_config(&base), &store).await;

    let soup = format!("{}/recipes/new-soup", base);
    assert_eq!(store.snapshot().await, vec![known.clone(), soup.clone()]);
    assert_eq!(store.live().await, vec![soup]);
    assert_eq!(summary.recipes_found, 1);
    assert_eq!(read_lines(&recipes_path).len(), 2);
}

#[tokio::test]
async fn test_rediscovered_candidate_fetched_once_per_run() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/recipes",
        html(
            r#"<a href="/recipes/rice?ref=top">Rice</a>
               <a href="/recipes/rice#method">Rice again</a>
               <a href="/about">About</a>"#,
        ),
    )
    .await;
    mount_page(
        &server,
        "/about",
        html(r#"<a href="/recipes/rice">Rice from about</a><a href="/recipes">Home</a>"#),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/recipes/rice"))
        .respond_with(html("<p>Not tagged as a recipe</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = Arc::new(open_store(&dir.path().join("recipes.txt")).unwrap());

    let (summary, _) = run_crawl(&create_test_config(&base), &store).await;

    assert_eq!(summary.pages_fetched, 2);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_off_site_and_failed_pages_ignored() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/recipes",
        html(
            r#"<a href="https://elsewhere.example/recipes/offsite">Off site</a>
               <a href="/missing">Missing</a>
               <a href="/feed.json">Feed</a>
               <a href="/recipes/pie">Pie</a>"#,
        ),
    )
    .await;
    mount_page(
        &server,
        "/feed.json",
        ResponseTemplate::new(200).set_body_raw(r#"{"items":[]}"#, "application/json"),
    )
    .await;
    mount_page(&server, "/recipes/pie", recipe_page("Pie")).await;
    // /missing falls through to wiremock's default 404

    let dir = TempDir::new().unwrap();
    let store = Arc::new(open_store(&dir.path().join("recipes.txt")).unwrap());

    let (summary, progress) = run_crawl(&create_test_config(&base), &store).await;

    assert_eq!(store.snapshot().await, vec![format!("{}/recipes/pie", base)]);
    // Seed, /missing and /feed.json were claimed; the off-site link never was
    assert_eq!(summary.pages_fetched, 3);
    assert_eq!(progress.snapshot().status, RunStatus::Done);
}

#[tokio::test]
async fn test_second_run_finds_nothing_new() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/recipes", html(r#"<a href="/recipes/curry">Curry</a>"#)).await;
    mount_page(&server, "/recipes/curry", recipe_page("Curry")).await;

    let dir = TempDir::new().unwrap();
    let recipes_path = dir.path().join("recipes.txt");
    let config = create_test_config(&base);

    let store = Arc::new(open_store(&recipes_path).unwrap());
    let (first, _) = run_crawl(&config, &store).await;
    assert_eq!(first.recipes_found, 1);
    drop(store);

    // Reopen as a restarted process would
    let store = Arc::new(open_store(&recipes_path).unwrap());
    let (second, _) = run_crawl(&config, &store).await;

    assert_eq!(second.recipes_found, 0);
    assert!(store.live().await.is_empty());
    assert_eq!(read_lines(&recipes_path).len(), 1);
}

#[tokio::test]
async fn test_cancellation_stops_workers_promptly() {
    let server = MockServer::start().await;
    let base = server.uri();

    let links: String = (0..200)
        .map(|i| format!(r#"<a href="/page/{}">Page {}</a>"#, i, i))
        .collect();
    mount_page(&server, "/recipes", html(&links)).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/page/\d+$"))
        .respond_with(html("<p>Filler</p>"))
        .mount(&server)
        .await;

    let mut config = create_test_config(&base);
    config.politeness_delay_ms = 100;

    let dir = TempDir::new().unwrap();
    let store = Arc::new(open_store(&dir.path().join("recipes.txt")).unwrap());
    let progress = Arc::new(CrawlTracker::new());
    let cancel = CancellationToken::new();

    let handle = {
        let store = Arc::clone(&store);
        let progress = Arc::clone(&progress);
        let cancel = cancel.clone();
        tokio::spawn(async move { crawl(&config, store, progress, cancel).await })
    };

    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(progress.snapshot().status, RunStatus::Running);

    let cancelled_at = Instant::now();
    cancel.cancel();
    let summary = handle.await.unwrap().unwrap();

    // At most one in-flight delay + request per worker after cancellation
    assert!(cancelled_at.elapsed() < Duration::from_secs(2));
    assert!(summary.cancelled);
    assert!(summary.pages_fetched < 200);
    assert!(summary.frontier.queued > 0);
    assert_eq!(progress.snapshot().status, RunStatus::Done);
}

#[tokio::test]
async fn test_store_failure_aborts_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/recipes",
        html(r#"<a href="/recipes/bread">Bread</a><a href="/about">About</a>"#),
    )
    .await;
    mount_page(&server, "/recipes/bread", recipe_page("Bread")).await;
    mount_page(&server, "/about", html("<p>About us</p>")).await;

    let store = Arc::new(RecipeStore::open(FullDiskLog).unwrap());
    let progress = Arc::new(CrawlTracker::new());

    let result = crawl(
        &create_test_config(&base),
        Arc::clone(&store),
        Arc::clone(&progress),
        CancellationToken::new(),
    )
    .await;

    assert!(matches!(result, Err(ScoutError::Storage(_))));
    assert_eq!(progress.snapshot().status, RunStatus::Done);
    assert_eq!(progress.snapshot().recipes_found, 0);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_cancel_during_politeness_delay_sends_no_request() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/recipes", html(r#"<a href="/recipes/pie">Pie</a>"#)).await;
    Mock::given(method("GET"))
        .and(path("/recipes/pie"))
        .respond_with(recipe_page("Pie"))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&base);
    config.politeness_delay_ms = 400;
    config.max_concurrency = 1;

    let dir = TempDir::new().unwrap();
    let store = Arc::new(open_store(&dir.path().join("recipes.txt")).unwrap());
    let progress = Arc::new(CrawlTracker::new());
    let cancel = CancellationToken::new();

    let handle = {
        let store = Arc::clone(&store);
        let progress = Arc::clone(&progress);
        let cancel = cancel.clone();
        tokio::spawn(async move { crawl(&config, store, progress, cancel).await })
    };

    // Wait for the seed page; the worker then sleeps before the candidate fetch
    let deadline = Instant::now() + Duration::from_secs(5);
    while server.received_requests().await.unwrap().is_empty() {
        assert!(Instant::now() < deadline, "seed page was never fetched");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    tokio::time::sleep(Duration::from_millis(50)).await;

    let cancelled_at = Instant::now();
    cancel.cancel();
    let summary = handle.await.unwrap().unwrap();

    assert!(cancelled_at.elapsed() < Duration::from_millis(300));
    assert!(summary.cancelled);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
    assert!(store.is_empty().await);
    assert_eq!(progress.snapshot().status, RunStatus::Done);
}
