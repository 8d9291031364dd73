//! Integration tests for the export pipeline and the full harvester
//!
//! wiremock plays both the recipe import API and, for the pipeline tests,
//! the recipe site.

use recipe_scout::config::{load_destination, parse_config, Config, DestinationConfig};
use recipe_scout::export::Exporter;
use recipe_scout::state::{ExportTracker, RunStatus};
use recipe_scout::storage::{MemoryRecipeLog, RecipeLog, RecipeStore, StorageError, StorageResult};
use recipe_scout::{Harvester, PipelineMode, ScoutError, StartAck};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const IMPORT_PATH: &str = "/api/recipes/import";
const API_KEY: &str = "test-api-key";

fn store_with(entries: &[&str]) -> RecipeStore {
    RecipeStore::open(MemoryRecipeLog::with_entries(entries.iter().copied())).unwrap()
}

fn destination(server: &MockServer, rate_limit_seconds: f64) -> DestinationConfig {
    DestinationConfig::new(
        format!("{}{}", server.uri(), IMPORT_PATH),
        API_KEY,
        rate_limit_seconds,
    )
}

fn create_exporter() -> Exporter {
    Exporter::with_default_client(Arc::new(ExportTracker::new())).unwrap()
}

/// Expects exactly one authenticated import of `url`, answered with `status`
async fn expect_import(server: &MockServer, url: &str, status: u16) {
    Mock::given(method("POST"))
        .and(path(IMPORT_PATH))
        .and(header("authorization", format!("Bearer {}", API_KEY).as_str()))
        .and(body_json(json!({ "url": url })))
        .respond_with(ResponseTemplate::new(status))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_failed_push_does_not_stop_export() {
    let server = MockServer::start().await;
    let entries = [
        "https://example.com/recipes/a",
        "https://example.com/recipes/b",
        "https://example.com/recipes/c",
    ];
    expect_import(&server, entries[0], 201).await;
    expect_import(&server, entries[1], 500).await;
    expect_import(&server, entries[2], 200).await;

    let exporter = create_exporter();
    let store = store_with(&entries);

    let summary = exporter
        .push_all(&destination(&server, 0.0), &store, &CancellationToken::new())
        .await;

    assert_eq!(summary.attempted, 3);
    assert_eq!(summary.delivered, 2);
    assert_eq!(summary.failed, 1);
    assert!(!summary.cancelled);

    let progress = exporter.progress().snapshot();
    assert_eq!(progress.current_index, 3);
    assert_eq!(progress.total, 3);
    assert_eq!(progress.status, RunStatus::Done);
}

#[tokio::test]
async fn test_pushes_follow_store_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(IMPORT_PATH))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let entries = [
        "https://example.com/recipes/z",
        "https://example.com/recipes/m",
        "https://example.com/recipes/a",
    ];
    let exporter = create_exporter();
    exporter
        .push_all(
            &destination(&server, 0.0),
            &store_with(&entries),
            &CancellationToken::new(),
        )
        .await;

    let received: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| {
            let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
            body["url"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(received, entries);
}

#[tokio::test]
async fn test_unconfigured_destination_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let exporter = create_exporter();
    let mut dest = destination(&server, 0.0);
    dest.credential = String::new();

    let summary = exporter
        .push_all(
            &dest,
            &store_with(&["https://example.com/recipes/a"]),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(summary.attempted, 0);
    let progress = exporter.progress().snapshot();
    assert_eq!(progress.status, RunStatus::Done);
    assert_eq!(progress.total, 0);
}

#[tokio::test]
async fn test_cancel_interrupts_rate_limit_pause() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(IMPORT_PATH))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let entries = [
        "https://example.com/recipes/1",
        "https://example.com/recipes/2",
        "https://example.com/recipes/3",
        "https://example.com/recipes/4",
    ];
    let exporter = create_exporter();
    let store = Arc::new(store_with(&entries));
    let cancel = CancellationToken::new();

    let handle = {
        let exporter = exporter.clone();
        let store = Arc::clone(&store);
        let cancel = cancel.clone();
        let dest = destination(&server, 5.0);
        tokio::spawn(async move { exporter.push_all(&dest, &store, &cancel).await })
    };

    tokio::time::sleep(Duration::from_millis(300)).await;
    let cancelled_at = Instant::now();
    cancel.cancel();
    let summary = handle.await.unwrap();

    assert!(cancelled_at.elapsed() < Duration::from_secs(1));
    assert!(summary.cancelled);
    assert_eq!(summary.attempted, 1);

    let progress = exporter.progress().snapshot();
    assert_eq!(progress.current_index, 1);
    assert_eq!(progress.total, 4);
    assert_eq!(progress.status, RunStatus::Done);
    assert!(progress.stopped_early());
}

/// Config whose site and import API both live on `server`
fn harvester_config(server: &MockServer, dir: &TempDir, export_after_cancelled_crawl: bool) -> Config {
    let toml = format!(
        r#"
[crawler]
start-url = "{base}/recipes"
politeness-delay-ms = 0
claim-timeout-ms = 20
request-timeout-secs = 5
max-concurrency = 2

[output]
recipes-path = "{recipes}"
destination-path = "{destination}"

[pipeline]
export-after-cancelled-crawl = {flag}

[destination]
endpoint = "{base}{import}"
credential = "{key}"
rate-limit-seconds = 0.0
"#,
        base = server.uri(),
        recipes = dir.path().join("recipes.txt").display(),
        destination = dir.path().join("destination.toml").display(),
        flag = export_after_cancelled_crawl,
        import = IMPORT_PATH,
        key = API_KEY,
    );
    parse_config(&toml).unwrap()
}

fn create_harvester(
    server: &MockServer,
    dir: &TempDir,
    export_after_cancelled_crawl: bool,
    entries: &[&str],
) -> Harvester {
    let config = harvester_config(server, dir, export_after_cancelled_crawl);
    Harvester::new(config, store_with(entries)).unwrap()
}

/// Recipe log whose appends always fail
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

#[tokio::test]
async fn test_harvester_crawls_then_exports() {
    let server = MockServer::start().await;
    let base = server.uri();
    let recipe = format!("{}/recipes/shakshuka", base);

    Mock::given(method("GET"))
        .and(path("/recipes"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><body><a href="/recipes/shakshuka">Shakshuka</a></body></html>"#,
            "text/html",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/recipes/shakshuka"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><head><script type="application/ld+json">{"@type":"Recipe"}</script></head></html>"#,
            "text/html",
        ))
        .mount(&server)
        .await;
    expect_import(&server, &recipe, 200).await;

    let dir = TempDir::new().unwrap();
    let harvester = create_harvester(&server, &dir, false, &[]);

    assert_eq!(harvester.start(None).await.unwrap(), StartAck::Started);
    let report = harvester.wait().await.unwrap().unwrap();

    assert_eq!(report.crawl.unwrap().recipes_found, 1);
    assert_eq!(report.export.unwrap().delivered, 1);
    assert_eq!(harvester.live_recipes().await, vec![recipe.clone()]);
    assert_eq!(harvester.download().await, format!("{}\n", recipe));
    assert_eq!(harvester.crawl_progress().status, RunStatus::Done);
    assert_eq!(harvester.export_progress().current_index, 1);
}

#[tokio::test]
async fn test_cancelled_crawl_skips_export_by_default() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let harvester = create_harvester(&server, &dir, false, &["https://example.com/recipes/a"]);

    harvester.start(None).await.unwrap();
    harvester.cancel_crawl();
    let report = harvester.wait().await.unwrap().unwrap();

    assert!(report.crawl.unwrap().cancelled);
    assert!(report.export.is_none());
    assert_eq!(harvester.export_progress().status, RunStatus::Idle);
}

#[tokio::test]
async fn test_cancelled_crawl_exports_when_allowed() {
    let server = MockServer::start().await;
    expect_import(&server, "https://example.com/recipes/a", 200).await;

    let dir = TempDir::new().unwrap();
    let harvester = create_harvester(&server, &dir, true, &["https://example.com/recipes/a"]);

    harvester.start(None).await.unwrap();
    harvester.cancel_crawl();
    let report = harvester.wait().await.unwrap().unwrap();

    assert!(report.crawl.unwrap().cancelled);
    assert_eq!(report.export.unwrap().delivered, 1);
    assert_eq!(harvester.export_progress().status, RunStatus::Done);
}

#[tokio::test]
async fn test_inline_destination_used_and_remembered() {
    let config_server = MockServer::start().await;
    let inline_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&config_server)
        .await;
    expect_import(&inline_server, "https://example.com/recipes/a", 200).await;

    let dir = TempDir::new().unwrap();
    let harvester = create_harvester(&config_server, &dir, false, &["https://example.com/recipes/a"]);
    let inline = destination(&inline_server, 0.0);

    harvester
        .start_with(PipelineMode::ExportOnly, Some(inline.clone()))
        .await
        .unwrap();
    harvester.wait().await.unwrap();

    let saved = load_destination(&dir.path().join("destination.toml")).unwrap();
    assert_eq!(saved, Some(inline));
}

#[tokio::test]
async fn test_store_failure_ends_pipeline_without_export() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recipes"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><body><a href="/recipes/dal">Dal</a></body></html>"#,
            "text/html",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/recipes/dal"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><head><script type="application/ld+json">{"@type":"Recipe"}</script></head></html>"#,
            "text/html",
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = harvester_config(&server, &dir, true);
    let store = RecipeStore::open(FullDiskLog).unwrap();
    let harvester = Harvester::new(config, store).unwrap();

    assert_eq!(harvester.start(None).await.unwrap(), StartAck::Started);
    let result = harvester.wait().await;

    assert!(matches!(result, Err(ScoutError::Storage(_))));
    assert!(!harvester.is_running());
    assert_eq!(harvester.crawl_progress().status, RunStatus::Done);
    assert_eq!(harvester.export_progress().status, RunStatus::Idle);
    assert!(harvester.stored_recipes().await.is_empty());
}
