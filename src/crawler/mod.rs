//! Crawler module for recipe discovery
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a politeness delay
//! - HTML parsing and link extraction
//! - JSON-LD recipe classification
//! - The shared frontier and its worker pool

mod classifier;
mod coordinator;
mod fetcher;
mod frontier;
mod parser;

pub use classifier::{is_recipe, RecipeClassifier};
pub use coordinator::{Coordinator, CrawlSummary};
pub use fetcher::{build_http_client, fetch_url, FetchResult, Fetcher};
pub use frontier::{Claim, Frontier, FrontierStats};
pub use parser::{extract_links, LinkExtractor};

use crate::config::CrawlerConfig;
use crate::state::CrawlTracker;
use crate::storage::RecipeStore;
use crate::ScoutError;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl operation
///
/// This is the main entry point for a crawl. It will:
/// 1. Build the HTTP client and site scope
/// 2. Seed the frontier with the start URL
/// 3. Fetch pages and route their links across the worker pool
/// 4. Confirm recipe candidates and append them to the store
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `store` - Recipe store shared with the export pipeline
/// * `progress` - Tracker the run reports into
/// * `cancel` - Stops the run at the next safe point when fired
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Crawl drained or was cancelled
/// * `Err(ScoutError)` - Setup failed or the store could not be written
pub async fn crawl(
    config: &CrawlerConfig,
    store: Arc<RecipeStore>,
    progress: Arc<CrawlTracker>,
    cancel: CancellationToken,
) -> Result<CrawlSummary, ScoutError> {
    Coordinator::new(config, store, progress)?.run(cancel).await
}
