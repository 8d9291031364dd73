//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the worker pool that drives one crawl run:
//! - Seeding the frontier with the start URL
//! - Spawning a fixed number of workers
//! - Fetching pages, extracting links, and routing each link
//! - Confirming recipe candidates and recording them in the store
//! - Stopping on drain, cancellation, or a store failure

use crate::config::CrawlerConfig;
use crate::crawler::classifier::RecipeClassifier;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::{Claim, Frontier, FrontierStats};
use crate::crawler::parser::LinkExtractor;
use crate::state::CrawlTracker;
use crate::storage::RecipeStore;
use crate::url::{canonicalize_str, LinkKind, SiteScope};
use crate::ScoutError;
use scraper::Html;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Pages between progress log lines
const PROGRESS_LOG_INTERVAL: u64 = 25;

/// Outcome of one crawl run
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlSummary {
    pub pages_fetched: u64,
    pub recipes_found: u64,
    /// True if the run stopped because its cancellation token fired
    pub cancelled: bool,
    pub frontier: FrontierStats,
    pub elapsed: Duration,
}

/// State shared by every worker of one run
struct CrawlContext {
    start_url: Url,
    scope: SiteScope,
    fetcher: Fetcher,
    extractor: LinkExtractor,
    classifier: RecipeClassifier,
    frontier: Frontier,
    store: Arc<RecipeStore>,
    progress: Arc<CrawlTracker>,
    /// Recipe candidates already claimed for a confirmation fetch this run
    checked: Mutex<HashSet<String>>,
    claim_timeout: Duration,
    started: Instant,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    ctx: Arc<CrawlContext>,
    workers: usize,
}

impl Coordinator {
    /// Creates a coordinator for one run
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `store` - Recipe store, already loaded with prior runs' entries
    /// * `progress` - Tracker the run reports into
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(ScoutError)` - Bad start URL or HTTP client setup failure
    pub fn new(
        config: &CrawlerConfig,
        store: Arc<RecipeStore>,
        progress: Arc<CrawlTracker>,
    ) -> Result<Self, ScoutError> {
        let fetcher = Fetcher::from_config(config)?;
        Self::with_fetcher(config, fetcher, store, progress)
    }

    /// Creates a coordinator around an existing fetcher
    pub fn with_fetcher(
        config: &CrawlerConfig,
        fetcher: Fetcher,
        store: Arc<RecipeStore>,
        progress: Arc<CrawlTracker>,
    ) -> Result<Self, ScoutError> {
        let start_url = canonicalize_str(&config.start_url)?;
        let scope = SiteScope::from_start_url(&config.start_url, &config.recipe_path_prefix)?;

        let ctx = CrawlContext {
            start_url,
            scope,
            fetcher,
            extractor: LinkExtractor::new()?,
            classifier: RecipeClassifier::new()?,
            frontier: Frontier::new(),
            store,
            progress,
            checked: Mutex::new(HashSet::new()),
            claim_timeout: config.claim_timeout(),
            started: Instant::now(),
        };

        Ok(Self {
            ctx: Arc::new(ctx),
            workers: config.max_concurrency.max(1) as usize,
        })
    }

    /// Runs the crawl until the frontier drains or `cancel` fires
    ///
    /// Progress moves to `running` on entry and to `done` on every exit
    /// path, including cancellation and errors. A store failure in any
    /// worker stops the remaining workers and is returned.
    pub async fn run(self, cancel: CancellationToken) -> Result<CrawlSummary, ScoutError> {
        let ctx = self.ctx;
        ctx.progress.begin();
        ctx.store.begin_run().await;

        tracing::info!(
            "Starting crawl at {} with {} workers",
            ctx.start_url,
            self.workers
        );
        ctx.frontier.seed(ctx.start_url.clone());

        // Workers stop on external cancellation or when a sibling fails
        let stop = cancel.child_token();
        let mut workers = JoinSet::new();
        for id in 0..self.workers {
            let ctx = Arc::clone(&ctx);
            let stop = stop.clone();
            workers.spawn(async move { ctx.run_worker(id, stop).await });
        }

        let mut failure: Option<ScoutError> = None;
        while let Some(joined) = workers.join_next().await {
            let result = match joined {
                Ok(result) => result,
                Err(e) => Err(ScoutError::from(e)),
            };
            if let Err(e) = result {
                tracing::error!("Crawl worker failed, stopping run: {}", e);
                stop.cancel();
                failure.get_or_insert(e);
            }
        }

        ctx.progress.finish();

        if let Some(e) = failure {
            return Err(e);
        }

        let progress = ctx.progress.snapshot();
        let summary = CrawlSummary {
            pages_fetched: progress.pages_fetched,
            recipes_found: progress.recipes_found,
            cancelled: cancel.is_cancelled(),
            frontier: ctx.frontier.stats(),
            elapsed: ctx.started.elapsed(),
        };

        if summary.cancelled {
            tracing::info!(
                "Crawl cancelled: {} pages fetched, {} recipes found, {} URLs left in frontier",
                summary.pages_fetched,
                summary.recipes_found,
                summary.frontier.queued
            );
        } else {
            tracing::info!(
                "Crawl completed: {} pages fetched, {} recipes found in {:?}",
                summary.pages_fetched,
                summary.recipes_found,
                summary.elapsed
            );
        }

        Ok(summary)
    }
}

impl CrawlContext {
    async fn run_worker(&self, id: usize, stop: CancellationToken) -> Result<(), ScoutError> {
        loop {
            let claim = tokio::select! {
                biased;
                _ = stop.cancelled() => {
                    tracing::debug!("Worker {} observed cancellation", id);
                    return Ok(());
                }
                claim = self.frontier.claim(self.claim_timeout) => claim,
            };

            match claim {
                Claim::Url(url) => {
                    let result = self.process_page(&url, &stop).await;
                    self.frontier.complete();
                    result?;
                }
                Claim::Idle => continue,
                Claim::Drained => {
                    tracing::debug!("Worker {} finished: frontier drained", id);
                    return Ok(());
                }
            }
        }
    }

    /// Fetches one frontier page and routes every link on it
    async fn process_page(&self, url: &Url, stop: &CancellationToken) -> Result<(), ScoutError> {
        let pages = self.progress.record_page();
        if pages % PROGRESS_LOG_INTERVAL == 0 {
            self.log_progress(pages);
        }

        tracing::debug!("Fetching {}", url);
        let body = match self.fetcher.fetch(url.as_str(), stop).await.into_body() {
            Some(body) => body,
            None => return Ok(()),
        };

        let links: Vec<Url> = {
            let document = Html::parse_document(&body);
            self.extractor.links(&document, url).collect()
        };

        for link in links {
            match self.scope.classify(&link) {
                LinkKind::RecipeCandidate => {
                    if stop.is_cancelled() {
                        break;
                    }
                    self.check_candidate(&link, stop).await?;
                }
                LinkKind::Internal => {
                    if self.frontier.enqueue(link.clone()) {
                        tracing::trace!("Queued {}", link);
                    }
                }
                LinkKind::External => {}
            }
        }

        Ok(())
    }

    /// Confirms a recipe candidate and records it
    ///
    /// Candidates already in the store are skipped without a fetch. Each
    /// remaining candidate is fetched at most once per run, by whichever
    /// worker claims it first.
    async fn check_candidate(&self, url: &Url, stop: &CancellationToken) -> Result<(), ScoutError> {
        let key = url.as_str();
        if self.store.contains(key).await {
            return Ok(());
        }

        let first_claim = self
            .checked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string());
        if !first_claim {
            return Ok(());
        }

        let html = match self.fetcher.fetch(key, stop).await.into_body() {
            Some(html) => html,
            None => return Ok(()),
        };

        if !self.classifier.is_recipe(&html) {
            tracing::debug!("Not a recipe (no Recipe JSON-LD): {}", url);
            return Ok(());
        }

        if self.store.record(key).await? {
            let found = self.progress.record_recipe();
            tracing::info!("Recipe #{} found: {}", found, url);
        }

        Ok(())
    }

    fn log_progress(&self, pages: u64) {
        let elapsed = self.started.elapsed();
        let rate = pages as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
        let stats = self.frontier.stats();
        tracing::info!(
            "Progress: {} pages fetched, {} recipes found, {} in frontier, {:.2} pages/sec",
            pages,
            self.progress.snapshot().recipes_found,
            stats.queued,
            rate
        );
    }
}
