//! Harvester: the process-wide context behind every pipeline run
//!
//! Owns the recipe store, both progress trackers, and the cancellation
//! tokens, and runs crawl-then-export as a single background task.

use crate::config::{load_destination, save_destination, Config, DestinationConfig};
use crate::crawler::{crawl, CrawlSummary};
use crate::export::{ExportSummary, Exporter};
use crate::output::render_recipe_list;
use crate::state::{ControlState, CrawlProgress, CrawlTracker, ExportProgress, ExportTracker, RunTokens};
use crate::storage::{open_store, RecipeStore};
use crate::ScoutError;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

/// Answer to a start request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartAck {
    Started,
    AlreadyRunning,
}

/// Which stages a run executes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PipelineMode {
    /// Crawl, then export the whole store
    #[default]
    Full,
    CrawlOnly,
    ExportOnly,
}

impl PipelineMode {
    fn crawls(self) -> bool {
        matches!(self, Self::Full | Self::CrawlOnly)
    }

    fn exports(self) -> bool {
        matches!(self, Self::Full | Self::ExportOnly)
    }
}

/// What one background run did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineReport {
    /// None when the mode skipped the crawl
    pub crawl: Option<CrawlSummary>,
    /// None when the export did not run
    pub export: Option<ExportSummary>,
}

struct Shared {
    config: Config,
    store: Arc<RecipeStore>,
    crawl: Arc<CrawlTracker>,
    exporter: Exporter,
    control: ControlState,
    running: AtomicBool,
    pipeline: Mutex<Option<JoinHandle<Result<PipelineReport, ScoutError>>>>,
}

/// Clears the running flag when a run ends, however it ends
struct RunningGuard(Arc<Shared>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.running.store(false, Ordering::SeqCst);
    }
}

/// Cheaply cloneable handle to the harvesting pipeline
///
/// # Example
///
/// ```no_run
/// use recipe_scout::config::load_config;
/// use recipe_scout::Harvester;
/// use std::path::Path;
///
/// # async fn run() -> Result<(), recipe_scout::ScoutError> {
/// let config = load_config(Path::new("recipe-scout.toml"))?;
/// let harvester = Harvester::open(config)?;
/// harvester.start(None).await?;
/// let report = harvester.wait().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Harvester {
    shared: Arc<Shared>,
}

impl Harvester {
    /// Opens the store named by `config.output.recipes-path` and builds a harvester
    pub fn open(config: Config) -> Result<Self, ScoutError> {
        let store = open_store(Path::new(&config.output.recipes_path))?;
        Self::new(config, store)
    }

    /// Builds a harvester around an already-opened store
    pub fn new(config: Config, store: RecipeStore) -> Result<Self, ScoutError> {
        let exporter = Exporter::with_default_client(Arc::new(ExportTracker::new()))?;
        Ok(Self {
            shared: Arc::new(Shared {
                config,
                store: Arc::new(store),
                crawl: Arc::new(CrawlTracker::new()),
                exporter,
                control: ControlState::new(),
                running: AtomicBool::new(false),
                pipeline: Mutex::new(None),
            }),
        })
    }

    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    pub fn store(&self) -> &Arc<RecipeStore> {
        &self.shared.store
    }

    /// Starts crawl-then-export in the background
    ///
    /// # Arguments
    ///
    /// * `destination` - Inline destination settings; validated and persisted
    ///   for later runs. When absent, the persisted settings are used, then
    ///   the `[destination]` table of the config file.
    ///
    /// # Returns
    ///
    /// * `Ok(StartAck::Started)` - A new run was launched
    /// * `Ok(StartAck::AlreadyRunning)` - A run is in progress; nothing changed
    /// * `Err(ScoutError)` - The inline destination was invalid or could not be saved
    pub async fn start(&self, destination: Option<DestinationConfig>) -> Result<StartAck, ScoutError> {
        self.start_with(PipelineMode::Full, destination).await
    }

    /// Same as [`start`](Self::start) with a choice of stages
    pub async fn start_with(
        &self,
        mode: PipelineMode,
        destination: Option<DestinationConfig>,
    ) -> Result<StartAck, ScoutError> {
        let mut pipeline = self.shared.pipeline.lock().await;

        if self
            .shared
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::info!("Start ignored: a run is already in progress");
            return Ok(StartAck::AlreadyRunning);
        }
        let guard = RunningGuard(Arc::clone(&self.shared));

        let destination = if mode.exports() {
            self.resolve_destination(destination)?
        } else {
            None
        };

        let tokens = self.shared.control.reset();
        let shared = Arc::clone(&self.shared);
        *pipeline = Some(tokio::spawn(async move {
            let _guard = guard;
            run_pipeline(&shared, mode, tokens, destination).await
        }));

        tracing::info!("Pipeline started ({:?})", mode);
        Ok(StartAck::Started)
    }

    /// Picks the destination for a run, persisting an inline one
    fn resolve_destination(
        &self,
        inline: Option<DestinationConfig>,
    ) -> Result<Option<DestinationConfig>, ScoutError> {
        let path = Path::new(&self.shared.config.output.destination_path);

        if let Some(destination) = inline {
            save_destination(path, &destination)?;
            return Ok(Some(destination));
        }

        match load_destination(path) {
            Ok(Some(destination)) => return Ok(Some(destination)),
            Ok(None) => {}
            Err(e) => tracing::warn!(
                "Ignoring unreadable destination settings at {}: {}",
                path.display(),
                e
            ),
        }

        Ok(self.shared.config.destination.clone())
    }

    /// Cancels both pipelines; idempotent
    pub fn cancel(&self) {
        tracing::info!("Cancellation requested");
        self.shared.control.cancel();
    }

    pub fn cancel_crawl(&self) {
        self.shared.control.cancel_crawl();
    }

    pub fn cancel_export(&self) {
        self.shared.control.cancel_export();
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    pub fn crawl_progress(&self) -> CrawlProgress {
        self.shared.crawl.snapshot()
    }

    pub fn export_progress(&self) -> ExportProgress {
        self.shared.exporter.progress().snapshot()
    }

    pub fn subscribe_crawl(&self) -> watch::Receiver<CrawlProgress> {
        self.shared.crawl.subscribe()
    }

    pub fn subscribe_export(&self) -> watch::Receiver<ExportProgress> {
        self.shared.exporter.progress().subscribe()
    }

    /// Recipes confirmed during the current or most recent run
    pub async fn live_recipes(&self) -> Vec<String> {
        self.shared.store.live().await
    }

    /// Every recipe ever confirmed, in store order
    pub async fn stored_recipes(&self) -> Vec<String> {
        self.shared.store.snapshot().await
    }

    /// The store contents as newline-delimited plain text
    pub async fn download(&self) -> String {
        render_recipe_list(&self.shared.store.snapshot().await)
    }

    /// Waits for the background run to finish
    ///
    /// # Returns
    ///
    /// * `Ok(Some(report))` - The run that was in progress (or last started) ended
    /// * `Ok(None)` - No run was started since the last wait
    /// * `Err(ScoutError)` - The run failed on a store write or panicked
    pub async fn wait(&self) -> Result<Option<PipelineReport>, ScoutError> {
        let handle = self.shared.pipeline.lock().await.take();
        match handle {
            Some(handle) => Ok(Some(handle.await??)),
            None => Ok(None),
        }
    }
}

async fn run_pipeline(
    shared: &Shared,
    mode: PipelineMode,
    tokens: RunTokens,
    destination: Option<DestinationConfig>,
) -> Result<PipelineReport, ScoutError> {
    let mut report = PipelineReport::default();

    if mode.crawls() {
        let summary = crawl(
            &shared.config.crawler,
            Arc::clone(&shared.store),
            Arc::clone(&shared.crawl),
            tokens.crawl.clone(),
        )
        .await;

        let summary = match summary {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!("Crawl failed: {}", e);
                return Err(e);
            }
        };
        let cancelled = summary.cancelled;
        report.crawl = Some(summary);

        if cancelled && mode.exports() && !shared.config.pipeline.export_after_cancelled_crawl {
            tracing::info!("Export skipped: crawl was cancelled");
            return Ok(report);
        }
    }

    if mode.exports() {
        let destination = destination.unwrap_or_else(|| DestinationConfig::new("", "", 0.0));
        let summary = shared
            .exporter
            .push_all(&destination, &shared.store, &tokens.export)
            .await;
        report.export = Some(summary);
    }

    Ok(report)
}
