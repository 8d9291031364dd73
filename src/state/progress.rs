//! Progress counters for the crawl and export pipelines
//!
//! Each tracker owns a `watch` channel: the pipeline mutates the value in
//! place, readers take cloned snapshots or subscribe to changes.

use crate::state::RunStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;

/// Snapshot of crawl progress
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CrawlProgress {
    /// Frontier pages claimed this run, whether or not the fetch succeeded
    pub pages_fetched: u64,

    /// Recipes confirmed and stored during this run
    pub recipes_found: u64,

    pub status: RunStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Snapshot of export progress
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExportProgress {
    /// Number of entries attempted so far (never exceeds `total`)
    pub current_index: u64,

    /// Size of the store snapshot being exported
    pub total: u64,

    pub status: RunStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ExportProgress {
    /// Returns true if the last export ended before attempting every entry
    pub fn stopped_early(&self) -> bool {
        self.status.is_done() && self.current_index < self.total
    }
}

/// Writer side of [`CrawlProgress`]
#[derive(Debug)]
pub struct CrawlTracker {
    tx: watch::Sender<CrawlProgress>,
}

impl Default for CrawlTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(CrawlProgress::default());
        Self { tx }
    }

    pub fn snapshot(&self) -> CrawlProgress {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CrawlProgress> {
        self.tx.subscribe()
    }

    /// Resets the counters and moves to `Running`
    pub fn begin(&self) {
        self.tx.send_replace(CrawlProgress {
            status: RunStatus::Running,
            started_at: Some(Utc::now()),
            ..CrawlProgress::default()
        });
    }

    /// Counts one claimed page and returns the new total
    pub fn record_page(&self) -> u64 {
        let mut pages = 0;
        self.tx.send_modify(|p| {
            p.pages_fetched += 1;
            pages = p.pages_fetched;
        });
        pages
    }

    /// Counts one newly confirmed recipe and returns the new total
    pub fn record_recipe(&self) -> u64 {
        let mut recipes = 0;
        self.tx.send_modify(|p| {
            p.recipes_found += 1;
            recipes = p.recipes_found;
        });
        recipes
    }

    /// Moves to `Done`
    pub fn finish(&self) {
        self.tx.send_modify(|p| {
            p.status = RunStatus::Done;
            p.finished_at = Some(Utc::now());
        });
    }
}

/// Writer side of [`ExportProgress`]
#[derive(Debug)]
pub struct ExportTracker {
    tx: watch::Sender<ExportProgress>,
}

impl Default for ExportTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ExportProgress::default());
        Self { tx }
    }

    pub fn snapshot(&self) -> ExportProgress {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ExportProgress> {
        self.tx.subscribe()
    }

    /// Resets index and total and moves to `Running`
    pub fn begin(&self) {
        self.tx.send_replace(ExportProgress {
            status: RunStatus::Running,
            started_at: Some(Utc::now()),
            ..ExportProgress::default()
        });
    }

    pub fn set_total(&self, total: u64) {
        self.tx.send_modify(|p| p.total = total);
    }

    /// Records one attempted entry; the index is clamped to `total`
    pub fn advance(&self) -> u64 {
        let mut index = 0;
        self.tx.send_modify(|p| {
            p.current_index = (p.current_index + 1).min(p.total);
            index = p.current_index;
        });
        index
    }

    /// Moves to `Done`
    pub fn finish(&self) {
        self.tx.send_modify(|p| {
            p.status = RunStatus::Done;
            p.finished_at = Some(Utc::now());
        });
    }
}
