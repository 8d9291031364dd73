//! Import API client
//!
//! Replays the recipe store against the destination one entry at a time:
//! - A JSON `{"url": ...}` POST per entry with bearer authentication
//! - A fixed pause between consecutive pushes
//! - Cancellation checked before every push and during every pause

use crate::config::DestinationConfig;
use crate::state::ExportTracker;
use crate::storage::RecipeStore;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Total time allowed for one import request
pub const IMPORT_TIMEOUT: Duration = Duration::from_secs(30);

/// Body of one import request
#[derive(Debug, Serialize)]
struct ImportRequest<'a> {
    url: &'a str,
}

/// Result of a single push
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// The destination answered 2xx
    Delivered,

    /// The destination answered with any other status
    Rejected {
        /// The HTTP status code
        status_code: u16,
    },

    /// The request never got a response
    TransportError {
        /// Error description
        error: String,
    },
}

/// Outcome of one export run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Entries a push was issued for
    pub attempted: u64,
    pub delivered: u64,
    pub failed: u64,
    /// True if the run stopped before attempting every entry
    pub cancelled: bool,
}

/// Sequential, rate-limited pusher
#[derive(Debug, Clone)]
pub struct Exporter {
    client: Client,
    progress: Arc<ExportTracker>,
}

/// Builds the HTTP client used for the import API
pub fn build_import_client() -> Result<Client, reqwest::Error> {
    Client::builder().timeout(IMPORT_TIMEOUT).build()
}

impl Exporter {
    pub fn new(client: Client, progress: Arc<ExportTracker>) -> Self {
        Self { client, progress }
    }

    /// Creates an exporter with the default import client
    pub fn with_default_client(progress: Arc<ExportTracker>) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_import_client()?, progress))
    }

    pub fn progress(&self) -> &Arc<ExportTracker> {
        &self.progress
    }

    /// Pushes every stored recipe to `destination`, in store order
    ///
    /// Progress is reset and moved to `running` on entry and always ends in
    /// `done`. An unconfigured destination or an empty store finishes at
    /// once with a total of 0. Failed pushes are logged and counted; they
    /// never stop the run. A stop before the end leaves `current_index`
    /// below `total`.
    ///
    /// # Arguments
    ///
    /// * `destination` - Endpoint, credential, and pause between pushes
    /// * `store` - Source of the entries; a snapshot is taken up front
    /// * `cancel` - Stops the run before the next push when fired
    pub async fn push_all(
        &self,
        destination: &DestinationConfig,
        store: &RecipeStore,
        cancel: &CancellationToken,
    ) -> ExportSummary {
        self.progress.begin();
        let summary = self.push_entries(destination, store, cancel).await;
        self.progress.finish();

        tracing::info!(
            "Export finished: {} attempted, {} delivered, {} failed{}",
            summary.attempted,
            summary.delivered,
            summary.failed,
            if summary.cancelled { " (cancelled)" } else { "" }
        );
        summary
    }

    async fn push_entries(
        &self,
        destination: &DestinationConfig,
        store: &RecipeStore,
        cancel: &CancellationToken,
    ) -> ExportSummary {
        let mut summary = ExportSummary::default();

        if !destination.is_configured() {
            tracing::warn!("Export skipped: destination endpoint or credential missing");
            return summary;
        }

        let entries = store.snapshot().await;
        if entries.is_empty() {
            tracing::info!("Export skipped: no stored recipes");
            return summary;
        }

        self.progress.set_total(entries.len() as u64);
        tracing::info!(
            "Exporting {} recipes to {}",
            entries.len(),
            destination.endpoint
        );

        let pause = destination.rate_limit();
        let last = entries.len() - 1;

        for (i, entry) in entries.iter().enumerate() {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            let outcome = self.push(destination, entry).await;
            summary.attempted += 1;
            match outcome {
                PushOutcome::Delivered => {
                    summary.delivered += 1;
                    tracing::debug!("Pushed {}", entry);
                }
                PushOutcome::Rejected { status_code } => {
                    summary.failed += 1;
                    tracing::warn!("Push of {} rejected with HTTP {}", entry, status_code);
                }
                PushOutcome::TransportError { error } => {
                    summary.failed += 1;
                    tracing::warn!("Push of {} failed: {}", entry, error);
                }
            }
            self.progress.advance();

            if i < last {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        summary.cancelled = true;
                        break;
                    }
                    _ = tokio::time::sleep(pause) => {}
                }
            }
        }

        summary
    }

    /// Issues one import request
    pub async fn push(&self, destination: &DestinationConfig, url: &str) -> PushOutcome {
        let response = self
            .client
            .post(&destination.endpoint)
            .bearer_auth(&destination.credential)
            .json(&ImportRequest { url })
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => PushOutcome::Delivered,
            Ok(response) => PushOutcome::Rejected {
                status_code: response.status().as_u16(),
            },
            Err(e) => PushOutcome::TransportError {
                error: if e.is_timeout() {
                    "Request timeout".to_string()
                } else {
                    e.to_string()
                },
            },
        }
    }
}
