//! Cancellation flags for the crawl and export pipelines
//!
//! Each pipeline has its own token. Cancelling is sticky for the run that
//! holds the token; starting a new run swaps in fresh tokens, which is how
//! the flags are reset.

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Tokens handed to one crawl-then-export run
#[derive(Debug, Clone)]
pub struct RunTokens {
    pub crawl: CancellationToken,
    pub export: CancellationToken,
}

/// Owner of the current cancellation tokens
#[derive(Debug)]
pub struct ControlState {
    crawl: watch::Sender<CancellationToken>,
    export: watch::Sender<CancellationToken>,
}

impl Default for ControlState {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlState {
    pub fn new() -> Self {
        let (crawl, _) = watch::channel(CancellationToken::new());
        let (export, _) = watch::channel(CancellationToken::new());
        Self { crawl, export }
    }

    /// Replaces both tokens with uncancelled ones and returns them
    pub fn reset(&self) -> RunTokens {
        let tokens = RunTokens {
            crawl: CancellationToken::new(),
            export: CancellationToken::new(),
        };
        self.crawl.send_replace(tokens.crawl.clone());
        self.export.send_replace(tokens.export.clone());
        tokens
    }

    /// Cancels both pipelines; idempotent
    pub fn cancel(&self) {
        self.cancel_crawl();
        self.cancel_export();
    }

    pub fn cancel_crawl(&self) {
        self.crawl.borrow().cancel();
    }

    pub fn cancel_export(&self) {
        self.export.borrow().cancel();
    }

    pub fn is_crawl_cancelled(&self) -> bool {
        self.crawl.borrow().is_cancelled()
    }

    pub fn is_export_cancelled(&self) -> bool {
        self.export.borrow().is_cancelled()
    }
}
