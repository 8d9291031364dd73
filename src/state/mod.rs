//! State module for tracking pipeline progress and cancellation
//!
//! # Components
//!
//! - `RunStatus`: idle / running / done lifecycle shared by crawl and export
//! - `CrawlTracker` / `ExportTracker`: progress counters behind watch channels
//! - `ControlState`: the two cancellation tokens, reset per run

mod control;
mod progress;
mod run_status;

// Re-export main types
pub use control::{ControlState, RunTokens};
pub use progress::{CrawlProgress, CrawlTracker, ExportProgress, ExportTracker};
pub use run_status::RunStatus;
