//! End-of-run summary formatting

use crate::harvester::PipelineReport;
use crate::state::{CrawlProgress, ExportProgress};

/// Formats a finished run for the terminal
///
/// # Arguments
///
/// * `report` - What the run did
/// * `crawl` - Final crawl progress snapshot
/// * `export` - Final export progress snapshot
///
/// # Returns
///
/// A multi-line summary; stages that did not run are left out
pub fn format_run_report(
    report: &PipelineReport,
    crawl: &CrawlProgress,
    export: &ExportProgress,
) -> String {
    let mut out = String::new();

    out.push_str("=== Recipe-Scout Run Summary ===\n\n");

    if let Some(summary) = &report.crawl {
        out.push_str("Crawl:\n");
        out.push_str(&format!(
            "  Status: {}{}\n",
            crawl.status,
            if summary.cancelled { " (cancelled)" } else { "" }
        ));
        out.push_str(&format!("  Pages fetched: {}\n", summary.pages_fetched));
        out.push_str(&format!("  Recipes found: {}\n", summary.recipes_found));
        out.push_str(&format!("  Pages visited: {}\n", summary.frontier.visited));
        if summary.frontier.queued > 0 {
            out.push_str(&format!("  Left in frontier: {}\n", summary.frontier.queued));
        }
        out.push_str(&format!(
            "  Duration: {:.1} seconds\n",
            summary.elapsed.as_secs_f64()
        ));
        out.push('\n');
    }

    match &report.export {
        Some(summary) => {
            out.push_str("Export:\n");
            out.push_str(&format!("  Status: {}\n", export.status));
            out.push_str(&format!(
                "  Progress: {} / {}\n",
                export.current_index, export.total
            ));
            out.push_str(&format!("  Delivered: {}\n", summary.delivered));
            out.push_str(&format!("  Failed: {}\n", summary.failed));
            if summary.cancelled {
                out.push_str("  Stopped early: cancelled\n");
            }
        }
        None if report.crawl.as_ref().is_some_and(|c| c.cancelled) => {
            out.push_str("Export: skipped (crawl was cancelled)\n");
        }
        None => {}
    }

    out
}
