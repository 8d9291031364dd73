//! Output module for recipe listings and run reports
//!
//! This module handles:
//! - Rendering the stored recipe list as plain text
//! - Formatting end-of-run summaries for the terminal
//! - Computing and printing store statistics

mod report;
pub mod stats;

pub use report::format_run_report;
pub use stats::{load_statistics, print_statistics, StoreStatistics};

/// Renders recipe URLs as newline-delimited plain text
///
/// Each entry is followed by a newline; an empty list renders as an empty
/// string.
///
/// # Example
///
/// ```
/// use recipe_scout::output::render_recipe_list;
///
/// let entries = vec!["https://example.com/recipes/soup".to_string()];
/// assert_eq!(render_recipe_list(&entries), "https://example.com/recipes/soup\n");
/// ```
pub fn render_recipe_list(entries: &[String]) -> String {
    let mut text = String::with_capacity(entries.iter().map(|e| e.len() + 1).sum());
    for entry in entries {
        text.push_str(entry);
        text.push('\n');
    }
    text
}
