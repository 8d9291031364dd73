//! Statistics over the recipe store
//!
//! This module provides functionality for summarizing what has been
//! harvested so far, without crawling.

use crate::config::{load_destination, Config};
use crate::storage::RecipeStore;
use crate::url::extract_authority;
use std::collections::BTreeMap;
use std::path::Path;
use url::Url;

/// Store statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct StoreStatistics {
    /// Number of confirmed recipes on disk
    pub total_recipes: u64,

    /// Recipes per site authority
    pub recipes_by_site: BTreeMap<String, u64>,

    /// Path of the recipe list
    pub recipes_path: String,

    /// Endpoint the next export would use, if any
    pub destination_endpoint: Option<String>,
}

/// Computes statistics for a loaded store
///
/// # Arguments
///
/// * `config` - Configuration naming the output files
/// * `store` - The loaded recipe store
pub async fn load_statistics(config: &Config, store: &RecipeStore) -> StoreStatistics {
    let entries = store.snapshot().await;

    let mut recipes_by_site = BTreeMap::new();
    for entry in &entries {
        let site = Url::parse(entry)
            .ok()
            .and_then(|url| extract_authority(&url))
            .unwrap_or_else(|| "(unparseable)".to_string());
        *recipes_by_site.entry(site).or_insert(0) += 1;
    }

    let destination = load_destination(Path::new(&config.output.destination_path))
        .ok()
        .flatten()
        .or_else(|| config.destination.clone())
        .filter(|d| d.is_configured());

    StoreStatistics {
        total_recipes: entries.len() as u64,
        recipes_by_site,
        recipes_path: config.output.recipes_path.clone(),
        destination_endpoint: destination.map(|d| d.endpoint),
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Recipe Store Statistics ===\n");

    println!("Overview:");
    println!("  Recipe file: {}", stats.recipes_path);
    println!("  Total recipes: {}", stats.total_recipes);
    println!();

    if !stats.recipes_by_site.is_empty() {
        println!("Recipes by Site:");
        let mut site_counts: Vec<_> = stats.recipes_by_site.iter().collect();
        site_counts.sort_by(|a, b| b.1.cmp(a.1));

        for (site, count) in site_counts {
            let percentage = (*count as f64 / stats.total_recipes as f64) * 100.0;
            println!("  {}: {} ({:.1}%)", site, count, percentage);
        }
        println!();
    }

    match &stats.destination_endpoint {
        Some(endpoint) => println!("Export destination: {}", endpoint),
        None => println!("Export destination: not configured"),
    }
}
