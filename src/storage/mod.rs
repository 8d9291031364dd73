//! Storage module for persisting confirmed recipes
//!
//! This module handles the durable recipe list, including:
//! - The `RecipeLog` backend trait and its line-delimited file implementation
//! - The `RecipeStore` dedup set that doubles as crawl resume state

mod file_log;
mod store;
mod traits;

pub use file_log::{FileRecipeLog, MemoryRecipeLog};
pub use store::RecipeStore;
pub use traits::{RecipeLog, StorageError, StorageResult};

use crate::ScoutError;
use std::path::Path;

/// Opens the recipe store backed by the file at `path`
///
/// # Arguments
///
/// * `path` - Path to the line-delimited recipe file
///
/// # Returns
///
/// * `Ok(RecipeStore)` - Store with every prior entry loaded
/// * `Err(ScoutError)` - The file could not be created or read
pub fn open_store(path: &Path) -> Result<RecipeStore, ScoutError> {
    let log = FileRecipeLog::open(path)?;
    Ok(RecipeStore::open(log)?)
}
