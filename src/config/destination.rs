//! Persisted destination settings
//!
//! The last destination a run was started with is written to a small TOML
//! record so that later runs (and restarts) can reuse it without passing it
//! again.

use crate::config::types::DestinationConfig;
use crate::config::validation::validate_destination;
use crate::ConfigError;
use std::path::Path;

/// Loads persisted destination settings
///
/// # Returns
///
/// * `Ok(Some(DestinationConfig))` - Settings were found and are valid
/// * `Ok(None)` - No settings have been saved yet
/// * `Err(ConfigError)` - The file exists but could not be read or is invalid
pub fn load_destination(path: &Path) -> Result<Option<DestinationConfig>, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let destination: DestinationConfig = toml::from_str(&content)?;
    validate_destination(&destination)?;
    Ok(Some(destination))
}

/// Validates and persists destination settings, replacing any previous record
///
/// The record is written to a sibling temp file and renamed into place so a
/// crash mid-write never leaves a truncated record behind.
pub fn save_destination(path: &Path, destination: &DestinationConfig) -> Result<(), ConfigError> {
    validate_destination(destination)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let content = toml::to_string(destination)?;
    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;

    tracing::debug!("Saved destination settings to {}", path.display());
    Ok(())
}
