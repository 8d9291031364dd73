//! Storage traits and error types
//!
//! This module defines the trait interface for recipe log backends and
//! associated error types.

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid entry {0:?}: entries must be a single non-empty line")]
    InvalidEntry(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Append-only log of confirmed recipe URLs
///
/// Implementations must make `append` durable before returning: once it
/// returns `Ok`, the entry survives a crash.
pub trait RecipeLog: Send {
    /// Reads every entry in append order
    fn load(&mut self) -> StorageResult<Vec<String>>;

    /// Durably appends one entry
    fn append(&mut self, entry: &str) -> StorageResult<()>;

    /// Removes every entry
    fn clear(&mut self) -> StorageResult<()>;
}

/// Checks that an entry can be stored as one line
pub(crate) fn validate_entry(entry: &str) -> StorageResult<()> {
    if entry.trim().is_empty() || entry.contains('\n') || entry.contains('\r') {
        return Err(StorageError::InvalidEntry(entry.to_string()));
    }
    Ok(())
}
