//! Line-delimited recipe log backends

use crate::storage::traits::{validate_entry, RecipeLog, StorageResult};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use url::Url;

/// Recipe log stored as a text file, one URL per line
///
/// The file is opened in append mode, so a crash can at worst leave a
/// partial final line. That tail is cut off on open, before anything new
/// is appended behind it.
#[derive(Debug)]
pub struct FileRecipeLog {
    path: PathBuf,
    file: File,
}

impl FileRecipeLog {
    /// Opens (creating if needed) the log file and its parent directory
    ///
    /// A final line without its newline is an interrupted append and is
    /// truncated away.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(path)?;

        let mut log = Self {
            path: path.to_path_buf(),
            file,
        };
        log.truncate_partial_tail()?;
        Ok(log)
    }

    fn read_all(&mut self) -> StorageResult<Vec<u8>> {
        self.file.seek(SeekFrom::Start(0))?;
        let mut bytes = Vec::new();
        self.file.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    fn truncate_partial_tail(&mut self) -> StorageResult<()> {
        let bytes = self.read_all()?;
        let complete = bytes
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1);

        if complete < bytes.len() {
            tracing::warn!(
                "Discarding interrupted write at end of {}: {:?}",
                self.path.display(),
                String::from_utf8_lossy(&bytes[complete..])
            );
            self.file.set_len(complete as u64)?;
            self.file.sync_data()?;
        }
        Ok(())
    }
}

/// Stored entries must be absolute http(s) URLs
fn is_http_url(entry: &str) -> bool {
    Url::parse(entry)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
        .unwrap_or(false)
}

impl RecipeLog for FileRecipeLog {
    fn load(&mut self) -> StorageResult<Vec<String>> {
        let bytes = self.read_all()?;
        let mut entries = Vec::new();
        for line in String::from_utf8_lossy(&bytes).lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if !is_http_url(trimmed) {
                tracing::warn!(
                    "Skipping malformed entry in {}: {:?}",
                    self.path.display(),
                    trimmed
                );
                continue;
            }
            entries.push(trimmed.to_string());
        }
        Ok(entries)
    }

    fn append(&mut self, entry: &str) -> StorageResult<()> {
        validate_entry(entry)?;
        self.file.write_all(format!("{}\n", entry).as_bytes())?;
        self.file.flush()?;
        self.file.sync_data()?;
        Ok(())
    }

    fn clear(&mut self) -> StorageResult<()> {
        self.file.set_len(0)?;
        self.file.sync_data()?;
        Ok(())
    }
}

/// In-memory recipe log, for tests and dry runs
#[derive(Debug, Default, Clone)]
pub struct MemoryRecipeLog {
    entries: Vec<String>,
}

impl MemoryRecipeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a log that already holds `entries`, as if left by an earlier run
    pub fn with_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }
}

impl RecipeLog for MemoryRecipeLog {
    fn load(&mut self) -> StorageResult<Vec<String>> {
        Ok(self.entries.clone())
    }

    fn append(&mut self, entry: &str) -> StorageResult<()> {
        validate_entry(entry)?;
        self.entries.push(entry.to_string());
        Ok(())
    }

    fn clear(&mut self) -> StorageResult<()> {
        self.entries.clear();
        Ok(())
    }
}
