//! Recipe store: the deduplicated, durable set of confirmed recipe URLs

use crate::storage::traits::{RecipeLog, StorageError, StorageResult};
use std::collections::HashSet;
use std::sync::{Arc, PoisonError};
use tokio::sync::Mutex;

type SharedLog = Arc<std::sync::Mutex<Box<dyn RecipeLog>>>;

/// Runs a blocking log operation on the blocking pool
async fn with_log<T, F>(log: &SharedLog, op: F) -> StorageResult<T>
where
    T: Send + 'static,
    F: FnOnce(&mut Box<dyn RecipeLog>) -> StorageResult<T> + Send + 'static,
{
    let log = Arc::clone(log);
    tokio::task::spawn_blocking(move || {
        let mut log = log.lock().unwrap_or_else(PoisonError::into_inner);
        op(&mut log)
    })
    .await
    .map_err(|e| StorageError::Io(std::io::Error::other(e)))?
}

struct StoreInner {
    /// Only touched while the store lock is held
    log: SharedLog,
    known: HashSet<String>,
    /// Every stored entry, in append order
    entries: Vec<String>,
    /// Entries recorded since the last `begin_run`
    live: Vec<String>,
}

/// Single source of truth for every recipe ever confirmed
///
/// The whole log is loaded on open, so `contains` is correct before the
/// first fetch of a resumed crawl. `record` checks and appends under one
/// lock, so two workers confirming the same URL can never both append it.
/// The append itself runs on the blocking pool.
pub struct RecipeStore {
    inner: Mutex<StoreInner>,
}

impl RecipeStore {
    /// Opens a store over `log`, loading all prior entries
    ///
    /// Duplicate lines left by older tools are collapsed to their first
    /// occurrence.
    pub fn open(mut log: impl RecipeLog + 'static) -> StorageResult<Self> {
        let mut known = HashSet::new();
        let mut entries = Vec::new();
        for entry in log.load()? {
            if known.insert(entry.clone()) {
                entries.push(entry);
            }
        }

        tracing::debug!("Loaded {} stored recipes", entries.len());
        let log: Box<dyn RecipeLog> = Box::new(log);

        Ok(Self {
            inner: Mutex::new(StoreInner {
                log: Arc::new(std::sync::Mutex::new(log)),
                known,
                entries,
                live: Vec::new(),
            }),
        })
    }

    /// Records a confirmed recipe
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The URL was new and is now durably stored
    /// * `Ok(false)` - The URL was already stored; nothing changed
    /// * `Err(StorageError)` - The append failed; the URL is not recorded
    pub async fn record(&self, url: &str) -> StorageResult<bool> {
        let mut inner = self.inner.lock().await;
        if inner.known.contains(url) {
            return Ok(false);
        }

        let entry = url.to_string();
        with_log(&inner.log, move |log| log.append(&entry)).await?;
        inner.known.insert(url.to_string());
        inner.entries.push(url.to_string());
        inner.live.push(url.to_string());
        Ok(true)
    }

    /// Returns true if the URL has been confirmed in this or any earlier run
    pub async fn contains(&self, url: &str) -> bool {
        self.inner.lock().await.known.contains(url)
    }

    /// Point-in-time copy of every stored entry, in store order
    pub async fn snapshot(&self) -> Vec<String> {
        self.inner.lock().await.entries.clone()
    }

    /// Entries recorded during the current run, in confirmation order
    pub async fn live(&self) -> Vec<String> {
        self.inner.lock().await.live.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.entries.is_empty()
    }

    /// Starts a new run: the live list is emptied, stored entries are kept
    pub async fn begin_run(&self) {
        self.inner.lock().await.live.clear();
    }

    /// Forgets every stored entry, on disk and in memory
    pub async fn clear(&self) -> StorageResult<()> {
        let mut inner = self.inner.lock().await;
        with_log(&inner.log, |log| log.clear()).await?;
        inner.known.clear();
        inner.entries.clear();
        inner.live.clear();
        Ok(())
    }
}
