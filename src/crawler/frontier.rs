//! Crawl frontier: the work queue plus its dedup sets
//!
//! This module handles:
//! - FIFO queue of canonical URLs awaiting a worker
//! - Queued and Visited sets for O(1) "already seen" checks
//! - In-flight accounting so completion means "nothing queued, nothing running"
//! - Bounded-wait claims so idle workers can observe cancellation

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use url::Url;

/// Outcome of a claim attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// A URL to process; the caller must call [`Frontier::complete`] when done
    Url(Url),

    /// Nothing arrived within the wait, but other workers are still busy
    Idle,

    /// The queue is empty and no work is in flight: the crawl is over
    Drained,
}

/// Point-in-time counts from the frontier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrontierStats {
    pub queued: usize,
    pub visited: usize,
    pub in_flight: usize,
}

#[derive(Debug, Default)]
struct FrontierState {
    queue: VecDeque<Url>,
    queued: HashSet<String>,
    visited: HashSet<String>,
    in_flight: usize,
}

/// Shared work queue for one crawl run
///
/// A URL moves Queued → Visited when a worker claims it, so the two sets
/// are always disjoint and every visited URL was queued first. The state
/// lock is never held across an await.
#[derive(Debug, Default)]
pub struct Frontier {
    state: Mutex<FrontierState>,
    notify: Notify,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueues the start URL
    pub fn seed(&self, url: Url) -> bool {
        self.enqueue(url)
    }

    /// Adds a URL unless it is already queued or visited
    ///
    /// # Returns
    ///
    /// * `true` - The URL was added
    /// * `false` - The URL was already known; nothing changed
    pub fn enqueue(&self, url: Url) -> bool {
        {
            let mut state = self.lock();
            let key = url.as_str();
            if state.visited.contains(key) || state.queued.contains(key) {
                return false;
            }
            state.queued.insert(key.to_string());
            state.queue.push_back(url);
        }
        self.notify.notify_waiters();
        true
    }

    /// Takes the next URL, waiting up to `wait` for one to appear
    ///
    /// Returns `Claim::Drained` as soon as the queue is empty with nothing
    /// in flight, without waiting.
    pub async fn claim(&self, wait: Duration) -> Claim {
        let deadline = Instant::now() + wait;
        loop {
            // Registered before inspecting state so a wakeup between the
            // check and the wait is not lost.
            let notified = self.notify.notified();

            {
                let mut state = self.lock();
                if let Some(url) = state.queue.pop_front() {
                    state.queued.remove(url.as_str());
                    state.visited.insert(url.to_string());
                    state.in_flight += 1;
                    return Claim::Url(url);
                }
                if state.in_flight == 0 {
                    return Claim::Drained;
                }
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Claim::Idle;
            }
        }
    }

    /// Marks one claimed URL as fully processed
    pub fn complete(&self) {
        {
            let mut state = self.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
        }
        self.notify.notify_waiters();
    }

    /// Returns true when nothing is queued and nothing is in flight
    pub fn is_drained(&self) -> bool {
        let state = self.lock();
        state.queue.is_empty() && state.in_flight == 0
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.lock().visited.contains(url)
    }

    pub fn is_queued(&self, url: &str) -> bool {
        self.lock().queued.contains(url)
    }

    pub fn stats(&self) -> FrontierStats {
        let state = self.lock();
        FrontierStats {
            queued: state.queue.len(),
            visited: state.visited.len(),
            in_flight: state.in_flight,
        }
    }
}
