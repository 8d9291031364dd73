//! Run status shared by the crawl and export pipelines

use serde::Serialize;
use std::fmt;

/// Lifecycle of one crawl or export run: `idle → running → done`
///
/// A cancelled run still ends in `Done`; starting a new run moves `Done`
/// back to `Running`. Nothing ever returns to `Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// No run has been started in this process
    #[default]
    Idle,

    /// A run is in progress
    Running,

    /// The last run finished, was cancelled, or was skipped
    Done,
}

impl RunStatus {
    /// Returns true while a run is in progress
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns true once a run has ended
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
