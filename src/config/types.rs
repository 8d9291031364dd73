use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Browser-like identity sent to the target site
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/122.0.0.0 Safari/537.36";

/// Main configuration structure for Recipe-Scout
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub destination: Option<DestinationConfig>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// URL the crawl starts from; its host defines the crawled site
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Path prefix that recipe pages live under (e.g. "/recipes/")
    #[serde(rename = "recipe-path-prefix", default = "default_recipe_path_prefix")]
    pub recipe_path_prefix: String,

    /// Pause before every outbound request (milliseconds)
    #[serde(rename = "politeness-delay-ms", default = "default_politeness_delay_ms")]
    pub politeness_delay_ms: u64,

    /// Number of crawl workers
    #[serde(rename = "max-concurrency", default = "default_max_concurrency")]
    pub max_concurrency: u32,

    /// Total timeout for a single request (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// How long an idle worker waits for work before re-checking cancellation (milliseconds)
    #[serde(rename = "claim-timeout-ms", default = "default_claim_timeout_ms")]
    pub claim_timeout_ms: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl CrawlerConfig {
    /// Creates a crawler configuration with defaults for everything but the start URL
    pub fn new(start_url: impl Into<String>) -> Self {
        Self {
            start_url: start_url.into(),
            recipe_path_prefix: default_recipe_path_prefix(),
            politeness_delay_ms: default_politeness_delay_ms(),
            max_concurrency: default_max_concurrency(),
            request_timeout_secs: default_request_timeout_secs(),
            claim_timeout_ms: default_claim_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }

    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn claim_timeout(&self) -> Duration {
        Duration::from_millis(self.claim_timeout_ms)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Line-delimited file of confirmed recipe URLs (also the resume state)
    #[serde(rename = "recipes-path")]
    pub recipes_path: String,

    /// Where the last-used destination settings are persisted
    #[serde(rename = "destination-path")]
    pub destination_path: String,
}

/// Crawl-then-export policy knobs
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineConfig {
    /// Run the export even when the crawl that preceded it was cancelled
    #[serde(rename = "export-after-cancelled-crawl", default)]
    pub export_after_cancelled_crawl: bool,
}

/// Recipe import API the confirmed URLs are replayed against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// Import endpoint receiving `{"url": ...}` POSTs
    pub endpoint: String,

    /// Bearer token for the endpoint
    pub credential: String,

    /// Pause between consecutive pushes (seconds)
    #[serde(rename = "rate-limit-seconds", default = "default_rate_limit_seconds")]
    pub rate_limit_seconds: f64,
}

impl DestinationConfig {
    pub fn new(
        endpoint: impl Into<String>,
        credential: impl Into<String>,
        rate_limit_seconds: f64,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            credential: credential.into(),
            rate_limit_seconds,
        }
    }

    /// Returns true when both the endpoint and the credential are present
    pub fn is_configured(&self) -> bool {
        !self.endpoint.trim().is_empty() && !self.credential.trim().is_empty()
    }

    /// Pause between pushes; negative or non-finite values collapse to zero
    pub fn rate_limit(&self) -> Duration {
        Duration::try_from_secs_f64(self.rate_limit_seconds).unwrap_or(Duration::ZERO)
    }
}

fn default_recipe_path_prefix() -> String {
    "/recipes/".to_string()
}

fn default_politeness_delay_ms() -> u64 {
    1000
}

fn default_max_concurrency() -> u32 {
    4
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_claim_timeout_ms() -> u64 {
    500
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_rate_limit_seconds() -> f64 {
    2.0
}
