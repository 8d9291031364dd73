//! HTTP fetcher implementation
//!
//! This module handles all requests to the crawled site:
//! - Building the HTTP client (browser User-Agent, total timeout, TLS policy)
//! - The fixed politeness delay before every request
//! - Status and Content-Type validation
//! - Error classification

use crate::config::CrawlerConfig;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// HTTP 200 with an HTML body
    Success {
        /// Page body content
        body: String,
    },

    /// Page is not HTML (Content-Type mismatch)
    ContentMismatch {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Any status other than 200
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, body read failure, etc.)
    NetworkError {
        /// Error description
        error: String,
    },

    /// Cancelled during the politeness delay; no request was sent
    Cancelled,
}

impl FetchResult {
    /// Returns true if the fetch produced an HTML body
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Collapses the result to "body or nothing"
    pub fn into_body(self) -> Option<String> {
        match self {
            Self::Success { body } => Some(body),
            _ => None,
        }
    }
}

/// Builds the HTTP client used for the crawled site
///
/// Certificate validation is disabled toward the crawled site. Nothing
/// fetched through this client is authenticated.
///
/// # Example
///
/// ```no_run
/// use recipe_scout::config::CrawlerConfig;
/// use recipe_scout::crawler::build_http_client;
///
/// let config = CrawlerConfig::new("https://www.bbcgoodfood.com/recipes");
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.request_timeout())
        .connect_timeout(config.request_timeout().min(Duration::from_secs(10)))
        .danger_accept_invalid_certs(true)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Politeness-delayed page fetcher
///
/// Every call sleeps the configured delay before issuing its request, so
/// each worker spends at least that long per request against the site.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    delay: Duration,
}

impl Fetcher {
    pub fn new(client: Client, delay: Duration) -> Self {
        Self { client, delay }
    }

    /// Builds a fetcher from crawler settings
    pub fn from_config(config: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?, config.politeness_delay()))
    }

    /// Fetches a page, never failing loudly
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 200 + `text/html` | `Success` |
    /// | 200 + other type | `ContentMismatch` |
    /// | any other status | `HttpError` |
    /// | timeout / connect / body error | `NetworkError` |
    /// | `cancel` fires during the delay | `Cancelled` |
    pub async fn fetch(&self, url: &str, cancel: &CancellationToken) -> FetchResult {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::trace!("Fetch of {} abandoned before request", url);
                return FetchResult::Cancelled;
            }
            _ = tokio::time::sleep(self.delay) => {}
        }
        fetch_url(&self.client, url).await
    }
}

/// Issues a single GET and classifies the outcome (no politeness delay)
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                format!("Connection failed: {}", e)
            } else {
                e.to_string()
            };
            tracing::debug!("Fetch of {} failed: {}", url, error);
            return FetchResult::NetworkError { error };
        }
    };

    let status = response.status();
    if status != StatusCode::OK {
        tracing::debug!("Fetch of {} returned HTTP {}", url, status.as_u16());
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !content_type.to_ascii_lowercase().contains("text/html") {
        tracing::debug!("Skipping {}: content type {:?}", url, content_type);
        return FetchResult::ContentMismatch { content_type };
    }

    match response.text().await {
        Ok(body) => FetchResult::Success { body },
        Err(e) => FetchResult::NetworkError {
            error: e.to_string(),
        },
    }
}
