//! Configuration module for Recipe-Scout
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, plus persistence of the destination settings used for export.
//!
//! # Example
//!
//! ```no_run
//! use recipe_scout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("recipe-scout.toml")).unwrap();
//! println!("Crawler will use {} workers", config.crawler.max_concurrency);
//! ```

mod destination;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, DestinationConfig, OutputConfig, PipelineConfig, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use destination::{load_destination, save_destination};
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate_destination;
