//! Configuration module for Plainsight
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Command-line flags are applied on top by the binary.
//!
//! # Example
//!
//! ```no_run
//! use plainsight::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("plainsight.toml")).unwrap();
//! println!("Concurrent fetches: {}", config.crawler.max_concurrent_fetches);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, FetchConfig, TerminationPolicy, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
