//! Configuration module for Legaldoc-Crawler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so an absent file and an empty file are equivalent.
//!
//! # Example
//!
//! ```no_run
//! use legaldoc_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! println!("Delay between requests: {}s", config.crawler.delay_seconds);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, RenderConfig, RetryConfig, DEFAULT_CONTAINER_CLASS,
    DEFAULT_DOCUMENT_TITLE, DEFAULT_OUTPUT_DIRECTORY, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
