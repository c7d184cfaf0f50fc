//! Configuration module for Dilbert Feed
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use dilbert_feed::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Strips are stored in bucket {}", config.storage.bucket);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{Config, FeedConfig, HeartbeatConfig, RunConfig, SiteConfig, StorageConfig};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
