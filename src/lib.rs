//! Dilbert Feed: daily strip mirror and RSS generator
//!
//! This crate scrapes the daily Dilbert strip, copies the image into object storage
//! under a date-derived key, and periodically rebuilds an RSS feed whose item titles
//! are recovered from the metadata stored alongside each image.

pub mod config;
pub mod feed;
pub mod heartbeat;
pub mod storage;
pub mod strip;

use std::time::Duration;
use thiserror::Error;

/// Main error type for Dilbert Feed operations
#[derive(Debug, Error)]
pub enum DilbertError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid date format: {input:?} (expected YYYY-MM-DD)")]
    InvalidDateFormat { input: String },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Upstream error for {url}: {message}")]
    Upstream { url: String, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Feed serialization error: {0}")]
    FeedWrite(#[from] std::io::Error),

    #[error("Feed serialization error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invocation exceeded its deadline of {0:?}")]
    DeadlineExceeded(Duration),
}

/// Coarse classification of a [`DilbertError`]
///
/// Callers use this to decide whether re-invoking can help: input and config
/// errors will fail the same way again, upstream and storage errors may not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    Config,
    Upstream,
    Storage,
    Deadline,
}

impl DilbertError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidDateFormat { .. } => ErrorKind::Input,
            Self::Config(_) => ErrorKind::Config,
            Self::Http { .. } | Self::Upstream { .. } => ErrorKind::Upstream,
            Self::Storage(_) | Self::FeedWrite(_) | Self::Xml(_) => ErrorKind::Storage,
            Self::DeadlineExceeded(_) => ErrorKind::Deadline,
        }
    }

    pub(crate) fn upstream(url: &str, message: impl Into<String>) -> Self {
        Self::Upstream {
            url: url.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn http(url: &str, source: reqwest::Error) -> Self {
        Self::Http {
            url: url.to_string(),
            source,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Missing setting: {0}")]
    Missing(String),
}

/// Result type alias for Dilbert Feed operations
pub type Result<T> = std::result::Result<T, DilbertError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Runs `future` under the per-invocation deadline
///
/// Dropping the timed-out future cancels whatever request was in flight, so a
/// single budget covers the scrape, the image copy, the lookups and the uploads.
pub async fn with_deadline<T, F>(deadline: Duration, future: F) -> Result<T>
where
    F: std::future::Future<Output = Result<T>>,
{
    match tokio::time::timeout(deadline, future).await {
        Ok(result) => result,
        Err(_) => Err(DilbertError::DeadlineExceeded(deadline)),
    }
}

// Re-export commonly used types
pub use config::Config;
pub use feed::{FeedGenerator, FeedItem, FeedPublisher};
pub use storage::{MemoryStore, ObjectBody, ObjectStore, S3Store};
pub use strip::{resolve_date, Comic, StripCopier, StripScraper};
