//! Storage traits and error types
//!
//! This module defines the trait interface for object store backends and
//! associated error types.

use crate::storage::ObjectBody;
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to put object {key}: {message}")]
    Put { key: String, message: String },

    #[error("Failed to read metadata of object {key}: {message}")]
    Head { key: String, message: String },

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Failed to read object body for {key}: {source}")]
    Body {
        key: String,
        source: std::io::Error,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// User metadata attached to an object
pub type Metadata = HashMap<String, String>;

/// Trait for object store implementations
///
/// Each day owns a unique key and the feed document is replaced wholesale, so
/// implementations need no locking across keys; concurrent writes to the same
/// key resolve to last-writer-wins.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `body` under `key`, replacing any existing object
    ///
    /// # Returns
    ///
    /// The public location of the stored object
    async fn put(
        &self,
        key: &str,
        body: ObjectBody,
        content_type: &str,
        metadata: Metadata,
    ) -> StorageResult<String>;

    /// Fetches the user metadata of `key` without reading its body
    async fn head_metadata(&self, key: &str) -> StorageResult<Metadata>;

    /// Public location of `key`, whether or not it exists
    fn location(&self, key: &str) -> String;
}

/// Looks up a metadata value ignoring key case
///
/// S3 lowercases user metadata keys, so `Title` written by the copier comes
/// back as `title`.
pub fn metadata_value<'a>(metadata: &'a Metadata, name: &str) -> Option<&'a str> {
    metadata
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
