//! Feed publishing

use crate::storage::{Metadata, ObjectBody, ObjectStore, FEED_CONTENT_TYPE};
use crate::Result;
use std::sync::Arc;
use tracing::info;

/// Uploads the serialized feed to its fixed key, replacing the previous one
pub struct FeedPublisher {
    store: Arc<dyn ObjectStore>,
    path: String,
}

impl FeedPublisher {
    pub fn new(store: Arc<dyn ObjectStore>, path: &str) -> Self {
        Self {
            store,
            path: path.trim_start_matches('/').to_string(),
        }
    }

    /// Uploads `xml` and returns the public feed URL
    pub async fn publish(&self, xml: Vec<u8>) -> Result<String> {
        info!("Uploading feed to {} ({} bytes) ...", self.path, xml.len());

        let location = self
            .store
            .put(
                &self.path,
                ObjectBody::from_bytes(xml),
                FEED_CONTENT_TYPE,
                Metadata::new(),
            )
            .await?;

        info!("Upload completed: {}", location);
        Ok(location)
    }
}
