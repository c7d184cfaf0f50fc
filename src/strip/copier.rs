//! Strip copier
//!
//! Streams a strip image from the site into the object store and tags it with
//! the strip title so the feed generator can recover it later without
//! scraping again.

use crate::storage::{
    strip_key, Metadata, ObjectBody, ObjectStore, STRIP_CONTENT_TYPE, TITLE_METADATA_KEY,
};
use crate::strip::fetcher::fetch;
use crate::strip::Comic;
use crate::{DilbertError, Result};
use reqwest::Client;
use std::sync::Arc;
use tracing::info;

pub struct StripCopier {
    client: Client,
    store: Arc<dyn ObjectStore>,
    strips_dir: String,
}

impl StripCopier {
    pub fn new(client: Client, store: Arc<dyn ObjectStore>, strips_dir: &str) -> Self {
        Self {
            client,
            store,
            strips_dir: strips_dir.to_string(),
        }
    }

    /// Copies the strip image of `comic` to the store
    ///
    /// The response body is handed to the store as a stream. An empty title
    /// is not an error; the object is then stored without a `Title` entry.
    ///
    /// # Returns
    ///
    /// The public location of the stored image
    ///
    /// # Errors
    ///
    /// * Upstream error when the image cannot be fetched
    /// * Storage error when the upload fails
    pub async fn copy(&self, comic: &Comic) -> Result<String> {
        if comic.image_url.is_empty() {
            return Err(DilbertError::upstream(&comic.strip_url, "image URL not found"));
        }

        info!("Downloading strip {} from {} ...", comic.date, comic.image_url);
        let response = fetch(&self.client, &comic.image_url).await?;

        let key = strip_key(&self.strips_dir, &comic.date);
        let mut metadata = Metadata::new();
        if !comic.title.is_empty() {
            metadata.insert(TITLE_METADATA_KEY.to_string(), comic.title.clone());
        }

        info!("Uploading strip to {} ...", key);
        let location = self
            .store
            .put(
                &key,
                ObjectBody::from_response(response),
                STRIP_CONTENT_TYPE,
                metadata,
            )
            .await?;

        info!("Upload completed: {}", location);
        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::storage::{MemoryStore, StorageError, StorageResult};
    use crate::strip::fetcher::build_http_client;
    use crate::ErrorKind;
    use async_trait::async_trait;
    use bytes::Bytes;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x80\x00\x00\xff\xff\xff\x00\x00\x00;";

    fn comic(server: &MockServer, title: &str) -> Comic {
        Comic {
            date: "2018-10-01".to_string(),
            title: title.to_string(),
            image_url: format!("{}/images/cda546d0a88c", server.uri()),
            strip_url: format!("{}/strip/2018-10-01", server.uri()),
        }
    }

    async fn image_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/images/cda546d0a88c"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(GIF, "image/gif"))
            .expect(1)
            .mount(&server)
            .await;
        server
    }

    fn copier(store: Arc<dyn ObjectStore>) -> StripCopier {
        let client = build_http_client(&SiteConfig::default()).unwrap();
        StripCopier::new(client, store, "strips/")
    }

    #[tokio::test]
    async fn test_copy_stores_image_with_title() {
        let server = image_server().await;
        let store = Arc::new(MemoryStore::new("https://dilbert-feed.s3.amazonaws.com"));

        let location = copier(store.clone())
            .copy(&comic(&server, "Use Company Products"))
            .await
            .unwrap();

        assert_eq!(
            location,
            "https://dilbert-feed.s3.amazonaws.com/strips/2018-10-01.gif"
        );

        let object = store.get("strips/2018-10-01.gif").await.unwrap();
        assert_eq!(object.body, Bytes::from_static(GIF));
        assert_eq!(object.content_type, "image/gif");
        assert_eq!(
            object.metadata.get("Title").map(String::as_str),
            Some("Use Company Products")
        );
    }

    #[tokio::test]
    async fn test_copy_with_empty_title() {
        let server = image_server().await;
        let store = Arc::new(MemoryStore::default());

        copier(store.clone()).copy(&comic(&server, "")).await.unwrap();

        let object = store.get("strips/2018-10-01.gif").await.unwrap();
        assert!(object.metadata.get("Title").is_none());
    }

    #[tokio::test]
    async fn test_copy_image_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let store = Arc::new(MemoryStore::default());

        let err = copier(store.clone())
            .copy(&comic(&server, "Fine Lines"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert!(store.keys().await.is_empty());
    }

    struct FailingStore;

    #[async_trait]
    impl ObjectStore for FailingStore {
        async fn put(
            &self,
            key: &str,
            _body: ObjectBody,
            _content_type: &str,
            _metadata: Metadata,
        ) -> StorageResult<String> {
            Err(StorageError::Put {
                key: key.to_string(),
                message: "access denied".to_string(),
            })
        }

        async fn head_metadata(&self, key: &str) -> StorageResult<Metadata> {
            Err(StorageError::NotFound(key.to_string()))
        }

        fn location(&self, key: &str) -> String {
            key.to_string()
        }
    }

    #[tokio::test]
    async fn test_copy_upload_failure() {
        let server = image_server().await;

        let err = copier(Arc::new(FailingStore))
            .copy(&comic(&server, "Fine Lines"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(err.to_string().contains("access denied"));
    }
}
