//! S3 object store
//!
//! Backs [`ObjectStore`] with `aws-sdk-s3`. Works against AWS as well as
//! S3-compatible services when an endpoint URL is configured.

use crate::config::StorageConfig;
use crate::storage::traits::{Metadata, ObjectStore, StorageError, StorageResult};
use crate::storage::ObjectBody;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use aws_sdk_s3::Client;
use bytes::{Bytes, BytesMut};
use futures::stream::{BoxStream, TryStreamExt};
use std::io;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
    public_url: String,
}

impl S3Store {
    pub fn new(client: Client, bucket: &str, public_url: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    /// Builds a client from the SDK's default credential chain plus the
    /// region and endpoint overrides in `config`
    pub async fn from_config(config: &StorageConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self::new(
            Client::from_conf(builder.build()),
            &config.bucket,
            &config.public_base_url(),
        )
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

/// Size at which a buffered chunk of an unsized stream is sent as one part
///
/// S3 requires every part but the last to be at least 5 MiB.
pub const MULTIPART_PART_SIZE: usize = 5 * 1024 * 1024;

impl S3Store {
    async fn put_object(
        &self,
        key: &str,
        body: ByteStream,
        content_length: u64,
        content_type: &str,
        metadata: Metadata,
    ) -> StorageResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .content_length(content_length as i64)
            .set_metadata(Some(metadata))
            .body(body)
            .send()
            .await
            .map_err(|e| put_error(key, e))?;
        Ok(())
    }

    /// Uploads a stream of unknown length as a multipart upload
    ///
    /// At most one part is held in memory at a time. A failed part aborts the
    /// upload so no partial object is left behind.
    async fn put_multipart(
        &self,
        key: &str,
        stream: BoxStream<'static, io::Result<Bytes>>,
        content_type: &str,
        metadata: Metadata,
    ) -> StorageResult<()> {
        let upload = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .set_metadata(Some(metadata))
            .send()
            .await
            .map_err(|e| put_error(key, e))?;

        let upload_id = upload
            .upload_id()
            .ok_or_else(|| StorageError::Put {
                key: key.to_string(),
                message: "no upload ID returned".to_string(),
            })?
            .to_string();

        debug!("Started multipart upload {} for {}", upload_id, key);

        let parts = match self.upload_parts(key, &upload_id, stream).await {
            Ok(parts) => parts,
            Err(e) => {
                self.abort_multipart(key, &upload_id).await;
                return Err(e);
            }
        };

        self.client
            .complete_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(&upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(parts))
                    .build(),
            )
            .send()
            .await
            .map_err(|e| put_error(key, e))?;

        Ok(())
    }

    async fn upload_parts(
        &self,
        key: &str,
        upload_id: &str,
        mut stream: BoxStream<'static, io::Result<Bytes>>,
    ) -> StorageResult<Vec<CompletedPart>> {
        let mut parts = Vec::new();
        let mut buf = BytesMut::new();

        while let Some(chunk) = stream
            .try_next()
            .await
            .map_err(|source| StorageError::Body {
                key: key.to_string(),
                source,
            })?
        {
            buf.extend_from_slice(&chunk);
            if buf.len() >= MULTIPART_PART_SIZE {
                let part_number = parts.len() as i32 + 1;
                let part = self
                    .upload_part(key, upload_id, part_number, buf.split().freeze())
                    .await?;
                parts.push(part);
            }
        }

        // The last part may be short, and an empty body still needs one part
        if !buf.is_empty() || parts.is_empty() {
            let part_number = parts.len() as i32 + 1;
            let part = self
                .upload_part(key, upload_id, part_number, buf.freeze())
                .await?;
            parts.push(part);
        }

        Ok(parts)
    }

    async fn upload_part(
        &self,
        key: &str,
        upload_id: &str,
        part_number: i32,
        data: Bytes,
    ) -> StorageResult<CompletedPart> {
        debug!(
            "Uploading part {} of {} ({} bytes)",
            part_number,
            key,
            data.len()
        );

        let output = self
            .client
            .upload_part()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .part_number(part_number)
            .content_length(data.len() as i64)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| put_error(key, e))?;

        Ok(CompletedPart::builder()
            .part_number(part_number)
            .set_e_tag(output.e_tag().map(str::to_string))
            .build())
    }

    async fn abort_multipart(&self, key: &str, upload_id: &str) {
        let result = self
            .client
            .abort_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .send()
            .await;

        if let Err(e) = result {
            warn!(
                "Failed to abort multipart upload {} for {}: {}",
                upload_id,
                key,
                DisplayErrorContext(&e)
            );
        }
    }
}

fn put_error(key: &str, err: impl std::error::Error) -> StorageError {
    StorageError::Put {
        key: key.to_string(),
        message: DisplayErrorContext(&err).to_string(),
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(
        &self,
        key: &str,
        body: ObjectBody,
        content_type: &str,
        metadata: Metadata,
    ) -> StorageResult<String> {
        match body {
            ObjectBody::Bytes(bytes) => {
                let length = bytes.len() as u64;
                self.put_object(key, ByteStream::from(bytes), length, content_type, metadata)
                    .await?;
            }
            ObjectBody::Stream {
                stream,
                content_length: Some(length),
            } => {
                let body = ByteStream::from_body_1_x(reqwest::Body::wrap_stream(stream));
                self.put_object(key, body, length, content_type, metadata)
                    .await?;
            }
            // Chunked or decompressed responses carry no length
            ObjectBody::Stream {
                stream,
                content_length: None,
            } => {
                self.put_multipart(key, stream, content_type, metadata)
                    .await?;
            }
        }

        Ok(self.location(key))
    }

    async fn head_metadata(&self, key: &str) -> StorageResult<Metadata> {
        let output = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_not_found()) {
                    StorageError::NotFound(key.to_string())
                } else {
                    StorageError::Head {
                        key: key.to_string(),
                        message: DisplayErrorContext(&e).to_string(),
                    }
                }
            })?;

        Ok(output.metadata().cloned().unwrap_or_default())
    }

    fn location(&self, key: &str) -> String {
        format!("{}/{}", self.public_url, key)
    }
}
