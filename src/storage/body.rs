//! Object bodies
//!
//! An [`ObjectBody`] is either a fully materialized buffer (the feed document)
//! or a byte stream handed straight from an HTTP response to the store (strip
//! images), so large bodies never have to be held in memory by the pipeline.

use bytes::{Bytes, BytesMut};
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use std::fmt;
use std::io;

pub enum ObjectBody {
    Bytes(Bytes),
    Stream {
        stream: BoxStream<'static, io::Result<Bytes>>,
        content_length: Option<u64>,
    },
}

impl ObjectBody {
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self::Bytes(bytes.into())
    }

    pub fn from_stream<S>(stream: S, content_length: Option<u64>) -> Self
    where
        S: futures::Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        Self::Stream {
            stream: stream.boxed(),
            content_length,
        }
    }

    /// Streams the body of an HTTP response
    pub fn from_response(response: reqwest::Response) -> Self {
        let content_length = response.content_length();
        let stream = response
            .bytes_stream()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e));
        Self::from_stream(stream, content_length)
    }

    /// Length in bytes, when known up front
    pub fn content_length(&self) -> Option<u64> {
        match self {
            Self::Bytes(bytes) => Some(bytes.len() as u64),
            Self::Stream { content_length, .. } => *content_length,
        }
    }

    /// Reads the whole body into memory
    pub async fn collect(self) -> io::Result<Bytes> {
        match self {
            Self::Bytes(bytes) => Ok(bytes),
            Self::Stream { mut stream, .. } => {
                let mut buf = BytesMut::new();
                while let Some(chunk) = stream.try_next().await? {
                    buf.extend_from_slice(&chunk);
                }
                Ok(buf.freeze())
            }
        }
    }
}

impl fmt::Debug for ObjectBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Stream { content_length, .. } => f
                .debug_struct("Stream")
                .field("content_length", content_length)
                .finish_non_exhaustive(),
        }
    }
}
