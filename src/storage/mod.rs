//! Storage module for strip images and the feed document
//!
//! This module contains:
//! - The [`ObjectStore`] trait consumed by the copier, generator and publisher
//! - An S3 implementation and an in-memory implementation
//! - The key scheme shared by the writer and the reader of strip objects

mod body;
mod memory;
mod s3;
mod traits;

pub use body::ObjectBody;
pub use memory::{MemoryStore, StoredObject};
pub use s3::S3Store;
pub use traits::{metadata_value, Metadata, ObjectStore, StorageError, StorageResult};

/// Metadata field the strip title is stored under
pub const TITLE_METADATA_KEY: &str = "Title";

/// Content type of strip images
pub const STRIP_CONTENT_TYPE: &str = "image/gif";

/// Content type of the feed document
pub const FEED_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Derives the object key for the strip of `date`
///
/// The copier writes and the feed generator reads through this one function;
/// any divergence would make title recovery fail silently.
///
/// # Example
///
/// ```
/// use dilbert_feed::storage::strip_key;
///
/// assert_eq!(strip_key("strips/", "2018-10-01"), "strips/2018-10-01.gif");
/// ```
pub fn strip_key(strips_dir: &str, date: &str) -> String {
    let prefix = strips_dir.trim_matches('/');
    if prefix.is_empty() {
        format!("{}.gif", date)
    } else {
        format!("{}/{}.gif", prefix, date)
    }
}
