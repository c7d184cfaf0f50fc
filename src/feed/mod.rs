//! Feed module: the scheduled "rebuild feed" path
//!
//! This module contains:
//! - Item generation with title recovery from stored metadata
//! - RSS 2.0 serialization
//! - Publishing the document to its fixed key

mod generator;
mod publisher;
mod rss;

pub use generator::{resolve_title, FeedGenerator, TitleLookup};
pub use publisher::FeedPublisher;
pub use rss::{write_rss, Channel};

use crate::config::Config;
use crate::storage::ObjectStore;
use crate::strip::{format_date, parse_date};
use crate::Result;
use chrono::{NaiveDate, Utc};
use serde::{Serialize, Serializer};
use std::sync::Arc;
use tracing::info;

/// One day of the feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedItem {
    #[serde(serialize_with = "serialize_date")]
    pub date: NaiveDate,
    pub title: String,
    pub image_url: String,

    /// Set when no stored title was found and the date-based one is used
    #[serde(skip)]
    pub title_fabricated: bool,
}

impl FeedItem {
    /// RFC 2822 timestamp at midnight UTC of the item date
    pub fn pub_date(&self) -> String {
        self.date
            .and_hms_opt(0, 0, 0)
            .map(|midnight| midnight.and_utc().to_rfc2822())
            .unwrap_or_default()
    }
}

fn serialize_date<S: Serializer>(
    date: &NaiveDate,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_date(*date))
}

/// Result of a gen-feed invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenFeedOutput {
    pub feed_url: String,
    pub items: usize,
}

/// Regenerates the whole feed from stored strips and uploads it
///
/// `start` defaults to the current UTC date.
pub async fn gen_feed(
    config: &Config,
    store: Arc<dyn ObjectStore>,
    start: Option<&str>,
) -> Result<GenFeedOutput> {
    let start_date = match start {
        Some(start) => parse_date(start)?,
        None => Utc::now().date_naive(),
    };

    info!("Generating feed for date {} ...", start_date);

    let items = FeedGenerator::new(store.clone(), config.storage.strips_prefix(), start_date)
        .with_length(config.feed.length)
        .with_concurrency(config.feed.concurrency)
        .items()
        .await;

    let channel = Channel {
        title: config.feed.title.clone(),
        link: config.feed.link.clone(),
        description: config.feed.description.clone(),
    };
    let xml = write_rss(&channel, &items)?;

    let feed_url = FeedPublisher::new(store, &config.feed.path)
        .publish(xml)
        .await?;

    Ok(GenFeedOutput {
        feed_url,
        items: items.len(),
    })
}
