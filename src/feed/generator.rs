//! Feed item generation
//!
//! Walks a window of days backwards from a start date and recovers each
//! strip's title from the metadata stored next to its image. A failed lookup
//! never fails the feed: the item falls back to a fabricated title.

use crate::feed::FeedItem;
use crate::storage::{metadata_value, strip_key, ObjectStore, TITLE_METADATA_KEY};
use crate::strip::format_date;
use chrono::{Days, NaiveDate};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of a best-effort title lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleLookup {
    Found(String),
    NotFound,
}

/// Picks the stored title or fabricates one from the date
pub fn resolve_title(lookup: TitleLookup, date: &str) -> String {
    match lookup {
        TitleLookup::Found(title) => title,
        TitleLookup::NotFound => format!("Dilbert - {}", date),
    }
}

pub struct FeedGenerator {
    store: Arc<dyn ObjectStore>,
    strips_dir: String,
    start_date: NaiveDate,
    length: u32,
    concurrency: usize,
}

impl FeedGenerator {
    pub fn new(store: Arc<dyn ObjectStore>, strips_dir: &str, start_date: NaiveDate) -> Self {
        Self {
            store,
            strips_dir: strips_dir.to_string(),
            start_date,
            length: 30,
            concurrency: 8,
        }
    }

    /// Sets the number of days covered, including the start date
    pub fn with_length(mut self, length: u32) -> Self {
        self.length = length;
        self
    }

    /// Sets how many metadata lookups may be in flight at once
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Dates in the window, most recent first
    pub fn dates(&self) -> Vec<NaiveDate> {
        (0..self.length)
            .map_while(|i| self.start_date.checked_sub_days(Days::new(i.into())))
            .collect()
    }

    /// Builds one item per day of the window, in descending date order
    pub async fn items(&self) -> Vec<FeedItem> {
        let dates = self.dates();
        info!(
            "Generating {} feed items starting at {} ...",
            dates.len(),
            self.start_date
        );

        // `buffered` keeps results in input order regardless of completion order
        let items: Vec<FeedItem> = stream::iter(dates)
            .map(|date| self.item(date))
            .buffered(self.concurrency)
            .collect()
            .await;

        let fabricated = items.iter().filter(|item| item.title_fabricated).count();
        if fabricated > 0 {
            warn!(
                "{} of {} feed items use a fabricated title",
                fabricated,
                items.len()
            );
        }

        items
    }

    async fn item(&self, date: NaiveDate) -> FeedItem {
        let date_str = format_date(date);
        let key = strip_key(&self.strips_dir, &date_str);

        let lookup = self.lookup_title(&key).await;
        let title_fabricated = lookup == TitleLookup::NotFound;

        FeedItem {
            date,
            title: resolve_title(lookup, &date_str),
            image_url: self.store.location(&key),
            title_fabricated,
        }
    }

    async fn lookup_title(&self, key: &str) -> TitleLookup {
        match self.store.head_metadata(key).await {
            Ok(metadata) => match metadata_value(&metadata, TITLE_METADATA_KEY) {
                Some(title) if !title.trim().is_empty() => {
                    TitleLookup::Found(title.trim().to_string())
                }
                _ => {
                    debug!("No title in metadata of {}", key);
                    TitleLookup::NotFound
                }
            },
            Err(e) => {
                debug!("Title lookup for {} failed: {}", key, e);
                TitleLookup::NotFound
            }
        }
    }
}
