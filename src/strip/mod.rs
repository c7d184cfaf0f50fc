//! Strip module: the one-shot "fetch today's strip" path
//!
//! This module contains:
//! - Date resolution for the requested strip
//! - HTTP fetching and markup extraction for the strip page
//! - Copying the strip image into the object store

mod copier;
mod date;
mod extractor;
mod fetcher;
mod scraper;

pub use copier::StripCopier;
pub use date::{format_date, parse_date, resolve_date, resolve_date_on};
pub use extractor::{
    clean_title, default_extractors, DataAttributeExtractor, ExtractedStrip,
    ImageElementExtractor, StripExtractor,
};
pub use fetcher::{build_http_client, fetch, fetch_text};
pub use scraper::StripScraper;

use crate::config::Config;
use crate::storage::ObjectStore;
use crate::{DilbertError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// A daily strip as scraped from the site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comic {
    /// Strip date as `YYYY-MM-DD`
    pub date: String,

    /// Strip title; may be empty
    pub title: String,

    /// Absolute URL of the strip image
    pub image_url: String,

    /// Absolute URL of the strip page
    pub strip_url: String,
}

/// Result of a get-strip invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetStripOutput {
    #[serde(flatten)]
    pub comic: Comic,

    pub upload_url: String,
}

/// Resolves the date, scrapes the strip page and copies the image to `store`
///
/// The date is validated before any network access; a scrape failure means
/// the copier is never reached.
pub async fn get_strip(
    config: &Config,
    store: Arc<dyn ObjectStore>,
    date: Option<&str>,
) -> Result<GetStripOutput> {
    let date = resolve_date(date)?;

    let client =
        build_http_client(&config.site).map_err(|e| DilbertError::http(&config.site.base_url, e))?;

    let scraper = StripScraper::new(client.clone(), &config.site.base_url);
    let comic = scraper.scrape(&date).await?;
    info!("Scraping done: {} {:?}", comic.date, comic.title);

    let copier = StripCopier::new(client, store, config.storage.strips_prefix());
    let upload_url = copier.copy(&comic).await?;

    Ok(GetStripOutput { comic, upload_url })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::storage::MemoryStore;
    use crate::ErrorKind;

    #[tokio::test]
    async fn test_invalid_date_fails_before_network() {
        // Unroutable base URL: any request would fail as upstream, not input
        let config = parse_config(
            "[site]\nbase-url = \"http://127.0.0.1:1\"\n[storage]\nbucket = \"dilbert-feed\"\n",
        )
        .unwrap();
        let store = Arc::new(MemoryStore::default());

        let err = get_strip(&config, store.clone(), Some("2018-1-1"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Input);
        assert!(store.keys().await.is_empty());
    }

    #[test]
    fn test_output_flattens_comic() {
        let output = GetStripOutput {
            comic: Comic {
                date: "2018-10-30".to_string(),
                title: "Intentionally Underbidding".to_string(),
                image_url: "https://assets.amuniversal.com/cda546d0a88c01365b26005056a9545d"
                    .to_string(),
                strip_url: "https://dilbert.com/strip/2018-10-30".to_string(),
            },
            upload_url: "https://dilbert-feed.s3.amazonaws.com/strips/2018-10-30.gif".to_string(),
        };

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["date"], "2018-10-30");
        assert_eq!(json["title"], "Intentionally Underbidding");
        assert_eq!(
            json["upload_url"],
            "https://dilbert-feed.s3.amazonaws.com/strips/2018-10-30.gif"
        );
        assert!(json.get("comic").is_none());
    }
}
