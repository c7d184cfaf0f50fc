//! Strip page scraper
//!
//! Fetches `{base_url}/strip/{date}` and turns the page into a [`Comic`]
//! using the first extractor that recognizes the markup.

use crate::config::SiteConfig;
use crate::strip::extractor::{clean_title, default_extractors, StripExtractor};
use crate::strip::fetcher::{build_http_client, fetch_text};
use crate::strip::Comic;
use crate::{DilbertError, Result};
use reqwest::Client;
use scraper::Html;
use tracing::{debug, info, warn};
use url::Url;

pub struct StripScraper {
    client: Client,
    base_url: String,
    extractors: Vec<Box<dyn StripExtractor>>,
}

impl StripScraper {
    /// Creates a scraper for the site at `base_url` with every known extractor
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            extractors: default_extractors(),
        }
    }

    pub fn from_config(config: &SiteConfig) -> Result<Self> {
        let client =
            build_http_client(config).map_err(|e| DilbertError::http(&config.base_url, e))?;
        Ok(Self::new(client, &config.base_url))
    }

    /// Replaces the extractors, tried in the given order
    pub fn with_extractors(mut self, extractors: Vec<Box<dyn StripExtractor>>) -> Self {
        self.extractors = extractors;
        self
    }

    pub fn strip_url(&self, date: &str) -> String {
        format!("{}/strip/{}", self.base_url, date)
    }

    /// Scrapes the strip for an already resolved date
    ///
    /// # Errors
    ///
    /// Any transport failure, non-2xx status, unrecognized markup or missing
    /// image URL is an upstream error. A missing title is not: the comic is
    /// returned with an empty title.
    pub async fn scrape(&self, date: &str) -> Result<Comic> {
        let strip_url = self.strip_url(date);

        info!("Scraping strip page {} ...", strip_url);
        let body = fetch_text(&self.client, &strip_url).await?;

        let comic = self.parse(date, &strip_url, &body)?;
        debug!("Scraped comic: {:?}", comic);

        Ok(comic)
    }

    /// Extracts a [`Comic`] from an already fetched strip page
    pub fn parse(&self, date: &str, strip_url: &str, html: &str) -> Result<Comic> {
        let document = Html::parse_document(html);

        let (extractor, extracted) = self
            .extractors
            .iter()
            .find_map(|e| e.extract(&document).map(|extracted| (e.name(), extracted)))
            .ok_or_else(|| DilbertError::upstream(strip_url, "comic metadata not found"))?;

        debug!("Strip page matched {} markup", extractor);

        if let Some(page_date) = &extracted.date {
            if page_date != date {
                return Err(DilbertError::upstream(
                    strip_url,
                    format!("no comic found for date {} (page shows {})", date, page_date),
                ));
            }
        }

        if extracted.image_url.is_empty() {
            return Err(DilbertError::upstream(strip_url, "image URL not found"));
        }

        let image_url = resolve_image_url(strip_url, &extracted.image_url)?;

        let title = clean_title(&extracted.title);
        if title.is_empty() {
            warn!("No title found for strip {}; continuing with an empty title", date);
        }

        Ok(Comic {
            date: date.to_string(),
            title,
            image_url,
            strip_url: strip_url.to_string(),
        })
    }
}

/// Resolves a possibly protocol-relative or relative image URL against the page URL
fn resolve_image_url(strip_url: &str, image_url: &str) -> Result<String> {
    let base = Url::parse(strip_url)
        .map_err(|e| DilbertError::upstream(strip_url, format!("invalid strip URL: {}", e)))?;

    let resolved = base.join(image_url).map_err(|e| {
        DilbertError::upstream(
            strip_url,
            format!("invalid image URL {:?}: {}", image_url, e),
        )
    })?;

    match resolved.scheme() {
        "http" | "https" => Ok(resolved.to_string()),
        scheme => Err(DilbertError::upstream(
            strip_url,
            format!("unsupported image URL scheme {:?}", scheme),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strip::extractor::{DataAttributeExtractor, ExtractedStrip};
    use crate::ErrorKind;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const STRIP_2018_10_30: &str = include_str!("../../tests/fixtures/strip-2018-10-30.html");
    const STRIP_2020_11_11: &str = include_str!("../../tests/fixtures/strip-2020-11-11.html");
    const STRIP_2022_06_14: &str = include_str!("../../tests/fixtures/strip-2022-06-14.html");
    const STRIP_NO_IMAGE: &str = include_str!("../../tests/fixtures/strip-no-image.html");

    fn scraper(base_url: &str) -> StripScraper {
        StripScraper::from_config(&SiteConfig {
            base_url: base_url.to_string(),
            ..SiteConfig::default()
        })
        .unwrap()
    }

    struct Case {
        comic: Comic,
        html: &'static str,
    }

    fn cases(base_url: &str) -> Vec<Case> {
        vec![
            Case {
                comic: Comic {
                    date: "2018-10-30".to_string(),
                    title: "Intentionally Underbidding".to_string(),
                    image_url: "https://assets.amuniversal.com/cda546d0a88c01365b26005056a9545d"
                        .to_string(),
                    strip_url: format!("{}/strip/2018-10-30", base_url),
                },
                html: STRIP_2018_10_30,
            },
            Case {
                comic: Comic {
                    date: "2020-11-11".to_string(),
                    title: "Elbonian Words".to_string(),
                    image_url: "https://assets.amuniversal.com/f25312c0fb5b01382ef9005056a9545d"
                        .to_string(),
                    strip_url: format!("{}/strip/2020-11-11", base_url),
                },
                html: STRIP_2020_11_11,
            },
            Case {
                comic: Comic {
                    date: "2022-06-14".to_string(),
                    title: "Meeting Overruns".to_string(),
                    image_url: "https://assets.amuniversal.com/4dd8d1f0c5d1013a8fd3005056a9545d"
                        .to_string(),
                    strip_url: format!("{}/strip/2022-06-14", base_url),
                },
                html: STRIP_2022_06_14,
            },
        ]
    }

    #[tokio::test]
    async fn test_scrape_fixtures() {
        let server = MockServer::start().await;
        let scraper = scraper(&server.uri());

        for case in cases(&server.uri()) {
            Mock::given(method("GET"))
                .and(path(format!("/strip/{}", case.comic.date)))
                .respond_with(ResponseTemplate::new(200).set_body_raw(case.html, "text/html"))
                .expect(1)
                .mount(&server)
                .await;

            let comic = scraper.scrape(&case.comic.date).await.unwrap();
            assert_eq!(comic, case.comic);

            server.reset().await;
        }
    }

    #[test]
    fn test_parse_is_deterministic() {
        let scraper = scraper("https://dilbert.com");
        let url = scraper.strip_url("2018-10-30");

        let first = scraper.parse("2018-10-30", &url, STRIP_2018_10_30).unwrap();
        let second = scraper.parse("2018-10-30", &url, STRIP_2018_10_30).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_image_is_upstream_error() {
        let scraper = scraper("https://dilbert.com");
        let url = scraper.strip_url("2019-11-02");

        let err = scraper.parse("2019-11-02", &url, STRIP_NO_IMAGE).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert!(err.to_string().contains("image URL not found"));
    }

    #[test]
    fn test_unknown_markup_is_upstream_error() {
        let scraper = scraper("https://dilbert.com");
        let err = scraper
            .parse(
                "2019-11-02",
                "https://dilbert.com/strip/2019-11-02",
                "<html><body><p>Gone fishing</p></body></html>",
            )
            .unwrap_err();
        assert!(err.to_string().contains("comic metadata not found"));
    }

    #[test]
    fn test_legacy_page_for_other_date() {
        let scraper = scraper("https://dilbert.com");
        let err = scraper
            .parse(
                "2018-10-31",
                "https://dilbert.com/strip/2018-10-31",
                STRIP_2018_10_30,
            )
            .unwrap_err();
        assert!(err.to_string().contains("no comic found for date 2018-10-31"));
    }

    #[test]
    fn test_empty_title_is_tolerated() {
        let html = r#"<div class="img-comic-container">
            <img class="img-comic" alt="" src="//assets.amuniversal.com/abc123"></div>"#;
        let scraper = scraper("https://dilbert.com");

        let comic = scraper
            .parse("2021-01-01", "https://dilbert.com/strip/2021-01-01", html)
            .unwrap();
        assert_eq!(comic.title, "");
        assert_eq!(comic.image_url, "https://assets.amuniversal.com/abc123");
    }

    #[test]
    fn test_custom_extractor_chain() {
        struct Fixed;

        impl StripExtractor for Fixed {
            fn name(&self) -> &'static str {
                "fixed"
            }

            fn extract(&self, _document: &Html) -> Option<ExtractedStrip> {
                Some(ExtractedStrip {
                    title: "Fixed".to_string(),
                    image_url: "/images/fixed.gif".to_string(),
                    date: None,
                })
            }
        }

        let scraper = scraper("https://dilbert.com")
            .with_extractors(vec![Box::new(DataAttributeExtractor), Box::new(Fixed)]);

        let comic = scraper
            .parse("2021-01-01", "https://dilbert.com/strip/2021-01-01", "<html></html>")
            .unwrap();
        assert_eq!(comic.title, "Fixed");
        assert_eq!(comic.image_url, "https://dilbert.com/images/fixed.gif");
    }

    #[tokio::test]
    async fn test_scrape_server_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/strip/2018-10-30"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let err = scraper(&server.uri()).scrape("2018-10-30").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
    }

    #[test]
    fn test_strip_url_trims_trailing_slash() {
        assert_eq!(
            scraper("https://dilbert.com/").strip_url("2018-10-30"),
            "https://dilbert.com/strip/2018-10-30"
        );
    }
}
