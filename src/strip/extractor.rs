//! Strip page extraction
//!
//! The strip site has changed its markup several times. Each known generation
//! gets its own [`StripExtractor`]; supporting a new one means adding an
//! implementation, not touching the scraper.

use scraper::{ElementRef, Html, Selector};

/// Trailing branding the site appends to image alt texts
const TITLE_BRANDING_SUFFIX: &str = " - Dilbert by Scott Adams";

/// Raw fields pulled out of a strip page, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedStrip {
    /// Strip title; empty when the page carries none
    pub title: String,

    /// Image URL exactly as found in the markup (possibly relative)
    pub image_url: String,

    /// Date the page claims to show, when the markup exposes it
    pub date: Option<String>,
}

/// Extracts strip fields from one generation of the site's markup
pub trait StripExtractor: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Returns `None` when the document has no comic container this
    /// extractor recognizes
    fn extract(&self, document: &Html) -> Option<ExtractedStrip>;
}

/// Current markup: `.img-comic-container` wrapping an `img.img-comic`
/// whose `alt` is the title and `src` the image
#[derive(Debug, Default)]
pub struct ImageElementExtractor;

impl StripExtractor for ImageElementExtractor {
    fn name(&self) -> &'static str {
        "img-comic"
    }

    fn extract(&self, document: &Html) -> Option<ExtractedStrip> {
        let container_selector = Selector::parse(".img-comic-container").ok()?;
        let comic_selector = Selector::parse("img.img-comic").ok()?;
        let any_image_selector = Selector::parse("img").ok()?;

        let container = document.select(&container_selector).next()?;

        // Classed image first, then any nested image
        let image = container
            .select(&comic_selector)
            .next()
            .or_else(|| container.select(&any_image_selector).next());

        let Some(image) = image else {
            return Some(ExtractedStrip::default());
        };

        Some(ExtractedStrip {
            title: attr(image, "alt"),
            image_url: attr(image, "src"),
            date: None,
        })
    }
}

/// Legacy markup: `.comic-item-container` carrying `data-title`,
/// `data-image` and `data-id` attributes
#[derive(Debug, Default)]
pub struct DataAttributeExtractor;

impl StripExtractor for DataAttributeExtractor {
    fn name(&self) -> &'static str {
        "comic-item"
    }

    fn extract(&self, document: &Html) -> Option<ExtractedStrip> {
        let container_selector = Selector::parse(".comic-item-container").ok()?;
        let container = document.select(&container_selector).next()?;

        let date = container
            .value()
            .attr("data-id")
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        Some(ExtractedStrip {
            title: attr(container, "data-title"),
            image_url: attr(container, "data-image"),
            date,
        })
    }
}

/// The extractors for every known markup generation, newest first
pub fn default_extractors() -> Vec<Box<dyn StripExtractor>> {
    vec![
        Box::new(ImageElementExtractor),
        Box::new(DataAttributeExtractor),
    ]
}

/// Trims a scraped title and drops the site's branding suffix
pub fn clean_title(raw: &str) -> String {
    let title = raw.trim_end();
    title
        .strip_suffix(TITLE_BRANDING_SUFFIX)
        .unwrap_or(title)
        .trim()
        .to_string()
}

fn attr(element: ElementRef<'_>, name: &str) -> String {
    element
        .value()
        .attr(name)
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}
