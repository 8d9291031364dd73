//! HTML link extraction
//!
//! Pulls `<a href>` targets out of a fetched page and turns them into
//! canonical absolute URLs, in document order.

use crate::url::canonicalize;
use crate::ScoutError;
use scraper::{Html, Selector};
use url::Url;

/// Reusable anchor extractor
///
/// Holds the compiled selector so workers don't re-parse it per page.
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    anchors: Selector,
}

impl LinkExtractor {
    pub fn new() -> Result<Self, ScoutError> {
        let anchors =
            Selector::parse("a[href]").map_err(|e| ScoutError::HtmlParse(e.to_string()))?;
        Ok(Self { anchors })
    }

    /// Lazily yields every followable link in `document`, in document order
    ///
    /// # Link Rules
    ///
    /// **Skipped:**
    /// - `javascript:`, `mailto:`, `tel:`, `data:` hrefs
    /// - Fragment-only hrefs (same page anchors)
    /// - Anything that does not resolve to an http(s) URL
    ///
    /// Query strings and fragments are stripped. Duplicates are kept; the
    /// frontier deduplicates.
    pub fn links<'a>(
        &'a self,
        document: &'a Html,
        base_url: &'a Url,
    ) -> impl Iterator<Item = Url> + 'a {
        document
            .select(&self.anchors)
            .filter_map(|element| element.value().attr("href"))
            .filter_map(move |href| resolve_link(href, base_url))
    }
}

/// Parses `html` and returns its canonical outbound links
///
/// Malformed markup never fails: html5ever recovers what it can and the
/// anchors it finds are returned.
///
/// # Example
///
/// ```
/// use recipe_scout::crawler::extract_links;
/// use url::Url;
///
/// let base = Url::parse("https://www.example.com/recipes").unwrap();
/// let html = r#"<a href="/recipes/soup?ref=nav#top">Soup</a>"#;
/// let links = extract_links(&base, html);
/// assert_eq!(links[0].as_str(), "https://www.example.com/recipes/soup");
/// ```
pub fn extract_links(base_url: &Url, html: &str) -> Vec<Url> {
    let extractor = match LinkExtractor::new() {
        Ok(extractor) => extractor,
        Err(_) => return Vec::new(),
    };
    let document = Html::parse_document(html);
    extractor.links(&document, base_url).collect()
}

/// Resolves a link href to a canonical absolute URL
///
/// Returns None if the link should be excluded.
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    canonicalize(absolute).ok()
}
