//! HTML parser for extracting insecure resources and links
//!
//! This module parses a fetched page and extracts:
//! - Insecure embedded resources (`<img src>`, `<iframe src>`, `<object data>`)
//! - Same-site links to follow (`<a href>`)

use crate::url::{classify_link_against, classify_resource, LinkClass, ResourceClass};
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// Insecure resource URLs, deduplicated
    pub resources: BTreeSet<String>,

    /// Same-site links (absolute, normalized), deduplicated
    pub links: BTreeSet<String>,
}

/// Parses HTML content and extracts insecure resources and links
///
/// # Extraction Rules
///
/// **Resources** (run through [`classify_resource`]):
/// - `<img src="...">`, self-closing or not
/// - `<iframe src="...">`
/// - `<object data="...">`
///
/// **Links** (run through [`classify_link_against`] with `base_url`):
/// - `<a href="...">`, kept only when `Internal`
///
/// Tags without the expected attribute, and values that fail to parse,
/// contribute nothing. Malformed HTML yields whatever the parser recovers;
/// this function never fails.
///
/// # Example
///
/// ```
/// use plainsight::crawler::parse_page;
///
/// let html = r#"<a href="/b">b</a><img src="http://insecure.com/i.png">"#;
/// let page = parse_page("https://example.com", html);
/// assert!(page.links.contains("https://example.com/b"));
/// assert!(page.resources.contains("http://insecure.com/i.png"));
/// ```
pub fn parse_page(base_url: &str, html: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    let resources = extract_resources(&document);

    let links = match Url::parse(base_url) {
        Ok(base) => extract_links(&document, &base),
        Err(e) => {
            tracing::debug!("Skipping links on {}: unparsable base ({})", base_url, e);
            BTreeSet::new()
        }
    };

    ParsedPage { resources, links }
}

/// Extracts insecure resource URLs from the document
fn extract_resources(document: &Html) -> BTreeSet<String> {
    let mut resources = BTreeSet::new();

    if let Ok(selector) = Selector::parse("img, iframe, object") {
        for element in document.select(&selector) {
            let attribute = match element.value().name() {
                "object" => "data",
                _ => "src",
            };

            let Some(value) = element.value().attr(attribute) else {
                continue;
            };

            match classify_resource(value) {
                ResourceClass::Insecure(url) => {
                    resources.insert(url);
                }
                ResourceClass::Skip => {
                    tracing::trace!("Skipping resource {}", value);
                }
            }
        }
    }

    resources
}

/// Extracts same-site links from the document
fn extract_links(document: &Html, base: &Url) -> BTreeSet<String> {
    let mut links = BTreeSet::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };

            match classify_link_against(href, base) {
                LinkClass::Internal(url) => {
                    links.insert(url);
                }
                other => {
                    tracing::trace!("Not following {} ({:?})", href, other);
                }
            }
        }
    }

    links
}
