// src/collect/html.rs
// =============================================================================
// Extracts absolute URLs from HTML files.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (built on html5ever, Mozilla's HTML parser)
// - Supports CSS selectors for finding elements
//
// Input files have no page URL of their own, so relative references cannot
// be resolved; only absolute http(s) URLs are kept.
// =============================================================================

use scraper::{Html, Selector};

// (selector, attribute) pairs that carry URLs we want to probe
const URL_ATTRIBUTES: &[(&str, &str)] = &[
    ("a[href]", "href"),
    ("link[href]", "href"),
    ("img[src]", "src"),
    ("script[src]", "src"),
    ("iframe[src]", "src"),
    ("source[src]", "src"),
];

// Extracts all absolute HTTP/HTTPS URLs from element attributes
//
// Example:
//   html = "<a href='https://example.com/docs'>Docs</a><a href='/x'>X</a>"
//   result = ["https://example.com/docs"]
pub fn extract_html_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    for (css, attribute) in URL_ATTRIBUTES {
        // The selectors are constants; a parse failure just means no matches
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };

        for element in document.select(&selector) {
            if let Some(value) = element.value().attr(attribute) {
                let value = value.trim();
                if is_checkable_link(value) {
                    links.push(value.to_string());
                }
            }
        }
    }

    links
}

// We skip mailto:, tel:, javascript:, data:, and relative links
fn is_checkable_link(url: &str) -> bool {
    let lowered = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lowered.starts_with("http://") || lowered.starts_with("https://")
}
