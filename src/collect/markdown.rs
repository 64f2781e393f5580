// src/collect/markdown.rs
// =============================================================================
// Extracts link destinations from Markdown text.
//
// We use the `pulldown-cmark` crate which:
// - Parses Markdown into events (heading, paragraph, link, image, etc.)
// - Follows the CommonMark specification
// - Resolves reference-style links ([text][ref]) to their real destination,
//   which a plain regex scan would miss
//
// Bare URLs in running text are not links to CommonMark; the caller also runs
// the regex scanner over the raw text to pick those up.
// =============================================================================

use pulldown_cmark::{Event, Parser, Tag};

// Extracts all HTTP/HTTPS link and image destinations from Markdown text
//
// Example input:
//   "Check out [Rust](https://www.rust-lang.org) ![logo](https://x.test/a.png)"
//
// Example output:
//   vec!["https://www.rust-lang.org", "https://x.test/a.png"]
pub fn extract_markdown_links(markdown: &str) -> Vec<String> {
    let mut links = Vec::new();

    for event in Parser::new(markdown) {
        // In pulldown-cmark 0.9 both tags are (link_type, dest_url, title)
        if let Event::Start(Tag::Link(_, dest_url, _) | Tag::Image(_, dest_url, _)) = event {
            let url = dest_url.trim();
            if is_http_link(url) {
                links.push(url.to_string());
            }
        }
    }

    links
}

// Skips mailto:, tel:, relative paths and anchors
fn is_http_link(url: &str) -> bool {
    let lowered = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lowered.starts_with("http://") || lowered.starts_with("https://")
}
