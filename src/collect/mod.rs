// src/collect/mod.rs
// =============================================================================
// Everything that happens before probing: finding URLs and preparing them.
//
// Submodules:
// - text: regex scanning of arbitrary text
// - markdown / html: structured link extraction
// - sources: walks files and directories, dispatching on file type
// - table: (id, url) rows from a JSON table
// - normalize: scheme filter + order-preserving dedup
// =============================================================================

mod html;
mod markdown;
mod normalize;
mod sources;
mod table;
mod text;

pub use html::extract_html_links;
pub use markdown::extract_markdown_links;
pub use normalize::{apply_limit, has_http_scheme, into_requests, normalize};
pub use sources::Collector;
pub use table::load_table;
pub use text::{UrlPattern, DEFAULT_URL_PATTERN};
