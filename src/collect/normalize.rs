// src/collect/normalize.rs
// =============================================================================
// Turns collected strings into the list of URLs to probe.
//
// - Only strings starting with http:// or https:// (any case) are kept
// - Duplicates are dropped, first occurrence wins, order is preserved
// - With `allow_duplicate`, every occurrence is passed through unchanged
//
// Nothing else is validated here: a malformed URL is a probe-time failure.
// An empty result is a valid outcome ("nothing to do"), not an error.
// =============================================================================

use crate::probe::ProbeRequest;
use std::collections::HashSet;

/// Whether `candidate` starts with a recognized scheme.
pub fn has_http_scheme(candidate: &str) -> bool {
    let head = candidate.get(..8).unwrap_or(candidate).to_ascii_lowercase();
    head.starts_with("http://") || head.starts_with("https://")
}

/// Merges extracted and explicitly supplied URLs into one ordered list.
///
/// Extracted strings come first, explicit URLs after them.
pub fn normalize<I, J>(extracted: I, explicit: J, allow_duplicate: bool) -> Vec<String>
where
    I: IntoIterator<Item = String>,
    J: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for candidate in extracted.into_iter().chain(explicit) {
        if !has_http_scheme(&candidate) {
            continue;
        }
        if !allow_duplicate && !seen.insert(candidate.clone()) {
            continue;
        }
        urls.push(candidate);
    }

    urls
}

/// Wraps normalized URLs as requests (no correlation id).
pub fn into_requests(urls: Vec<String>) -> Vec<ProbeRequest> {
    urls.into_iter().map(ProbeRequest::new).collect()
}

/// Keeps the first `limit` items. A missing or zero limit keeps everything.
pub fn apply_limit<T>(items: &mut Vec<T>, limit: Option<usize>) {
    if let Some(limit) = limit.filter(|&n| n > 0) {
        items.truncate(limit);
    }
}
