// src/collect/text.rs
// =============================================================================
// Regex scanning of arbitrary text for URLs.
//
// This is the fallback for every kind of input: plain text, source files,
// CSV cells, JSON string values, and the raw text of Markdown/HTML (to catch
// bare URLs that are not part of a link element).
// =============================================================================

use crate::error::CollectError;
use regex::{Regex, RegexBuilder};

/// Built-in pattern: an http(s) scheme followed by URL-safe characters.
pub const DEFAULT_URL_PATTERN: &str = r"https?://[\w\-._~:/?#@!$&'()*+,;=%]+";

/// A compiled, case-insensitive URL pattern.
#[derive(Debug, Clone)]
pub struct UrlPattern {
    regex: Regex,
}

impl UrlPattern {
    /// Compiles `custom`, or the built-in pattern when none is given.
    pub fn new(custom: Option<&str>) -> Result<Self, CollectError> {
        let source = custom.unwrap_or(DEFAULT_URL_PATTERN);
        let regex = RegexBuilder::new(source).case_insensitive(true).build()?;
        Ok(UrlPattern { regex })
    }

    /// Every match in `text`, in order of appearance.
    pub fn find_all<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.regex.find_iter(text).map(|m| m.as_str()).collect()
    }
}
