// src/probe/types.rs
// =============================================================================
// The data that flows through the prober.
//
// - ProbeRequest: one URL to probe (plus an optional correlation id)
// - ProbeResult: the single, immutable outcome of probing that URL
// - Category: coarse classification of the outcome
// - FailureDetail: the last transport failure seen during a probe
//
// Every ProbeRequest produces exactly one ProbeResult. Results are created
// once by the task that probed the URL and never modified afterwards.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest error description kept in a result (in characters).
pub const MAX_ERROR_CHARS: usize = 500;

/// A URL to probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeRequest {
    /// Correlation key carried through to the result (e.g. a table row id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// The URL exactly as collected
    pub url: String,
}

impl ProbeRequest {
    pub fn new(url: impl Into<String>) -> Self {
        ProbeRequest { id: None, url: url.into() }
    }

    pub fn with_id(id: i64, url: impl Into<String>) -> Self {
        ProbeRequest { id: Some(id), url: url.into() }
    }
}

/// HTTP method used for an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Head,
    Get,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Head => "HEAD",
            Method::Get => "GET",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse classification of a probe's terminal outcome.
///
/// Variants are declared in report order, so sorting categories (or using
/// them as BTreeMap keys) lists them the way summaries print them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "2xx")]
    Success,
    #[serde(rename = "3xx")]
    Redirection,
    #[serde(rename = "4xx")]
    ClientError,
    #[serde(rename = "5xx")]
    ServerError,
    #[serde(rename = "other")]
    Other,
    #[serde(rename = "no_status")]
    NoStatus,
    #[serde(rename = "exception")]
    Exception,
}

impl Category {
    /// All categories in report order.
    pub const ALL: [Category; 7] = [
        Category::Success,
        Category::Redirection,
        Category::ClientError,
        Category::ServerError,
        Category::Other,
        Category::NoStatus,
        Category::Exception,
    ];

    /// Maps an HTTP status code (or its absence) to a category.
    pub fn from_status(status: Option<u16>) -> Self {
        match status {
            None => Category::NoStatus,
            Some(200..=299) => Category::Success,
            Some(300..=399) => Category::Redirection,
            Some(400..=499) => Category::ClientError,
            Some(500..=599) => Category::ServerError,
            Some(_) => Category::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Success => "2xx",
            Category::Redirection => "3xx",
            Category::ClientError => "4xx",
            Category::ServerError => "5xx",
            Category::Other => "other",
            Category::NoStatus => "no_status",
            Category::Exception => "exception",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of transport-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Connect,
    Dns,
    Tls,
    Redirect,
    InvalidUrl,
    Other,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Timeout => "Timeout",
            FailureKind::Connect => "ConnectError",
            FailureKind::Dns => "DnsError",
            FailureKind::Tls => "TlsError",
            FailureKind::Redirect => "TooManyRedirects",
            FailureKind::InvalidUrl => "InvalidUrl",
            FailureKind::Other => "RequestError",
        }
    }
}

/// The last transport failure observed while probing a URL.
///
/// Carried through the retry loop and overwritten on every failed attempt;
/// only the terminal failure branch turns it into the result's `error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureDetail {
    pub kind: FailureKind,
    pub message: String,
}

impl FailureDetail {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        FailureDetail { kind, message: message.into() }
    }

    /// "<Kind>: <message>", cut to at most MAX_ERROR_CHARS characters.
    pub fn describe(&self) -> String {
        truncate_chars(&format!("{}: {}", self.kind.as_str(), self.message), MAX_ERROR_CHARS)
    }
}

impl fmt::Display for FailureDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

/// The outcome of probing one URL.
///
/// Field order is the report column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub url: String,
    /// Address of the last redirect hop
    pub final_url: Option<String>,
    pub status_code: Option<u16>,
    /// true iff a status was obtained and lies in [200, 400)
    pub ok: bool,
    pub category: Category,
    /// Last transport failure of a failed probe; always set when no status was obtained
    pub error: Option<String>,
    /// Wall-clock time of the whole attempt sequence, retries included
    pub elapsed_ms: f64,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub retries_used: u32,
    pub method: Method,
    pub timestamp: DateTime<Utc>,
}

impl ProbeResult {
    /// Whether a status code counts as reachable.
    pub fn is_ok_status(status: Option<u16>) -> bool {
        matches!(status, Some(200..=399))
    }

    /// A result for a request that could not be probed at all.
    pub(crate) fn unprobed(request: &ProbeRequest, method: Method, detail: &FailureDetail) -> Self {
        ProbeResult {
            id: request.id,
            url: request.url.clone(),
            final_url: None,
            status_code: None,
            ok: false,
            category: Category::Exception,
            error: Some(detail.describe()),
            elapsed_ms: 0.0,
            content_type: None,
            content_length: None,
            retries_used: 0,
            method,
            timestamp: Utc::now(),
        }
    }
}

/// Cuts `text` to at most `max` characters without splitting a character.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}
