// src/probe/transport.rs
// =============================================================================
// The network seam of the prober.
//
// The engine never talks to reqwest directly. It sends one request at a time
// through the Transport trait and gets back either the response head
// (status, final URL, content headers) or a classified TransportError.
// That lets tests swap in a scripted transport with no network at all.
//
// ReqwestTransport is the real implementation:
// - one shared Client (connection pool) for every probe
// - browser-like default headers, since some sites answer 400/403 otherwise
// - connect timeout = half the total timeout, total timeout per attempt
// - redirects followed by the client; we report the last hop
// - the body is never read, so a GET costs about as much as a HEAD
// =============================================================================

use crate::config::ProbeConfig;
use crate::error::ConfigError;
use crate::probe::types::{FailureDetail, FailureKind, Method};
use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{redirect, Client, Proxy};
use std::error::Error as StdError;
use std::fmt::Write;
use url::Url;

/// How many redirect hops the client follows before giving up.
pub const MAX_REDIRECTS: usize = 10;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/127.0.0.0 Safari/537.36";

/// What the engine needs to know about a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    /// URL of the last hop after redirects
    pub final_url: String,
    pub content_type: Option<String>,
    /// Only set when the Content-Length header is purely numeric
    pub content_length: Option<u64>,
}

/// A failed attempt: no response head was received.
pub type TransportError = FailureDetail;

/// Sends a single request and reports the response head.
///
/// Implementations must be safe to share between all concurrently running
/// probes and must bound every call with a finite timeout.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, method: Method, url: &str) -> Result<TransportResponse, TransportError>;
}

/// Transport backed by a shared reqwest Client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds the shared client from the probe configuration.
    ///
    /// The proxy string is handed to reqwest as-is; if reqwest cannot parse
    /// it, that is a configuration error and nothing gets probed.
    pub fn new(config: &ProbeConfig) -> Result<Self, ConfigError> {
        let mut builder = Client::builder()
            .default_headers(default_headers())
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout())
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .pool_max_idle_per_host(config.concurrency);

        if !config.http2 {
            builder = builder.http1_only();
        }

        if let Some(proxy) = &config.proxy {
            let proxy_setting = Proxy::all(proxy.as_str()).map_err(|source| ConfigError::InvalidProxy {
                proxy: proxy.clone(),
                source,
            })?;
            builder = builder.proxy(proxy_setting);
        }

        let client = builder.build().map_err(ConfigError::Client)?;
        Ok(ReqwestTransport { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, method: Method, url: &str) -> Result<TransportResponse, TransportError> {
        // reqwest would reject these too, but with a much vaguer builder error
        let parsed = Url::parse(url)
            .map_err(|e| FailureDetail::new(FailureKind::InvalidUrl, format!("{url}: {e}")))?;

        let http_method = match method {
            Method::Head => reqwest::Method::HEAD,
            Method::Get => reqwest::Method::GET,
        };

        let response = self
            .client
            .request(http_method, parsed)
            .send()
            .await
            .map_err(|e| classify_error(&e))?;

        let headers = response.headers();
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let content_length = headers
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_length);

        Ok(TransportResponse {
            status: response.status().as_u16(),
            final_url: response.url().to_string(),
            content_type,
            content_length,
        })
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.8"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers
}

// Content-Length counts only when it is a plain run of ASCII digits
fn parse_content_length(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

// Sorts a reqwest error into one of our failure kinds
//
// reqwest only exposes a few predicates (is_timeout, is_connect, ...), so DNS
// and TLS problems are recognised from the error chain text.
fn classify_error(error: &reqwest::Error) -> TransportError {
    let message = error_chain(error);
    let lowered = message.to_lowercase();

    let kind = if error.is_timeout() {
        FailureKind::Timeout
    } else if error.is_redirect() {
        FailureKind::Redirect
    } else if error.is_builder() {
        FailureKind::InvalidUrl
    } else if lowered.contains("dns error") || lowered.contains("failed to lookup address") {
        FailureKind::Dns
    } else if lowered.contains("certificate") || lowered.contains("tls") || lowered.contains("ssl") {
        FailureKind::Tls
    } else if error.is_connect() {
        FailureKind::Connect
    } else {
        FailureKind::Other
    };

    FailureDetail::new(kind, message)
}

// Flattens an error and its sources into one line
fn error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let _ = write!(text, ": {cause}");
        source = cause.source();
    }
    text
}
