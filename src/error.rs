// src/error.rs
// =============================================================================
// Typed errors for the library API.
//
// Only three things can go wrong in a way the caller has to handle:
// - the probe configuration is invalid (fail fast, before any probing)
// - an input source cannot be collected (logged and skipped by the collector)
// - a report cannot be written or read back
//
// A single URL failing to respond is NOT an error at this level. The probe
// engine turns every network failure into a ProbeResult instead.
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

/// Invalid probe configuration. Raised before any request is sent.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("timeout must be a positive, finite number of seconds (got {0})")]
    InvalidTimeout(f64),

    #[error("jitter must be a non-negative, finite number of seconds (got {0})")]
    InvalidJitter(f64),

    #[error("invalid proxy '{proxy}': {source}")]
    InvalidProxy {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Failure while reading URLs out of one input source.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("top-level JSON value in {0} is not an array")]
    NotAnArray(PathBuf),

    #[error("invalid URL pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Failure while writing a report or reading one back.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error on {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV error on {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("top-level JSON value in report {0} is not an array")]
    NotAnArray(PathBuf),
}

impl ReportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReportError::Io { path: path.into(), source }
    }
}

impl CollectError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CollectError::Io { path: path.into(), source }
    }
}
