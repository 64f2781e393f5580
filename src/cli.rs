// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Three subcommands:
// - check:  collect URLs from files/directories (and --url) and probe them
// - table:  probe the (id, url) rows of a JSON table
// - failed: turn an existing JSON report into a failures-only report
//
// The network flags shared by `check` and `table` live in NetworkArgs and are
// pulled into both subcommands with #[command(flatten)].
//
// Rust concepts:
// - Derive macros: clap generates the parser from the struct definitions
// - Option<T>: flags that may be absent (no default value)
// - Vec<T>: flags that can be given several times
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "link-prober",
    version,
    about = "Collect URLs from files and check that they are reachable",
    long_about = "link-prober extracts URLs from text, JSON, CSV, Markdown and HTML files, \
                  probes them concurrently with HEAD/GET plus retries, and writes JSON/CSV reports. \
                  Exit code 1 means at least one URL failed, so it fits CI pipelines."
)]
pub struct Cli {
    /// Show per-attempt debug logs
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract URLs from files and probe them
    ///
    /// Example: link-prober check --inputs docs README.md --url https://example.com
    Check(CheckArgs),

    /// Probe the (id, url) rows of a JSON table
    ///
    /// Example: link-prober table --file files/index_table_from_excel.json
    Table(TableArgs),

    /// Write a failures-only report from an existing JSON report
    ///
    /// Example: link-prober failed --report reports/index_table_links_report.json --delete-others
    Failed(FailedArgs),
}

/// Settings that control how URLs are probed.
#[derive(Args, Debug, Clone)]
pub struct NetworkArgs {
    /// Maximum number of URLs probed at the same time
    #[arg(long, default_value_t = 20)]
    pub concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 15.0)]
    pub timeout: f64,

    /// Extra attempt cycles after the first one
    #[arg(long, default_value_t = 2)]
    pub retries: u32,

    /// Skip HEAD and go straight to GET
    #[arg(long)]
    pub no_head: bool,

    /// Random delay of up to this many seconds before each attempt cycle
    #[arg(long, default_value_t = 0.0)]
    pub jitter: f64,

    /// Allow HTTP/2 (HTTP/1.1 only by default)
    #[arg(long)]
    pub http2: bool,

    /// Proxy URL used for every request (e.g. http://127.0.0.1:8080)
    #[arg(long)]
    pub proxy: Option<String>,

    /// Treat a 4xx/5xx GET as final instead of retrying it
    #[arg(long)]
    pub no_retry_http_errors: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Files or directories to extract URLs from
    #[arg(long, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// A URL to probe directly (repeatable)
    #[arg(long = "url")]
    pub urls: Vec<String>,

    /// Probe duplicate URLs once per occurrence
    #[arg(long)]
    pub allow_duplicate: bool,

    /// Custom regex used to find URLs in text
    #[arg(long)]
    pub extract_regex: Option<String>,

    /// Only probe the first N URLs (0 = no limit)
    #[arg(long)]
    pub limit: Option<usize>,

    /// Report path prefix; .json and .csv are appended
    /// (default: reports/link_check_report_<timestamp>)
    #[arg(long)]
    pub output_prefix: Option<PathBuf>,

    /// Print the results as JSON on stdout instead of the summary
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub network: NetworkArgs,
}

#[derive(Args, Debug)]
pub struct TableArgs {
    /// JSON array of objects with integer `id` and `url` fields
    #[arg(long, default_value = "files/index_table_from_excel.json")]
    pub file: PathBuf,

    /// Only probe the first N rows (0 = no limit)
    #[arg(long)]
    pub limit: Option<usize>,

    /// Report path prefix; .json and .csv are appended
    #[arg(long, default_value = "reports/index_table_links_report")]
    pub output_prefix: PathBuf,

    /// Print the results as JSON on stdout instead of the summary
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub network: NetworkArgs,
}

#[derive(Args, Debug)]
pub struct FailedArgs {
    /// Full JSON report to read
    #[arg(long, default_value = "reports/index_table_links_report.json")]
    pub report: PathBuf,

    /// Prefix for the failure reports; .json, .csv and .md are appended
    #[arg(long, default_value = "reports/index_table_links_failed")]
    pub output_prefix: PathBuf,

    /// Delete the full reports next to --report (never the new files)
    #[arg(long)]
    pub delete_others: bool,
}
