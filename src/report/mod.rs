// src/report/mod.rs
// =============================================================================
// Everything that happens after probing.
//
// Submodules:
// - aggregate: deterministic ordering and the run summary
// - writers: JSON/CSV reports and the printed summary
// - failed: slim follow-up reports of the failing entries
// =============================================================================

mod aggregate;
mod failed;
mod writers;

pub use aggregate::{aggregate, summarize, Aggregate, Summary, FAILURE_SAMPLE};
pub use failed::{
    delete_others, filter_failed, load_report, render_markdown, write_failed, FailedEntry,
    FailedPaths, MARKDOWN_ERROR_CHARS, REMOVABLE_REPORTS,
};
pub use writers::{
    print_summary, render_summary, with_suffix, write_json, write_reports, ReportPaths,
    CSV_COLUMNS,
};
