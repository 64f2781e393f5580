// src/report/writers.rs
// =============================================================================
// Writes reports for a finished run and renders the human summary.
//
// Files produced for a prefix like "reports/link_check_report_20260101_120000":
// - <prefix>.json  pretty-printed array of results, field for field
// - <prefix>.csv   same fields as columns (absent values are empty cells)
//
// The parent directory is created when missing. An empty run still gets
// both files: "[]" and a header-only CSV.
// =============================================================================

use crate::error::ReportError;
use crate::probe::{Category, Method, ProbeResult};
use crate::report::aggregate::Summary;
use serde::Serialize;
use std::ffi::OsString;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Column order of the CSV report (matches the JSON field order).
pub const CSV_COLUMNS: [&str; 13] = [
    "id",
    "url",
    "final_url",
    "status_code",
    "ok",
    "category",
    "error",
    "elapsed_ms",
    "content_type",
    "content_length",
    "retries_used",
    "method",
    "timestamp",
];

/// Where the reports of a run were written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub csv: PathBuf,
}

// One CSV line; borrowed so writing does not clone every result
#[derive(Serialize)]
struct CsvRow<'a> {
    id: Option<i64>,
    url: &'a str,
    final_url: Option<&'a str>,
    status_code: Option<u16>,
    ok: bool,
    category: Category,
    error: Option<&'a str>,
    elapsed_ms: String,
    content_type: Option<&'a str>,
    content_length: Option<u64>,
    retries_used: u32,
    method: Method,
    timestamp: String,
}

impl<'a> From<&'a ProbeResult> for CsvRow<'a> {
    fn from(r: &'a ProbeResult) -> Self {
        CsvRow {
            id: r.id,
            url: &r.url,
            final_url: r.final_url.as_deref(),
            status_code: r.status_code,
            ok: r.ok,
            category: r.category,
            error: r.error.as_deref(),
            elapsed_ms: format!("{:.1}", r.elapsed_ms),
            content_type: r.content_type.as_deref(),
            content_length: r.content_length,
            retries_used: r.retries_used,
            method: r.method,
            timestamp: r.timestamp.to_rfc3339(),
        }
    }
}

/// "<prefix><suffix>" without going through a lossy string conversion.
pub fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(prefix.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Creates the directory that will hold `<prefix>.*` files.
pub fn ensure_parent(prefix: &Path) -> Result<(), ReportError> {
    match prefix.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| ReportError::io(parent, e))
        }
        _ => Ok(()),
    }
}

/// Writes `<prefix>.json` and `<prefix>.csv` for the given results.
pub fn write_reports(results: &[ProbeResult], prefix: &Path) -> Result<ReportPaths, ReportError> {
    ensure_parent(prefix)?;
    let paths = ReportPaths {
        json: with_suffix(prefix, ".json"),
        csv: with_suffix(prefix, ".csv"),
    };
    write_json(results, &paths.json)?;
    write_csv(results, &paths.csv)?;
    Ok(paths)
}

/// Writes any serializable value as pretty JSON.
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), ReportError> {
    let file = File::create(path).map_err(|e| ReportError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|source| ReportError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|e| ReportError::io(path, e))
}

fn write_csv(results: &[ProbeResult], path: &Path) -> Result<(), ReportError> {
    let csv_error = |source| ReportError::Csv { path: path.to_path_buf(), source };

    // Header written by hand so that an empty run still gets one
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(csv_error)?;
    writer.write_record(CSV_COLUMNS).map_err(csv_error)?;
    for result in results {
        writer.serialize(CsvRow::from(result)).map_err(csv_error)?;
    }
    writer.flush().map_err(|e| ReportError::io(path, e))
}

/// Renders the end-of-run summary shown to humans.
pub fn render_summary(summary: &Summary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n===== Summary =====");
    let _ = writeln!(out, "Total: {}", summary.total);
    let _ = writeln!(
        out,
        "OK: {}  ({:.1}%)",
        summary.ok,
        summary.success_ratio() * 100.0
    );
    for (category, count) in &summary.by_category {
        let _ = writeln!(out, "{category}: {count}");
    }

    if !summary.failures.is_empty() {
        let _ = writeln!(out, "\nFirst {} failures:", summary.failures.len());
        for failure in &summary.failures {
            let status = failure
                .status_code
                .map_or_else(|| "None".to_string(), |s| s.to_string());
            let error = failure.error.as_deref().unwrap_or("None");
            let _ = writeln!(out, " - {} | status={} | err={}", failure.url, status, error);
        }
    }
    out
}

pub fn print_summary(summary: &Summary) {
    print!("{}", render_summary(summary));
}
