// src/report/failed.rs
// =============================================================================
// Follow-up reports built from an existing JSON report.
//
// Reads a report written by `write_reports`, keeps only the entries that are
// not ok, and writes a slim version of them as JSON, CSV and Markdown. The
// report is read as loose JSON (not as ProbeResult) so hand-edited or older
// reports with missing fields still work.
//
// Optionally deletes the full reports living next to the input report.
// =============================================================================

use crate::error::ReportError;
use crate::probe::truncate_chars;
use crate::report::writers::{ensure_parent, with_suffix, write_json};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Error text in the Markdown table is cut to this many characters.
pub const MARKDOWN_ERROR_CHARS: usize = 100;

/// File name prefixes of reports that `delete_others` removes.
pub const REMOVABLE_REPORTS: [&str; 3] = [
    "link_check_full.",
    "link_check_manual.",
    "index_table_links_report.",
];

/// One failing entry, reduced to what is needed to fix the link.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedEntry {
    pub id: Option<i64>,
    pub url: Option<String>,
    pub final_url: Option<String>,
    pub status_code: Option<u64>,
    pub error: Option<String>,
}

impl FailedEntry {
    fn from_row(row: &Value) -> Self {
        let text = |key: &str| row.get(key).and_then(Value::as_str).map(str::to_string);
        FailedEntry {
            id: row.get("id").and_then(Value::as_i64),
            url: text("url"),
            final_url: text("final_url"),
            status_code: row.get("status_code").and_then(Value::as_u64),
            error: text("error"),
        }
    }
}

/// Paths of the three failure report files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedPaths {
    pub json: PathBuf,
    pub csv: PathBuf,
    pub markdown: PathBuf,
}

impl FailedPaths {
    fn for_prefix(prefix: &Path) -> Self {
        FailedPaths {
            json: with_suffix(prefix, ".json"),
            csv: with_suffix(prefix, ".csv"),
            markdown: with_suffix(prefix, ".md"),
        }
    }

    fn contains(&self, path: &Path) -> bool {
        [&self.json, &self.csv, &self.markdown]
            .into_iter()
            .any(|kept| same_file(kept, path))
    }
}

/// Loads a report; the top-level value must be a JSON array.
pub fn load_report(path: &Path) -> Result<Vec<Value>, ReportError> {
    let text = fs::read_to_string(path).map_err(|e| ReportError::io(path, e))?;
    let document: Value = serde_json::from_str(&text).map_err(|source| ReportError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    match document {
        Value::Array(rows) => Ok(rows),
        _ => Err(ReportError::NotAnArray(path.to_path_buf())),
    }
}

/// Entries whose `ok` field is missing or falsy.
pub fn filter_failed(rows: &[Value]) -> Vec<FailedEntry> {
    rows.iter()
        .filter(|row| !is_truthy(row.get("ok")))
        .map(FailedEntry::from_row)
        .collect()
}

// Same notion of "falsy" as a loosely typed JSON consumer would use
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

/// Writes `<prefix>.json`, `<prefix>.csv` and `<prefix>.md`.
pub fn write_failed(entries: &[FailedEntry], prefix: &Path) -> Result<FailedPaths, ReportError> {
    ensure_parent(prefix)?;
    let paths = FailedPaths::for_prefix(prefix);

    write_json(entries, &paths.json)?;

    let csv_error = |source| ReportError::Csv { path: paths.csv.clone(), source };
    let mut writer = csv::Writer::from_path(&paths.csv).map_err(csv_error)?;
    for entry in entries {
        writer.serialize(entry).map_err(csv_error)?;
    }
    if entries.is_empty() {
        writer
            .write_record(["id", "url", "final_url", "status_code", "error"])
            .map_err(csv_error)?;
    }
    writer.flush().map_err(|e| ReportError::io(&paths.csv, e))?;

    fs::write(&paths.markdown, render_markdown(entries))
        .map_err(|e| ReportError::io(&paths.markdown, e))?;

    Ok(paths)
}

/// Markdown table of failing entries.
pub fn render_markdown(entries: &[FailedEntry]) -> String {
    let mut out = String::from("# Failed Links\n\n");
    out.push_str(&format!("Total Failed: {}\n\n", entries.len()));
    out.push_str("| id | status | url | error |\n|----|--------|-----|-------|\n");

    for entry in entries {
        let id = entry.id.map_or_else(|| "None".to_string(), |id| id.to_string());
        let status = entry
            .status_code
            .map_or_else(|| "None".to_string(), |s| s.to_string());
        let url = entry.url.as_deref().unwrap_or("None");
        let error = truncate_chars(entry.error.as_deref().unwrap_or(""), MARKDOWN_ERROR_CHARS)
            .replace('\n', " ");
        out.push_str(&format!("| {id} | {status} | {url} | {error} |\n"));
    }
    out
}

/// Removes full reports in `base_dir`, never touching the files in `keep`.
///
/// Returns the names of the removed files. A file that cannot be removed
/// is logged and skipped.
pub fn delete_others(keep: &FailedPaths, base_dir: &Path) -> Result<Vec<String>, ReportError> {
    let mut entries: Vec<PathBuf> = fs::read_dir(base_dir)
        .map_err(|e| ReportError::io(base_dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    entries.sort();

    let mut removed = Vec::new();
    for path in entries {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !REMOVABLE_REPORTS.iter().any(|prefix| name.starts_with(prefix)) {
            continue;
        }
        if keep.contains(&path) {
            debug!(path = %path.display(), "keeping freshly written report");
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => removed.push(name.to_string()),
            Err(e) => warn!(path = %path.display(), error = %e, "failed to delete report"),
        }
    }
    Ok(removed)
}

// Compares resolved paths when both exist, raw paths otherwise
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_filter_failed_treats_missing_ok_as_failure() {
        let rows = vec![
            json!({"id": 1, "url": "https://a.test/", "ok": true, "status_code": 200}),
            json!({"id": 2, "url": "https://b.test/", "ok": false, "status_code": 404}),
            json!({"id": 3, "url": "https://c.test/", "error": "Timeout: slow"}),
            json!({"url": "https://d.test/", "ok": null}),
        ];

        let failed = filter_failed(&rows);
        assert_eq!(failed.len(), 3);
        assert_eq!(failed[0].id, Some(2));
        assert_eq!(failed[0].status_code, Some(404));
        assert_eq!(failed[1].error.as_deref(), Some("Timeout: slow"));
        assert_eq!(failed[2].id, None);
    }

    #[test]
    fn test_load_report_requires_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.json");
        fs::write(&path, r#"{"ok": false}"#).unwrap();
        assert!(matches!(load_report(&path), Err(ReportError::NotAnArray(_))));

        fs::write(&path, "not json").unwrap();
        assert!(matches!(load_report(&path), Err(ReportError::Json { .. })));

        let missing = dir.path().join("missing.json");
        assert!(matches!(load_report(&missing), Err(ReportError::Io { .. })));
    }

    #[test]
    fn test_markdown_truncates_and_flattens_errors() {
        let entries = vec![FailedEntry {
            id: Some(9),
            url: Some("https://x.test/".to_string()),
            final_url: None,
            status_code: None,
            error: Some(format!("ConnectError: line one\nline two {}", "z".repeat(200))),
        }];

        let md = render_markdown(&entries);
        assert!(md.starts_with("# Failed Links\n\nTotal Failed: 1\n\n"));
        let row = md.lines().last().unwrap();
        assert!(row.starts_with("| 9 | None | https://x.test/ | ConnectError: line one line two "));
        let error_cell = row.split(" | ").nth(3).unwrap().trim_end_matches(" |");
        assert_eq!(error_cell.chars().count(), MARKDOWN_ERROR_CHARS);
    }

    #[test]
    fn test_write_failed_and_delete_others() {
        let dir = tempdir().unwrap();
        let report = dir.path().join("index_table_links_report.json");
        fs::write(
            &report,
            r#"[{"id": 1, "url": "https://a.test/", "ok": true},
                {"id": 2, "url": "https://b.test/", "ok": false, "status_code": 500}]"#,
        )
        .unwrap();
        fs::write(dir.path().join("index_table_links_report.csv"), "id,url\n").unwrap();
        fs::write(dir.path().join("link_check_full.json"), "[]").unwrap();
        fs::write(dir.path().join("notes.txt"), "keep me").unwrap();

        let failed = filter_failed(&load_report(&report).unwrap());
        let paths = write_failed(&failed, &dir.path().join("index_table_links_failed")).unwrap();

        let csv_text = fs::read_to_string(&paths.csv).unwrap();
        assert_eq!(csv_text, "id,url,final_url,status_code,error\n2,https://b.test/,,500,\n");

        let removed = delete_others(&paths, dir.path()).unwrap();
        assert_eq!(
            removed,
            vec![
                "index_table_links_report.csv",
                "index_table_links_report.json",
                "link_check_full.json",
            ]
        );
        assert!(paths.json.exists());
        assert!(paths.csv.exists());
        assert!(paths.markdown.exists());
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_delete_others_never_removes_kept_outputs() {
        let dir = tempdir().unwrap();
        // Output prefix chosen so the new files match a removable pattern
        let paths = write_failed(&[], &dir.path().join("index_table_links_report")).unwrap();

        let removed = delete_others(&paths, dir.path()).unwrap();
        assert!(removed.is_empty());
        assert!(paths.json.exists());
        assert_eq!(
            fs::read_to_string(&paths.csv).unwrap(),
            "id,url,final_url,status_code,error\n"
        );
    }
}
