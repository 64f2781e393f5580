// src/collect/sources.rs
// =============================================================================
// Reads URLs out of input files and directories.
//
// Dispatch by what we are looking at:
// - directory        -> every regular file below it (sorted), plain regex scan
// - .json / .ipynb   -> every string value in the document, regex scan
// - .csv             -> every cell, regex scan
// - .md / .markdown  -> link destinations (pulldown-cmark) + regex scan
// - .html / .htm     -> element attributes (scraper) + regex scan
// - anything else    -> regex scan of the text
//
// One bad source never aborts the scan: it is logged with tracing and
// skipped, and collection moves on to the next path.
// =============================================================================

use crate::collect::html::extract_html_links;
use crate::collect::markdown::extract_markdown_links;
use crate::collect::text::UrlPattern;
use crate::error::CollectError;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Collects raw URL candidates from files, in discovery order.
#[derive(Debug, Clone)]
pub struct Collector {
    pattern: UrlPattern,
}

impl Collector {
    pub fn new(pattern: UrlPattern) -> Self {
        Collector { pattern }
    }

    /// Scans every path, skipping (and logging) the ones that fail.
    pub fn collect_paths(&self, paths: &[PathBuf]) -> Vec<String> {
        let mut found = Vec::new();

        for path in paths {
            if !path.exists() {
                warn!("Input path does not exist: {}", path.display());
                continue;
            }

            let before = found.len();
            let outcome = if path.is_dir() {
                self.collect_dir(path, &mut found);
                Ok(())
            } else {
                self.collect_file(path, &mut found)
            };

            match outcome {
                Ok(()) => debug!("{} candidate(s) from {}", found.len() - before, path.display()),
                Err(e) => warn!("Skipping {}: {}", path.display(), e),
            }
        }

        found
    }

    // Directories get the plain text treatment for every file, whatever its type.
    // Entries are visited depth-first, sorted by file name within each directory.
    fn collect_dir(&self, dir: &Path, found: &mut Vec<String>) {
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry under {}: {}", dir.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            // Unreadable files inside a directory are skipped quietly
            let Ok(bytes) = fs::read(entry.path()) else {
                continue;
            };
            self.scan_text(&String::from_utf8_lossy(&bytes), found);
        }
    }

    /// Scans a single file according to its extension.
    pub fn collect_file(&self, path: &Path, found: &mut Vec<String>) -> Result<(), CollectError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "json" | "ipynb" => {
                let text = read_lossy(path)?;
                let document: Value = serde_json::from_str(&text).map_err(|source| CollectError::Json {
                    path: path.to_path_buf(),
                    source,
                })?;
                self.scan_json(&document, found);
            }
            "csv" => self.scan_csv(path, found)?,
            "md" | "markdown" => {
                let text = read_lossy(path)?;
                found.extend(extract_markdown_links(&text));
                self.scan_text(&text, found);
            }
            "html" | "htm" => {
                let text = read_lossy(path)?;
                found.extend(extract_html_links(&text));
                self.scan_text(&text, found);
            }
            _ => {
                let text = read_lossy(path)?;
                self.scan_text(&text, found);
            }
        }
        Ok(())
    }

    fn scan_text(&self, text: &str, found: &mut Vec<String>) {
        found.extend(self.pattern.find_all(text).into_iter().map(str::to_string));
    }

    // Walks the document: object values in document order, array items in order
    fn scan_json(&self, value: &Value, found: &mut Vec<String>) {
        match value {
            Value::String(text) => self.scan_text(text, found),
            Value::Array(items) => items.iter().for_each(|item| self.scan_json(item, found)),
            Value::Object(map) => map.values().for_each(|item| self.scan_json(item, found)),
            _ => {}
        }
    }

    fn scan_csv(&self, path: &Path, found: &mut Vec<String>) -> Result<(), CollectError> {
        let text = read_lossy(path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        for record in reader.records() {
            let record = record.map_err(|source| CollectError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
            for cell in record.iter() {
                self.scan_text(cell, found);
            }
        }
        Ok(())
    }
}

// Reads a file as UTF-8, replacing invalid sequences
fn read_lossy(path: &Path) -> Result<String, CollectError> {
    let bytes = fs::read(path).map_err(|e| CollectError::io(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn collector() -> Collector {
        Collector::new(UrlPattern::new(None).unwrap())
    }

    #[test]
    fn test_plain_text_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        fs::write(&file, "first https://a.test/1 then https://b.test/2\n").unwrap();

        let found = collector().collect_paths(&[file]);
        assert_eq!(found, vec!["https://a.test/1", "https://b.test/2"]);
    }

    #[test]
    fn test_json_strings_are_walked_recursively() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("table.json");
        fs::write(
            &file,
            r#"[{"id": 1, "url": "https://a.test/"}, {"nested": {"list": ["see https://b.test/x"]}}, 42]"#,
        )
        .unwrap();

        let found = collector().collect_paths(&[file]);
        assert_eq!(found, vec!["https://a.test/", "https://b.test/x"]);
    }

    #[test]
    fn test_notebook_sources_are_scanned() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("demo.ipynb");
        fs::write(
            &file,
            r#"{"cells": [{"cell_type": "markdown", "source": ["Read https://nb.test/docs\n"]}]}"#,
        )
        .unwrap();

        assert_eq!(collector().collect_paths(&[file]), vec!["https://nb.test/docs"]);
    }

    #[test]
    fn test_csv_cells_are_scanned() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("links.csv");
        fs::write(&file, "name,link\nA,https://a.test/\nB,\"x https://b.test/ y\",extra\n").unwrap();

        let found = collector().collect_paths(&[file]);
        assert_eq!(found, vec!["https://a.test/", "https://b.test/"]);
    }

    #[test]
    fn test_markdown_uses_parser_and_regex() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("README.md");
        fs::write(&file, "[ref link][r] and bare https://bare.test/\n\n[r]: https://ref.test/\n").unwrap();

        let found = collector().collect_paths(&[file]);
        assert!(found.contains(&"https://ref.test/".to_string()));
        assert!(found.contains(&"https://bare.test/".to_string()));
    }

    #[test]
    fn test_bad_json_and_missing_paths_are_skipped() {
        let dir = tempdir().unwrap();
        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json https://hidden.test/").unwrap();
        let good = dir.path().join("good.txt");
        fs::write(&good, "https://good.test/").unwrap();
        let missing = dir.path().join("missing.txt");

        let found = collector().collect_paths(&[broken, missing, good]);
        assert_eq!(found, vec!["https://good.test/"]);
    }

    #[test]
    fn test_directory_is_scanned_recursively_in_sorted_order() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("b.txt"), "https://b.test/").unwrap();
        fs::write(dir.path().join("a.py"), "URL = 'https://a.test/'").unwrap();
        fs::write(dir.path().join("sub").join("c.json"), r#"{"u": "https://c.test/"}"#).unwrap();

        let found = collector().collect_paths(&[dir.path().to_path_buf()]);
        // a.py captures the trailing quote because ' is a legal URL character
        assert_eq!(found, vec!["https://a.test/'", "https://b.test/", "https://c.test/"]);
    }

    #[test]
    fn test_subdirectory_contents_come_in_name_order() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a_docs").join("deep")).unwrap();
        fs::write(dir.path().join("z.txt"), "https://z.test/").unwrap();
        fs::write(dir.path().join("b.txt"), "https://b.test/").unwrap();
        fs::write(dir.path().join("a_docs").join("y.md"), "https://y.test/").unwrap();
        fs::write(dir.path().join("a_docs").join("deep").join("x.txt"), "https://x.test/").unwrap();

        let found = collector().collect_paths(&[dir.path().to_path_buf()]);
        assert_eq!(
            found,
            vec!["https://x.test/", "https://y.test/", "https://b.test/", "https://z.test/"]
        );
    }
}
