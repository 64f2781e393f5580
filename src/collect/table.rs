// src/collect/table.rs
// =============================================================================
// Loads (id, url) rows from a JSON table.
//
// The table is a JSON array of objects. A row is used when its `id` is an
// integer and its `url` is a string with an http(s) scheme; every other row
// (and every other field) is ignored. The id becomes the correlation key that
// the aggregator sorts by.
// =============================================================================

use crate::collect::normalize::has_http_scheme;
use crate::error::CollectError;
use crate::probe::ProbeRequest;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Reads the table at `path` into probe requests, in file order.
pub fn load_table(path: &Path) -> Result<Vec<ProbeRequest>, CollectError> {
    let bytes = fs::read(path).map_err(|e| CollectError::io(path, e))?;
    let text = String::from_utf8_lossy(&bytes);
    let document: Value = serde_json::from_str(&text).map_err(|source| CollectError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let Value::Array(rows) = document else {
        return Err(CollectError::NotAnArray(path.to_path_buf()));
    };

    Ok(rows.iter().filter_map(row_to_request).collect())
}

fn row_to_request(row: &Value) -> Option<ProbeRequest> {
    let id = row.get("id")?.as_i64()?;
    let url = row.get("url")?.as_str()?;
    has_http_scheme(url).then(|| ProbeRequest::with_id(id, url))
}
