//! Raw tabular source loading
//!
//! Bill exports start with a block of free-form preamble lines (account
//! name, date range, disclaimers) before the real header row. A `RawTable`
//! is the header plus data rows left after skipping that preamble.

use std::path::Path;

use csv::ReaderBuilder;
use encoding_rs::Encoding;

use super::encoding::decode;
use crate::error::{BillError, BillResult};

/// Header and data rows of a CSV export, cells trimmed
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Load a CSV file, skipping `skip_rows` leading lines
    pub fn load(path: &Path, skip_rows: usize, encoding: &'static Encoding) -> BillResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => BillError::SourceNotFound {
                path: path.to_path_buf(),
            },
            _ => BillError::Io(format!("Failed to read {}: {}", path.display(), e)),
        })?;

        let text = decode(&bytes, encoding)
            .map_err(|e| BillError::malformed(format!("{}: {}", path.display(), e)))?;

        Self::parse(&text, skip_rows)
            .map_err(|e| BillError::malformed(format!("{}: {}", path.display(), e)))
    }

    /// Parse already-decoded CSV text
    pub fn parse(text: &str, skip_rows: usize) -> BillResult<Self> {
        let body = skip_lines(text, skip_rows);

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(body.as_bytes());

        let mut records = reader.records();

        let headers: Vec<String> = loop {
            match records.next() {
                Some(record) => {
                    let record = record?;
                    if record.iter().any(|c| !c.trim().is_empty()) {
                        break record.iter().map(|c| c.trim().to_string()).collect();
                    }
                }
                None => {
                    return Err(BillError::malformed(format!(
                        "no header row after skipping {} lines",
                        skip_rows
                    )))
                }
            }
        };

        let mut rows = Vec::new();
        for record in records {
            let record = record?;
            if record.iter().all(|c| c.trim().is_empty()) {
                continue;
            }
            rows.push(record.iter().map(|c| c.trim().to_string()).collect());
        }

        Ok(Self { headers, rows })
    }

    /// Index of a header by exact name
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell text; rows shorter than the header read as empty
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Drop the first `n` lines of `text`
fn skip_lines(text: &str, n: usize) -> &str {
    let mut rest = text;
    for _ in 0..n {
        match rest.find('\n') {
            Some(idx) => rest = &rest[idx + 1..],
            None => return "",
        }
    }
    rest
}
