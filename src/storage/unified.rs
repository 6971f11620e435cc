//! The unified ledger table
//!
//! A UTF-8 CSV with a header row: the eleven schema columns followed by the
//! provenance column. It is the only hand-off between reconciliation and
//! reporting.

use std::path::Path;

use encoding_rs::Encoding;

use super::file_io::write_atomic;
use crate::error::{BillError, BillResult};
use crate::import::encoding::{decode, detect_or, EncodingDetector};
use crate::models::{Field, TransactionRecord, PROVENANCE_COLUMN};

/// Header row of the unified table
pub fn header() -> Vec<&'static str> {
    Field::ALL
        .iter()
        .map(|f| f.column_name())
        .chain(std::iter::once(PROVENANCE_COLUMN))
        .collect()
}

/// Serialize records as CSV into any writer
///
/// The header row is written even when there are no records.
pub fn write_records<W: std::io::Write>(writer: W, records: &[TransactionRecord]) -> BillResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(header())?;
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer
        .flush()
        .map_err(|e| BillError::Io(format!("Failed to flush CSV: {}", e)))
}

/// Persist the unified table atomically
pub fn write_unified<P: AsRef<Path>>(path: P, records: &[TransactionRecord]) -> BillResult<()> {
    write_atomic(path, |writer| write_records(writer, records))
}

/// Parse unified-table CSV text
pub fn parse_records(text: &str) -> BillResult<Vec<TransactionRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for (idx, result) in reader.deserialize().enumerate() {
        let record: TransactionRecord = result
            .map_err(|e| BillError::malformed(format!("unified table row {}: {}", idx + 1, e)))?;
        records.push(record);
    }
    Ok(records)
}

/// Read the unified table, detecting its text encoding from the raw bytes
pub fn read_unified<P: AsRef<Path>>(
    path: P,
    detector: &dyn EncodingDetector,
    fallback: &'static Encoding,
) -> BillResult<Vec<TransactionRecord>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => BillError::SourceNotFound {
            path: path.to_path_buf(),
        },
        _ => BillError::Io(format!("Failed to read {}: {}", path.display(), e)),
    })?;

    let encoding = detect_or(detector, &bytes, fallback);
    tracing::debug!(path = %path.display(), encoding = encoding.name(), "Reading unified table");

    let text = decode(&bytes, encoding)?;
    parse_records(&text)
}
