//! Import layer for bill exports
//!
//! - `encoding`: text encoding resolution and detection
//! - `table`: CSV loading with preamble skipping
//! - `mapping`: native column names onto the common schema

pub mod encoding;
pub mod mapping;
pub mod table;

pub use encoding::{decode, detect_or, resolve_encoding, EncodingDetector, SniffingDetector};
pub use mapping::{ColumnMapping, ColumnSource, ResolvedColumns};
pub use table::RawTable;
