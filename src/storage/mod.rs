//! Storage layer for billmerge
//!
//! Atomic file writes and the unified ledger table format.

pub mod file_io;
pub mod unified;

pub use file_io::{require_parent_dir, write_atomic, write_text_atomic};
pub use unified::{read_unified, write_unified};
