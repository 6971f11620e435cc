//! Reports module for billmerge
//!
//! Summarizes the unified ledger and renders it as Markdown.

pub mod markdown;
pub mod summary;

pub use markdown::render;
pub use summary::{ledger_order, CategoryTotal, DirectionBreakdown, LedgerSummary};
