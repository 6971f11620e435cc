//! Business logic layer for billmerge
//!
//! The two pipeline stages: reconciliation of the exports into the unified
//! table, and report generation from that table.

pub mod reconcile;
pub mod report;

pub use reconcile::{reconcile_or_log, ReconcileService, ReconcileSummary, SourceCounts};
pub use report::ReportService;
