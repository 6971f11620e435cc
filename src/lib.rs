//! billmerge - Merge Alipay and WeChat Pay bill exports
//!
//! This library reconciles the CSV bill exports of two payment providers
//! into one unified ledger table, then renders that table as a Markdown
//! report with income and expense totals, per-category breakdowns and a
//! chronological ledger.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Settings and path management
//! - `error`: Custom error types
//! - `models`: The common schema, money and transaction records
//! - `import`: Decoding and column mapping of provider exports
//! - `storage`: The unified table and atomic file writes
//! - `services`: Reconciliation and report generation
//! - `reports`: Ledger summaries and Markdown rendering
//!
//! # Example
//!
//! ```rust,ignore
//! use billmerge::config::{AppPaths, PipelinePaths, Settings};
//! use billmerge::services::{reconcile_or_log, ReportService};
//!
//! let app_paths = AppPaths::new()?;
//! let settings = Settings::load_or_create(&app_paths)?;
//! let paths = PipelinePaths::from_settings(&settings);
//!
//! reconcile_or_log(&settings, &paths);
//! ReportService::new(&settings).generate(&paths)?;
//! ```

pub mod config;
pub mod error;
pub mod import;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{BillError, BillResult};
