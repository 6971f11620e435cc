//! Core data models for billmerge
//!
//! This module contains the data structures of the unified ledger: the
//! common schema, transaction records, and the money type.

pub mod money;
pub mod record;
pub mod schema;

pub use money::{Money, MoneyParseError};
pub use record::{Direction, Provenance, TransactionRecord};
pub use schema::{Field, PROVENANCE_COLUMN};
