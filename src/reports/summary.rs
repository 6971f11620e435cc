//! Ledger summary
//!
//! Totals by direction and per-category breakdowns of the unified table.
//! Breakdowns refer to records by index so the report can render the
//! source rows in table order.

use std::collections::HashMap;

use crate::models::{Direction, Money, TransactionRecord};

/// Total for one category within a direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    /// Category label
    pub category: String,
    /// Sum of amounts in this category
    pub total: Money,
    /// Indices of this category's records, in table order
    pub rows: Vec<usize>,
}

/// Per-category totals for one direction, largest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectionBreakdown {
    pub categories: Vec<CategoryTotal>,
}

impl DirectionBreakdown {
    /// Group the records with `direction` by category
    ///
    /// Categories are ordered by descending total; equal totals keep the
    /// order in which the category first appears.
    pub fn build(records: &[TransactionRecord], direction: Direction) -> Self {
        let mut categories: Vec<CategoryTotal> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for (row, record) in records.iter().enumerate() {
            if record.direction != direction {
                continue;
            }
            let slot = *index.entry(record.category.as_str()).or_insert_with(|| {
                categories.push(CategoryTotal {
                    category: record.category.clone(),
                    total: Money::zero(),
                    rows: Vec::new(),
                });
                categories.len() - 1
            });
            categories[slot].total = categories[slot].total.saturating_add(record.amount);
            categories[slot].rows.push(row);
        }

        categories.sort_by(|a, b| b.total.cmp(&a.total));

        Self { categories }
    }

    /// Sum over all categories
    pub fn total(&self) -> Money {
        self.categories.iter().map(|c| c.total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Summary of a unified ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSummary {
    pub total_expense: Money,
    pub total_income: Money,
    /// Income minus expense; may be negative
    pub balance: Money,
    pub expense: DirectionBreakdown,
    pub income: DirectionBreakdown,
    /// Record indices sorted by timestamp text, ascending
    pub ledger: Vec<usize>,
}

impl LedgerSummary {
    /// Compute the summary of a set of records
    pub fn build(records: &[TransactionRecord]) -> Self {
        let total_expense: Money = records
            .iter()
            .filter(|r| r.is_expense())
            .map(|r| r.amount)
            .sum();
        let total_income: Money = records
            .iter()
            .filter(|r| r.is_income())
            .map(|r| r.amount)
            .sum();

        Self {
            total_expense,
            total_income,
            balance: total_income - total_expense,
            expense: DirectionBreakdown::build(records, Direction::Expense),
            income: DirectionBreakdown::build(records, Direction::Income),
            ledger: ledger_order(records),
        }
    }
}

/// Indices of `records` ordered by raw timestamp string
///
/// The sort is stable, so rows with identical timestamps keep table order.
pub fn ledger_order(records: &[TransactionRecord]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..records.len()).collect();
    order.sort_by(|&a, &b| records[a].timestamp.cmp(&records[b].timestamp));
    order
}
