//! Column mapping from export-native headers onto the common schema
//!
//! Each export gets an explicit table of native header name to schema
//! field. Fields without a renamed entry are looked up under their unified
//! name; if that is absent too, the mapping either fails (strict) or fills
//! the field with a placeholder.

use super::table::RawTable;
use crate::error::{BillError, BillResult};
use crate::models::{Field, Provenance};

/// Where a schema field's value comes from for one export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSource {
    /// Index of the export column
    Column(usize),
    /// The export has no such column; every row gets the placeholder
    Placeholder,
}

/// Column mapping configuration for one export format
#[derive(Debug, Clone)]
pub struct ColumnMapping {
    /// Native header name -> schema field
    pub renames: Vec<(String, Field)>,
    /// Whether every schema field must be present in the export
    pub strict: bool,
}

impl ColumnMapping {
    /// Alipay exports already use the unified column names
    pub fn alipay() -> Self {
        Self {
            renames: Vec::new(),
            strict: true,
        }
    }

    /// WeChat Pay exports: six renamed columns, no counterparty account
    pub fn wechat() -> Self {
        let renames = [
            ("交易单号", Field::OrderId),
            ("交易类型", Field::Category),
            ("商品", Field::Description),
            ("金额(元)", Field::Amount),
            ("支付方式", Field::PaymentMethod),
            ("当前状态", Field::Status),
        ];
        Self {
            renames: renames
                .into_iter()
                .map(|(native, field)| (native.to_string(), field))
                .collect(),
            strict: false,
        }
    }

    /// Mapping for a provider
    pub fn for_provenance(provenance: Provenance) -> Self {
        match provenance {
            Provenance::Alipay => Self::alipay(),
            Provenance::Wechat => Self::wechat(),
        }
    }

    /// Native header name for a field, falling back to the unified name
    pub fn native_name(&self, field: Field) -> &str {
        self.renames
            .iter()
            .find(|(_, f)| *f == field)
            .map(|(native, _)| native.as_str())
            .unwrap_or_else(|| field.column_name())
    }

    /// Resolve every schema field against an export's headers
    ///
    /// A strict mapping reports all absent columns at once.
    pub fn resolve(&self, table: &RawTable, source_name: &str) -> BillResult<ResolvedColumns> {
        let mut sources = Vec::with_capacity(Field::ALL.len());
        let mut missing = Vec::new();

        for field in Field::ALL {
            let native = self.native_name(field);
            match table.column(native) {
                Some(idx) => sources.push((field, ColumnSource::Column(idx))),
                None => {
                    missing.push(native.to_string());
                    sources.push((field, ColumnSource::Placeholder));
                }
            }
        }

        if self.strict && !missing.is_empty() {
            return Err(BillError::SchemaIncomplete {
                source_name: source_name.to_string(),
                missing,
            });
        }

        if !missing.is_empty() {
            tracing::debug!(
                source = source_name,
                columns = ?missing,
                "Filling absent columns with placeholder"
            );
        }

        Ok(ResolvedColumns { sources })
    }
}

/// Result of resolving a mapping against one export's header row
#[derive(Debug, Clone)]
pub struct ResolvedColumns {
    sources: Vec<(Field, ColumnSource)>,
}

impl ResolvedColumns {
    pub fn source(&self, field: Field) -> ColumnSource {
        self.sources
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, s)| *s)
            .unwrap_or(ColumnSource::Placeholder)
    }

    /// Whether the export has a real column for this field
    pub fn has_column(&self, field: Field) -> bool {
        matches!(self.source(field), ColumnSource::Column(_))
    }

    /// Value of a field for one row
    pub fn value(&self, table: &RawTable, row: usize, field: Field, placeholder: &str) -> String {
        match self.source(field) {
            ColumnSource::Column(idx) => table.cell(row, idx).to_string(),
            ColumnSource::Placeholder => placeholder.to_string(),
        }
    }
}
