//! Reconciliation service
//!
//! Reads the Alipay and WeChat Pay exports, maps both onto the common
//! schema, drops rows that are not real money movements, and persists the
//! combined table. Alipay rows come first; each source keeps its own order.

use std::path::PathBuf;

use crate::config::{PipelinePaths, Settings, SourceFormat};
use crate::error::{BillError, BillResult};
use crate::import::{resolve_encoding, ColumnMapping, RawTable, ResolvedColumns};
use crate::models::{Direction, Field, Money, Provenance, TransactionRecord};
use crate::storage::{require_parent_dir, write_unified};

/// Row accounting for one source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceCounts {
    /// Data rows read from the export
    pub read: usize,
    /// Rows kept in the unified table
    pub retained: usize,
    /// Rows marked as not counting toward income or expense
    pub uncounted: usize,
    /// WeChat rows whose direction is the placeholder or whose export has
    /// no direction column
    pub no_direction: usize,
}

impl SourceCounts {
    pub fn dropped(&self) -> usize {
        self.uncounted + self.no_direction
    }
}

/// Outcome of a successful reconciliation
#[derive(Debug, Clone)]
pub struct ReconcileSummary {
    pub alipay: SourceCounts,
    pub wechat: SourceCounts,
    /// Rows written to the unified table
    pub written: usize,
    pub output: PathBuf,
}

/// Records built from one source, with their accounting
#[derive(Debug, Clone, Default)]
pub struct SourceRecords {
    pub records: Vec<TransactionRecord>,
    pub counts: SourceCounts,
}

/// Service for merging the two bill exports
pub struct ReconcileService<'a> {
    settings: &'a Settings,
}

impl<'a> ReconcileService<'a> {
    /// Create a new reconcile service
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Run reconciliation, writing the unified table on success
    ///
    /// Nothing is written unless both sources load and map cleanly.
    pub fn reconcile(&self, paths: &PipelinePaths) -> BillResult<ReconcileSummary> {
        require_parent_dir(&paths.unified)?;

        let alipay_table = self.load(&paths.alipay, &self.settings.sources.alipay)?;
        let alipay = self.build_records(&alipay_table, Provenance::Alipay)?;

        let wechat_table = self.load(&paths.wechat, &self.settings.sources.wechat)?;
        let wechat = self.build_records(&wechat_table, Provenance::Wechat)?;

        let mut combined = alipay.records;
        combined.extend(wechat.records);

        write_unified(&paths.unified, &combined)?;

        tracing::info!(
            alipay = alipay.counts.retained,
            wechat = wechat.counts.retained,
            path = %paths.unified.display(),
            "Unified table written"
        );

        Ok(ReconcileSummary {
            alipay: alipay.counts,
            wechat: wechat.counts,
            written: combined.len(),
            output: paths.unified.clone(),
        })
    }

    fn load(&self, path: &std::path::Path, format: &SourceFormat) -> BillResult<RawTable> {
        let encoding = resolve_encoding(&format.encoding)?;
        let table = RawTable::load(path, format.skip_rows, encoding)?;
        tracing::debug!(
            path = %path.display(),
            rows = table.len(),
            encoding = encoding.name(),
            "Loaded export"
        );
        Ok(table)
    }

    /// Map one export onto the common schema
    pub fn build_records(
        &self,
        table: &RawTable,
        provenance: Provenance,
    ) -> BillResult<SourceRecords> {
        let mapping = ColumnMapping::for_provenance(provenance);
        let resolved = mapping.resolve(table, provenance.label())?;
        let placeholder = self.settings.placeholder.as_str();

        let mut out = SourceRecords::default();
        out.counts.read = table.len();

        // Without a direction column nothing can be classified
        if !resolved.has_column(Field::Direction) {
            tracing::warn!(
                source = provenance.label(),
                rows = table.len(),
                "Export has no direction column, dropping all rows"
            );
            out.counts.no_direction = table.len();
            return Ok(out);
        }

        for row in 0..table.len() {
            let label = resolved.value(table, row, Field::Direction, placeholder);

            // WeChat marks neutral rows (withdrawals, transfers) with the placeholder
            if provenance == Provenance::Wechat && label == placeholder {
                out.counts.no_direction += 1;
                continue;
            }

            let direction = Direction::from_label(&label);
            if direction == Direction::Uncounted {
                out.counts.uncounted += 1;
                continue;
            }
            if let Direction::Other(raw) = &direction {
                tracing::debug!(
                    source = provenance.label(),
                    row = row + 1,
                    label = %raw,
                    "Keeping row with unrecognized direction"
                );
            }

            let record = self.build_record(table, &resolved, row, direction, provenance)?;
            out.records.push(record);
        }

        out.counts.retained = out.records.len();

        if out.counts.dropped() > 0 {
            tracing::debug!(
                source = provenance.label(),
                uncounted = out.counts.uncounted,
                no_direction = out.counts.no_direction,
                "Dropped non-transaction rows"
            );
        }

        Ok(out)
    }

    fn build_record(
        &self,
        table: &RawTable,
        resolved: &ResolvedColumns,
        row: usize,
        direction: Direction,
        provenance: Provenance,
    ) -> BillResult<TransactionRecord> {
        let placeholder = self.settings.placeholder.as_str();
        let value = |field: Field| resolved.value(table, row, field, placeholder);

        let raw_amount = value(Field::Amount);
        let amount = Money::parse_amount(&raw_amount)
            .map_err(|_| BillError::InvalidAmount {
                value: raw_amount.clone(),
            })?
            .abs();

        Ok(TransactionRecord {
            order_id: value(Field::OrderId),
            category: value(Field::Category),
            counterparty: value(Field::Counterparty),
            counterparty_account: value(Field::CounterpartyAccount),
            description: value(Field::Description),
            direction,
            amount,
            payment_method: value(Field::PaymentMethod),
            status: value(Field::Status),
            remark: value(Field::Remark),
            timestamp: value(Field::Timestamp),
            provenance,
        })
    }
}

/// Reconcile, logging any failure instead of returning it
///
/// Reconciliation is the first, skippable stage of a run: a failure leaves
/// the previous unified table (if any) in place for the report.
pub fn reconcile_or_log(settings: &Settings, paths: &PipelinePaths) -> Option<ReconcileSummary> {
    match ReconcileService::new(settings).reconcile(paths) {
        Ok(summary) => Some(summary),
        Err(e) => {
            let hint = match e.kind() {
                crate::error::ErrorKind::SourceNotFound => "check the export paths",
                crate::error::ErrorKind::SchemaIncomplete => "the export layout is not supported",
                crate::error::ErrorKind::ParseMalformed => "check the file format and encoding",
                crate::error::ErrorKind::Unexpected => "unexpected failure",
            };
            tracing::error!(kind = ?e.kind(), "Reconciliation failed ({}): {}", hint, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::read_unified;
    use crate::import::SniffingDetector;
    use encoding_rs::{GBK, UTF_8};
    use tempfile::TempDir;

    const ALIPAY_HEADER: &str =
        "交易时间,交易分类,交易对方,对方账号,商品说明,收/支,金额,收/付款方式,交易状态,交易订单号,商家订单号,备注,";
    const WECHAT_HEADER: &str =
        "交易时间,交易类型,交易对方,商品,收/支,金额(元),支付方式,当前状态,交易单号,商户单号,备注";

    fn preamble(n: usize) -> String {
        (0..n).map(|i| format!("preamble line {}\n", i)).collect()
    }

    fn settings() -> Settings {
        let mut settings = Settings::default();
        settings.sources.alipay.skip_rows = 2;
        settings.sources.wechat.skip_rows = 3;
        settings
    }

    fn write_alipay(dir: &std::path::Path, rows: &[&str]) -> PathBuf {
        let mut text = preamble(2);
        text.push_str(ALIPAY_HEADER);
        text.push('\n');
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        let (bytes, _, _) = GBK.encode(&text);
        let path = dir.join("alipay.csv");
        std::fs::write(&path, &bytes).unwrap();
        path
    }

    fn write_wechat(dir: &std::path::Path, header: &str, rows: &[&str]) -> PathBuf {
        let mut text = preamble(3);
        text.push_str(header);
        text.push('\n');
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        let path = dir.join("wechat.csv");
        std::fs::write(&path, text).unwrap();
        path
    }

    fn paths(dir: &std::path::Path, alipay: PathBuf, wechat: PathBuf) -> PipelinePaths {
        PipelinePaths {
            alipay,
            wechat,
            unified: dir.join("合并账单.csv"),
            report: dir.join("账单.md"),
        }
    }

    #[test]
    fn test_two_row_scenario() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let alipay = write_alipay(
            dir,
            &["2025-01-05,Food,Cafe,cafe@example.com,Lunch,支出,12.5,花呗,交易成功,A001,M001,,"],
        );
        let wechat = write_wechat(
            dir,
            WECHAT_HEADER,
            &["2025-01-06,Food,早餐店,包子,支出,¥7.50,零钱,支付成功,W001,M002,/"],
        );
        let settings = settings();
        let paths = paths(dir, alipay, wechat);

        let summary = ReconcileService::new(&settings).reconcile(&paths).unwrap();
        assert_eq!(summary.written, 2);

        let records = read_unified(&paths.unified, &SniffingDetector::default(), UTF_8).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].provenance, Provenance::Alipay);
        assert_eq!(records[0].amount, Money::from_cents(1250));
        assert_eq!(records[0].order_id, "A001");
        assert_eq!(records[0].remark, "");
        assert_eq!(records[1].provenance, Provenance::Wechat);
        assert_eq!(records[1].amount, Money::from_cents(750));
        assert_eq!(records[1].order_id, "W001");
        assert_eq!(records[1].description, "包子");
    }

    #[test]
    fn test_wechat_missing_columns_get_placeholder() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let alipay = write_alipay(dir, &[]);
        // No 备注 column at all
        let wechat = write_wechat(
            dir,
            "交易时间,交易类型,交易对方,商品,收/支,金额(元),支付方式,当前状态,交易单号,商户单号",
            &["2025-01-06,商户消费,早餐店,包子,支出,¥7.50,零钱,支付成功,W001,M002"],
        );
        let settings = settings();
        let paths = paths(dir, alipay, wechat);

        ReconcileService::new(&settings).reconcile(&paths).unwrap();
        let records = read_unified(&paths.unified, &SniffingDetector::default(), UTF_8).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].remark, "/");
        assert_eq!(records[0].counterparty_account, "/");
    }

    #[test]
    fn test_filtering_counts() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let alipay = write_alipay(
            dir,
            &[
                "2025-01-01,餐饮美食,店A,/,饭,支出,10.00,余额,交易成功,A1,,,",
                "2025-01-02,转账红包,自己,/,转入余额宝,不计收支,500.00,余额,交易成功,A2,,,",
                "2025-01-03,收入,公司,/,工资,收入,8000.00,银行卡,交易成功,A3,,,",
            ],
        );
        let wechat = write_wechat(
            dir,
            WECHAT_HEADER,
            &[
                "2025-01-04,零钱提现,银行,/,/,¥100.00,零钱,已到账,W1,,/",
                "2025-01-05,商户消费,店B,面,支出,\"¥1,020.00\",零钱,支付成功,W2,,/",
            ],
        );
        let settings = settings();
        let paths = paths(dir, alipay, wechat);

        let summary = ReconcileService::new(&settings).reconcile(&paths).unwrap();
        assert_eq!(
            summary.alipay,
            SourceCounts {
                read: 3,
                retained: 2,
                uncounted: 1,
                no_direction: 0
            }
        );
        assert_eq!(summary.wechat.read, 2);
        assert_eq!(summary.wechat.retained, 1);
        assert_eq!(summary.wechat.no_direction, 1);
        assert_eq!(summary.written, 3);

        let records = read_unified(&paths.unified, &SniffingDetector::default(), UTF_8).unwrap();
        assert!(records.iter().all(|r| r.direction != Direction::Uncounted));
        assert_eq!(records[2].amount, Money::from_cents(102000));
    }

    #[test]
    fn test_wechat_without_direction_column_drops_all() {
        let settings = Settings::default();
        let service = ReconcileService::new(&settings);
        let table = RawTable::parse(
            "交易时间,交易类型,金额(元)\n2025-01-01,商户消费,¥1.00\n2025-01-02,商户消费,¥2.00\n",
            0,
        )
        .unwrap();

        let built = service.build_records(&table, Provenance::Wechat).unwrap();
        assert!(built.records.is_empty());
        assert_eq!(built.counts.no_direction, 2);
        assert_eq!(built.counts.read, 2);
    }

    #[test]
    fn test_unrecognized_directions_are_kept() {
        let settings = Settings::default();
        let service = ReconcileService::new(&settings);

        let alipay = RawTable::parse(
            &format!(
                "{}\n2025-01-01,退款,店A,/,饭,,3.00,余额,退款成功,A1,,,\n\
                 2025-01-02,餐饮美食,店B,/,面,支出,10.00,余额,交易成功,A2,,,\n\
                 2025-01-03,其他,店C,/,券,/,1.00,余额,交易成功,A3,,,",
                ALIPAY_HEADER
            ),
            0,
        )
        .unwrap();
        let built = service.build_records(&alipay, Provenance::Alipay).unwrap();
        assert_eq!(
            built.counts,
            SourceCounts {
                read: 3,
                retained: 3,
                uncounted: 0,
                no_direction: 0
            }
        );
        assert_eq!(built.records[0].direction, Direction::Other(String::new()));
        assert_eq!(built.records[2].direction, Direction::Other("/".into()));

        let wechat = RawTable::parse(
            &format!(
                "{}\n2025-01-04,商户消费,店D,面,,¥5.00,零钱,支付成功,W1,,/\n\
                 2025-01-05,零钱提现,银行,/,/,¥100.00,零钱,已到账,W2,,/",
                WECHAT_HEADER
            ),
            0,
        )
        .unwrap();
        let built = service.build_records(&wechat, Provenance::Wechat).unwrap();
        assert_eq!(built.counts.retained, 1);
        assert_eq!(built.counts.no_direction, 1);
        assert_eq!(built.records[0].order_id, "W1");
    }

    #[test]
    fn test_all_rows_filtered_writes_header_only() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let alipay = write_alipay(
            dir,
            &["2025-01-02,转账红包,自己,/,转入余额宝,不计收支,500.00,余额,交易成功,A2,,,"],
        );
        let wechat = write_wechat(
            dir,
            WECHAT_HEADER,
            &["2025-01-04,零钱提现,银行,/,/,¥100.00,零钱,已到账,W1,,/"],
        );
        let settings = settings();
        let paths = paths(dir, alipay, wechat);

        let summary = ReconcileService::new(&settings).reconcile(&paths).unwrap();
        assert_eq!(summary.written, 0);

        let text = std::fs::read_to_string(&paths.unified).unwrap();
        assert_eq!(
            text,
            "交易订单号,交易分类,交易对方,对方账号,商品说明,收/支,金额,收/付款方式,交易状态,备注,交易时间,分类\n"
        );
        let records = read_unified(&paths.unified, &SniffingDetector::default(), UTF_8).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_incomplete_alipay_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();

        let mut text = preamble(2);
        text.push_str("交易时间,交易分类,交易对方,金额\n2025-01-01,餐饮美食,店A,10.00\n");
        let (bytes, _, _) = GBK.encode(&text);
        let alipay = dir.join("alipay.csv");
        std::fs::write(&alipay, &bytes).unwrap();
        let wechat = write_wechat(dir, WECHAT_HEADER, &[]);

        let settings = settings();
        let paths = paths(dir, alipay, wechat);
        let err = ReconcileService::new(&settings).reconcile(&paths).unwrap_err();

        assert!(err.is_schema_incomplete());
        assert!(!paths.unified.exists());
        assert!(reconcile_or_log(&settings, &paths).is_none());
    }

    #[test]
    fn test_missing_source_is_swallowed() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let settings = settings();
        let paths = paths(dir, dir.join("nope.csv"), dir.join("nope2.csv"));

        let err = ReconcileService::new(&settings).reconcile(&paths).unwrap_err();
        assert!(matches!(err, BillError::SourceNotFound { .. }));
        assert!(reconcile_or_log(&settings, &paths).is_none());
    }

    #[test]
    fn test_bad_amount_is_invalid_amount() {
        let settings = Settings::default();
        let service = ReconcileService::new(&settings);
        let table = RawTable::parse(
            &format!("{}\n2025-01-01,餐饮美食,店A,/,饭,支出,ten,余额,交易成功,A1,,,", ALIPAY_HEADER),
            0,
        )
        .unwrap();

        let err = service.build_records(&table, Provenance::Alipay).unwrap_err();
        assert!(matches!(err, BillError::InvalidAmount { ref value } if value == "ten"));
    }

    #[test]
    fn test_missing_output_dir() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let alipay = write_alipay(dir, &[]);
        let wechat = write_wechat(dir, WECHAT_HEADER, &[]);
        let settings = settings();
        let mut paths = paths(dir, alipay, wechat);
        paths.unified = dir.join("out").join("合并账单.csv");

        let err = ReconcileService::new(&settings).reconcile(&paths).unwrap_err();
        assert!(matches!(err, BillError::MissingOutputDir { .. }));
    }
}
