//! Report generation service
//!
//! Reads the unified table, summarizes it and writes the Markdown report.
//! Unlike reconciliation there is no recovery here: a report cannot be
//! produced from a missing or broken table, so every error propagates.

use crate::config::{PipelinePaths, Settings};
use crate::error::BillResult;
use crate::import::encoding::{resolve_encoding, EncodingDetector, SniffingDetector};
use crate::reports::{render, LedgerSummary};
use crate::storage::{read_unified, write_text_atomic};

/// Service for rendering the bill report
pub struct ReportService<'a> {
    settings: &'a Settings,
    detector: Box<dyn EncodingDetector + 'a>,
}

impl<'a> ReportService<'a> {
    /// Create a report service with the default sniffing detector
    pub fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            detector: Box::new(SniffingDetector::new(settings.detect_sample_bytes)),
        }
    }

    /// Use a different encoding detector
    pub fn with_detector(mut self, detector: impl EncodingDetector + 'a) -> Self {
        self.detector = Box::new(detector);
        self
    }

    /// Generate the report for `paths.unified` into `paths.report`
    pub fn generate(&self, paths: &PipelinePaths) -> BillResult<LedgerSummary> {
        let fallback = resolve_encoding(&self.settings.fallback_encoding)?;
        let records = read_unified(&paths.unified, self.detector.as_ref(), fallback)?;
        let summary = LedgerSummary::build(&records);

        tracing::info!(
            expense = %summary.total_expense,
            income = %summary.total_income,
            balance = %summary.balance,
            rows = records.len(),
            "Ledger totals"
        );

        let report = render(&records, &summary, &self.settings.currency_symbol);
        write_text_atomic(&paths.report, &report)?;

        tracing::info!(path = %paths.report.display(), "Report written");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BillError;
    use crate::models::Money;
    use encoding_rs::{Encoding, GBK};
    use tempfile::TempDir;

    const HEADER: &str =
        "交易订单号,交易分类,交易对方,对方账号,商品说明,收/支,金额,收/付款方式,交易状态,备注,交易时间,分类";

    fn paths(dir: &std::path::Path) -> PipelinePaths {
        PipelinePaths {
            alipay: dir.join("alipay.csv"),
            wechat: dir.join("wechat.csv"),
            unified: dir.join("合并账单.csv"),
            report: dir.join("账单.md"),
        }
    }

    #[test]
    fn test_generate_report() {
        let temp_dir = TempDir::new().unwrap();
        let paths = paths(temp_dir.path());
        std::fs::write(
            &paths.unified,
            format!(
                "{}\nA1,Food,Cafe,/,Lunch,支出,12.50,余额,交易成功,/,2025-01-05,支付宝\n\
                 W1,Food,早餐店,/,包子,支出,¥7.50,零钱,支付成功,/,2025-01-06,微信\n",
                HEADER
            ),
        )
        .unwrap();

        let settings = Settings::default();
        let summary = ReportService::new(&settings).generate(&paths).unwrap();

        assert_eq!(summary.total_expense, Money::from_cents(2000));
        assert_eq!(summary.total_income, Money::zero());
        assert_eq!(summary.balance, Money::from_cents(-2000));

        let report = std::fs::read_to_string(&paths.report).unwrap();
        assert!(report.starts_with("**本月消费总额**：￥20.00"));
        assert!(report.contains("-￥20.00"));
    }

    #[test]
    fn test_gbk_unified_table() {
        let temp_dir = TempDir::new().unwrap();
        let paths = paths(temp_dir.path());
        let text = format!(
            "{}\nA1,餐饮美食,饭店,/,午饭,支出,30.00,余额,交易成功,/,2025-01-05,支付宝\n",
            HEADER
        );
        let (bytes, _, _) = GBK.encode(&text);
        std::fs::write(&paths.unified, &bytes).unwrap();

        let settings = Settings::default();
        let summary = ReportService::new(&settings).generate(&paths).unwrap();
        assert_eq!(summary.expense.categories[0].category, "餐饮美食");
    }

    #[test]
    fn test_custom_detector() {
        struct AlwaysGbk;
        impl EncodingDetector for AlwaysGbk {
            fn detect(&self, _bytes: &[u8]) -> Option<&'static Encoding> {
                Some(GBK)
            }
        }

        let temp_dir = TempDir::new().unwrap();
        let paths = paths(temp_dir.path());
        let text = format!(
            "{}\nA1,红包,朋友,/,/,收入,88.00,余额,交易成功,/,2025-01-05,微信\n",
            HEADER
        );
        let (bytes, _, _) = GBK.encode(&text);
        std::fs::write(&paths.unified, &bytes).unwrap();

        let settings = Settings::default();
        let summary = ReportService::new(&settings)
            .with_detector(AlwaysGbk)
            .generate(&paths)
            .unwrap();
        assert_eq!(summary.total_income, Money::from_cents(8800));
    }

    #[test]
    fn test_missing_table_propagates() {
        let temp_dir = TempDir::new().unwrap();
        let paths = paths(temp_dir.path());
        let settings = Settings::default();

        let err = ReportService::new(&settings).generate(&paths).unwrap_err();
        assert!(matches!(err, BillError::SourceNotFound { .. }));
        assert!(!paths.report.exists());
    }

    #[test]
    fn test_malformed_table_propagates() {
        let temp_dir = TempDir::new().unwrap();
        let paths = paths(temp_dir.path());
        std::fs::write(
            &paths.unified,
            format!("{}\nA1,Food,Cafe,/,Lunch,支出,twelve,余额,交易成功,/,2025-01-05,支付宝\n", HEADER),
        )
        .unwrap();

        let settings = Settings::default();
        let err = ReportService::new(&settings).generate(&paths).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ParseMalformed);
    }
}
