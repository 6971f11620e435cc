//! User settings for billmerge
//!
//! Where the exports live, how they are laid out, and how output is
//! formatted. Stored as JSON; every field has a default so a partial file
//! still loads.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::AppPaths;
use crate::error::BillError;

/// Layout of one provider's CSV export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFormat {
    /// Location of the export
    pub path: PathBuf,
    /// Preamble lines before the header row
    pub skip_rows: usize,
    /// WHATWG encoding label
    pub encoding: String,
}

/// Both provider exports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sources {
    #[serde(default = "default_alipay")]
    pub alipay: SourceFormat,
    #[serde(default = "default_wechat")]
    pub wechat: SourceFormat,
}

impl Default for Sources {
    fn default() -> Self {
        Self {
            alipay: default_alipay(),
            wechat: default_wechat(),
        }
    }
}

/// User settings for billmerge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Provider export locations and layouts
    #[serde(default)]
    pub sources: Sources,

    /// Where reconciliation writes the unified table
    #[serde(default = "default_unified_path")]
    pub unified_path: PathBuf,

    /// Where the Markdown report is written
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,

    /// Value for fields an export does not carry
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Currency symbol prefixed to report amounts
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Encoding assumed for the unified table when detection is inconclusive
    #[serde(default = "default_fallback_encoding")]
    pub fallback_encoding: String,

    /// Bytes sampled for encoding detection
    #[serde(default = "default_detect_sample_bytes")]
    pub detect_sample_bytes: usize,
}

fn default_schema_version() -> u32 {
    1
}

fn default_alipay() -> SourceFormat {
    SourceFormat {
        path: PathBuf::from("bill/alipay.csv"),
        skip_rows: 24,
        encoding: "gbk".to_string(),
    }
}

fn default_wechat() -> SourceFormat {
    SourceFormat {
        path: PathBuf::from("bill/wechat.csv"),
        skip_rows: 16,
        encoding: "utf-8".to_string(),
    }
}

fn default_unified_path() -> PathBuf {
    PathBuf::from("bill/合并账单.csv")
}

fn default_report_path() -> PathBuf {
    PathBuf::from("bill/账单.md")
}

fn default_placeholder() -> String {
    "/".to_string()
}

fn default_currency() -> String {
    "￥".to_string()
}

fn default_fallback_encoding() -> String {
    "utf-8".to_string()
}

fn default_detect_sample_bytes() -> usize {
    64 * 1024
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            sources: Sources::default(),
            unified_path: default_unified_path(),
            report_path: default_report_path(),
            placeholder: default_placeholder(),
            currency_symbol: default_currency(),
            fallback_encoding: default_fallback_encoding(),
            detect_sample_bytes: default_detect_sample_bytes(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or use defaults if the file doesn't exist
    pub fn load_or_create(paths: &AppPaths) -> Result<Self, BillError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| BillError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                BillError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &AppPaths) -> Result<(), BillError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| BillError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| BillError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}
