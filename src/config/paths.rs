//! Path management for billmerge
//!
//! Two kinds of paths live here: where billmerge keeps its own settings, and
//! the four files a pipeline run reads and writes.
//!
//! ## Settings directory resolution
//!
//! 1. `BILLMERGE_DIR` environment variable (if set)
//! 2. The platform config directory (`~/.config/billmerge` on Linux)

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use super::settings::Settings;
use crate::error::BillError;

/// Manages the location of billmerge's own files
#[derive(Debug, Clone)]
pub struct AppPaths {
    base_dir: PathBuf,
}

impl AppPaths {
    /// Resolve the settings directory
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, BillError> {
        let base_dir = if let Ok(custom) = std::env::var("BILLMERGE_DIR") {
            PathBuf::from(custom)
        } else {
            ProjectDirs::from("", "", "billmerge")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .ok_or_else(|| {
                    BillError::Config("Could not determine a configuration directory".into())
                })?
        };

        Ok(Self { base_dir })
    }

    /// Create AppPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Ensure the settings directory exists
    pub fn ensure_directories(&self) -> Result<(), BillError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| BillError::Io(format!("Failed to create config directory: {}", e)))
    }
}

/// The four files of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelinePaths {
    /// Alipay export (source A)
    pub alipay: PathBuf,
    /// WeChat Pay export (source B)
    pub wechat: PathBuf,
    /// Unified ledger table written by reconciliation
    pub unified: PathBuf,
    /// Markdown report
    pub report: PathBuf,
}

impl PipelinePaths {
    /// Paths as configured in settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            alipay: settings.sources.alipay.path.clone(),
            wechat: settings.sources.wechat.path.clone(),
            unified: settings.unified_path.clone(),
            report: settings.report_path.clone(),
        }
    }

    /// Replace any configured path with an explicit override
    pub fn with_overrides(
        mut self,
        alipay: Option<PathBuf>,
        wechat: Option<PathBuf>,
        unified: Option<PathBuf>,
        report: Option<PathBuf>,
    ) -> Self {
        if let Some(p) = alipay {
            self.alipay = p;
        }
        if let Some(p) = wechat {
            self.wechat = p;
        }
        if let Some(p) = unified {
            self.unified = p;
        }
        if let Some(p) = report {
            self.report = p;
        }
        self
    }
}
