//! The two user-triggered workflows: analyze a file, generate a report.
//! Strategies are selected at configuration time; both workflows carry an
//! in-flight guard so a second gesture fails fast instead of racing.

pub mod analyze;
pub mod progress;
pub mod report;

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use crate::config::AppConfig;
use crate::core::error::DashboardError;

/// A user-supplied file: the declared name, plus an on-disk path when one
/// actually exists (the remote strategy uploads its bytes in that case).
#[derive(Debug, Clone)]
pub struct FileInput {
    pub filename: String,
    pub path: Option<PathBuf>,
}

impl FileInput {
    pub fn named(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            path: None,
        }
    }

    pub fn from_path(path: PathBuf) -> Self {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            filename,
            path: Some(path),
        }
    }
}

/// Drives both workflows against one HTTP client and one config.
pub struct Engine {
    pub(crate) client: reqwest::Client,
    pub config: AppConfig,
    pub(crate) analyze_inflight: AtomicBool,
    pub(crate) report_inflight: AtomicBool,
}

impl Engine {
    pub fn new(config: AppConfig) -> Result<Self, DashboardError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(DashboardError::from)?;

        Ok(Self {
            client,
            config,
            analyze_inflight: AtomicBool::new(false),
            report_inflight: AtomicBool::new(false),
        })
    }
}
