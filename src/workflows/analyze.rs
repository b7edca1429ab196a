use std::sync::atomic::Ordering;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use reqwest::multipart;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::AnalysisMode;
use crate::core::error::DashboardError;
use crate::core::time::now_utc;
use crate::core::types::{next_detection_id, Detection};
use crate::workflows::progress::ProgressTracker;
use crate::workflows::{Engine, FileInput};

/// Wire shape of the detection endpoint. Every field but `success` is
/// optional; missing values fall back to locally derived defaults.
#[derive(Debug, Deserialize)]
pub struct DetectionResponse {
    pub success: bool,
    #[serde(default)]
    pub detection_id: Option<u64>,
    #[serde(default)]
    pub detection_type: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl Engine {
    /// Runs the configured analyze strategy and returns exactly one new
    /// Detection. Errors leave no trace in state; re-entry while a run is
    /// outstanding fails with `Busy`.
    pub async fn analyze(
        &self,
        type_id: &str,
        file: &FileInput,
        progress: &ProgressTracker,
    ) -> Result<Detection, DashboardError> {
        if self.analyze_inflight.swap(true, Ordering::SeqCst) {
            return Err(DashboardError::Busy("analysis"));
        }
        progress.reset();
        let result = match self.config.analysis_mode {
            AnalysisMode::Remote => self.analyze_remote(type_id, file, progress).await,
            AnalysisMode::Simulated => self.analyze_simulated(type_id, file, progress).await,
        };
        self.analyze_inflight.store(false, Ordering::SeqCst);
        if result.is_ok() {
            progress.complete();
        }
        result
    }

    async fn analyze_remote(
        &self,
        type_id: &str,
        file: &FileInput,
        progress: &ProgressTracker,
    ) -> Result<Detection, DashboardError> {
        let bytes = match &file.path {
            Some(path) if path.exists() => tokio::fs::read(path).await?,
            _ => Vec::new(),
        };
        let form = multipart::Form::new()
            .part(
                "file",
                multipart::Part::bytes(bytes).file_name(file.filename.clone()),
            )
            .text("detection_type", type_id.to_string());

        // Heartbeat toward 90 while the request is outstanding; not tied to
        // real upload progress.
        let heartbeat = {
            let progress = progress.clone();
            let tick = Duration::from_millis(self.config.progress_tick_ms);
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(tick);
                loop {
                    interval.tick().await;
                    progress.advance(10, 90);
                }
            })
        };

        let url = format!("{}/detection", self.config.base_url);
        debug!(%url, type_id, filename = %file.filename, "posting analysis");
        let response = self.client.post(&url).multipart(form).send().await;
        heartbeat.abort();

        let response = response?;
        if !response.status().is_success() {
            return Err(DashboardError::Http(format!(
                "detection endpoint returned {}",
                response.status()
            )));
        }

        let body: DetectionResponse = response
            .json()
            .await
            .map_err(|e| DashboardError::Http(e.to_string()))?;

        if !body.success {
            let message = body.error.unwrap_or_else(|| "unknown error".to_string());
            warn!(%message, "detection endpoint rejected the file");
            return Err(DashboardError::Endpoint(message));
        }

        let now = now_utc();
        Ok(Detection {
            id: body
                .detection_id
                .unwrap_or_else(|| next_detection_id(now.timestamp_millis() as u64)),
            type_id: body.detection_type.unwrap_or_else(|| type_id.to_string()),
            filename: body
                .filename
                .unwrap_or_else(|| file.filename.clone()),
            confidence: body.confidence.unwrap_or(self.config.default_confidence),
            timestamp: body.timestamp.unwrap_or(now),
        })
    }

    async fn analyze_simulated(
        &self,
        type_id: &str,
        file: &FileInput,
        progress: &ProgressTracker,
    ) -> Result<Detection, DashboardError> {
        let mut interval =
            tokio::time::interval(Duration::from_millis(self.config.progress_tick_ms));
        let mut pct: u8 = 0;
        while pct < 100 {
            interval.tick().await;
            pct = (pct + 10).min(100);
            progress.set(pct);
        }

        let confidence = rand::thread_rng().gen_range(0.7..=1.0);
        debug!(type_id, filename = %file.filename, confidence, "synthesized detection");
        Ok(Detection::new(type_id, file.filename.clone(), confidence))
    }
}
