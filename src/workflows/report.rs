use std::sync::atomic::Ordering;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Deserialize;
use tracing::{info, warn};

use crate::artifact::pdf;
use crate::config::ReportMode;
use crate::core::error::DashboardError;
use crate::core::types::{ArtifactRef, Detection, EvidenceReport};
use crate::workflows::Engine;

/// Wire shape of the report-generation endpoint.
#[derive(Debug, Deserialize)]
pub struct ReportResponse {
    pub success: bool,
    #[serde(default)]
    pub report_id: Option<String>,
    #[serde(default)]
    pub pdf_url: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// What a report run produced. `remote_error` carries the failure the user
/// is notified about when the remote path was tried and the local fallback
/// kicked in.
#[derive(Debug)]
pub struct ReportOutcome {
    pub report: EvidenceReport,
    pub remote_error: Option<String>,
}

/// "EVD-" plus 8 random base36 characters, uppercased.
pub fn evidence_id() -> String {
    const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..8)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("EVD-{}", suffix)
}

impl Engine {
    /// Produces exactly one EvidenceReport for the detection. Remote-first
    /// downgrades any remote failure to local synthesis, so the user always
    /// ends up with an artifact. Repeated invocations append new reports.
    pub async fn generate_report(
        &self,
        detection: &Detection,
    ) -> Result<ReportOutcome, DashboardError> {
        if self.report_inflight.swap(true, Ordering::SeqCst) {
            return Err(DashboardError::Busy("report generation"));
        }
        let result = match self.config.report_mode {
            ReportMode::LocalOnly => self.local_report(detection, None),
            ReportMode::RemoteFirst => match self.remote_report(detection).await {
                Ok(report) => Ok(ReportOutcome {
                    report,
                    remote_error: None,
                }),
                Err(err) => {
                    warn!(detection_id = detection.id, %err, "remote report failed; synthesizing locally");
                    self.local_report(detection, Some(err.to_string()))
                }
            },
        };
        self.report_inflight.store(false, Ordering::SeqCst);
        result
    }

    async fn remote_report(&self, detection: &Detection) -> Result<EvidenceReport, DashboardError> {
        let url = format!("{}/reports/generate", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "detection_id": detection.id }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DashboardError::Http(format!(
                "report endpoint returned {}",
                response.status()
            )));
        }

        let body: ReportResponse = response
            .json()
            .await
            .map_err(|e| DashboardError::Http(e.to_string()))?;

        if !body.success {
            return Err(DashboardError::Endpoint(
                body.error.unwrap_or_else(|| "failed to generate report".to_string()),
            ));
        }

        let report_id = body.report_id.unwrap_or_else(evidence_id);
        let artifact = ArtifactRef::Url(body.pdf_url.unwrap_or_else(|| {
            format!("{}/reports/download/{}", self.config.base_url, report_id)
        }));

        let mut report = EvidenceReport::new(report_id, detection, artifact);
        if let Some(ts) = body.timestamp {
            report.generated_at = ts;
        }
        info!(report_id = %report.id, detection_id = detection.id, "report recorded from endpoint");
        Ok(report)
    }

    fn local_report(
        &self,
        detection: &Detection,
        remote_error: Option<String>,
    ) -> Result<ReportOutcome, DashboardError> {
        let report_id = evidence_id();
        let artifact = pdf::write_artifact(detection, &report_id, &self.config.reports_dir)?;
        info!(report_id = %report_id, detection_id = detection.id, "report synthesized locally");
        Ok(ReportOutcome {
            report: EvidenceReport::new(report_id, detection, artifact),
            remote_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evidence_id_shape() {
        let id = evidence_id();
        assert_eq!(id.len(), 12);
        assert!(id.starts_with("EVD-"));
        assert!(id[4..]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }
}
