use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::time::now_utc;

static LAST_DETECTION_ID: AtomicU64 = AtomicU64::new(0);

/// Clock-derived id, nudged past the previously issued one so detections
/// created in the same millisecond stay distinct.
pub(crate) fn next_detection_id(now_ms: u64) -> u64 {
    loop {
        let last = LAST_DETECTION_ID.load(Ordering::SeqCst);
        let id = now_ms.max(last + 1);
        if LAST_DETECTION_ID
            .compare_exchange(last, id, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            return id;
        }
    }
}

/// Static catalog entry for one analysis category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DetectionType {
    pub id: String,
    pub name: String,
    pub description: String,
    pub supported_formats: Vec<String>,
    pub icon: String,
}

/// The fixed catalog, loaded once at startup.
pub fn detection_catalog() -> Vec<DetectionType> {
    vec![
        DetectionType {
            id: "deepfake".into(),
            name: "Deepfake Detection".into(),
            description: "Detects manipulated content.".into(),
            supported_formats: vec!["MP4".into(), "JPG".into()],
            icon: "video".into(),
        },
        DetectionType {
            id: "object".into(),
            name: "Object Detection".into(),
            description: "Identifies objects in media.".into(),
            supported_formats: vec!["JPG".into(), "PNG".into()],
            icon: "eye".into(),
        },
        DetectionType {
            id: "fraud".into(),
            name: "Fraud Detection".into(),
            description: "Flags financial fraud.".into(),
            supported_formats: vec!["CSV".into(), "PDF".into()],
            icon: "warning".into(),
        },
    ]
}

/// One analysis result. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Detection {
    pub id: u64,
    pub type_id: String,
    pub filename: String,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

impl Detection {
    pub fn new(type_id: impl Into<String>, filename: impl Into<String>, confidence: f64) -> Self {
        let now = now_utc();
        Self {
            id: next_detection_id(now.timestamp_millis() as u64),
            type_id: type_id.into(),
            filename: filename.into(),
            confidence,
            timestamp: now,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Verified,
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportStatus::Verified => write!(f, "verified"),
        }
    }
}

/// Dereferenceable handle to a generated document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ArtifactRef {
    Url(String),
    File(PathBuf),
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactRef::Url(url) => write!(f, "{}", url),
            ArtifactRef::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A generated artifact attesting to a Detection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvidenceReport {
    pub id: String,
    pub detection_id: u64,
    pub generated_at: DateTime<Utc>,
    pub type_id: String,
    pub status: ReportStatus,
    pub artifact: ArtifactRef,
}

impl EvidenceReport {
    pub fn new(id: impl Into<String>, detection: &Detection, artifact: ArtifactRef) -> Self {
        Self {
            id: id.into(),
            detection_id: detection.id,
            generated_at: now_utc(),
            type_id: detection.type_id.clone(),
            status: ReportStatus::Verified,
            artifact,
        }
    }
}

/// Confidence as a percentage with one decimal place.
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.1}%", confidence * 100.0)
}
