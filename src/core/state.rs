use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::error::DashboardError;
use crate::core::types::{detection_catalog, Detection, DetectionType, EvidenceReport};

/// Derived counters, bumped alongside every insert rather than recomputed.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Statistics {
    pub total_detections: u64,
    pub by_type: BTreeMap<String, u64>,
    pub reports_generated: u64,
}

impl Statistics {
    pub fn for_type(&self, type_id: &str) -> u64 {
        self.by_type.get(type_id).copied().unwrap_or(0)
    }
}

/// Owned, page-session-scoped dashboard state. Detections and reports are
/// kept most-recent-first; nothing here survives the process.
#[derive(Debug, Serialize)]
pub struct DashboardState {
    catalog: Vec<DetectionType>,
    detections: Vec<Detection>,
    reports: Vec<EvidenceReport>,
    statistics: Statistics,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardState {
    pub fn new() -> Self {
        Self {
            catalog: detection_catalog(),
            detections: Vec::new(),
            reports: Vec::new(),
            statistics: Statistics::default(),
        }
    }

    pub fn catalog(&self) -> &[DetectionType] {
        &self.catalog
    }

    pub fn detection_type(&self, type_id: &str) -> Option<&DetectionType> {
        self.catalog.iter().find(|t| t.id == type_id)
    }

    /// Display name for a type id, falling back to the raw id.
    pub fn type_name<'a>(&'a self, type_id: &'a str) -> &'a str {
        self.detection_type(type_id)
            .map(|t| t.name.as_str())
            .unwrap_or(type_id)
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    pub fn detection(&self, id: u64) -> Option<&Detection> {
        self.detections.iter().find(|d| d.id == id)
    }

    pub fn reports(&self) -> &[EvidenceReport] {
        &self.reports
    }

    /// Most recent report attesting to the given detection, if any.
    pub fn report_for(&self, detection_id: u64) -> Option<&EvidenceReport> {
        self.reports.iter().find(|r| r.detection_id == detection_id)
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Prepends a detection and bumps the total and per-type counters in the
    /// same step, so counters always match the sequences by construction.
    pub fn record_detection(&mut self, detection: Detection) -> Result<(), DashboardError> {
        if self.detection_type(&detection.type_id).is_none() {
            return Err(DashboardError::UnknownType(detection.type_id));
        }
        *self
            .statistics
            .by_type
            .entry(detection.type_id.clone())
            .or_insert(0) += 1;
        self.statistics.total_detections += 1;
        self.detections.insert(0, detection);
        Ok(())
    }

    /// Prepends a report. Every report must reference a recorded detection;
    /// multiple reports per detection are allowed.
    pub fn record_report(&mut self, report: EvidenceReport) -> Result<(), DashboardError> {
        if self.detection(report.detection_id).is_none() {
            return Err(DashboardError::UnknownDetection(report.detection_id));
        }
        self.statistics.reports_generated += 1;
        self.reports.insert(0, report);
        Ok(())
    }

    /// Returns the state to its initial empty condition.
    pub fn reset(&mut self) {
        self.detections.clear();
        self.reports.clear();
        self.statistics = Statistics::default();
    }
}
