//! Pure projections from dashboard state to plain row/card values. Each call
//! recomputes from scratch; identical state yields identical output, so the
//! terminal layer can redraw from these every frame.

use crate::core::state::DashboardState;
use crate::core::time::local_stamp;
use crate::core::types::format_confidence;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    pub label: String,
    pub value: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Generate,
    View,
}

impl RowAction {
    pub fn label(&self) -> &'static str {
        match self {
            RowAction::Generate => "Generate",
            RowAction::View => "View",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionRow {
    pub id: u64,
    pub type_name: String,
    pub filename: String,
    pub confidence: String,
    pub timestamp: String,
    pub action: RowAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub id: String,
    pub type_name: String,
    pub generated_at: String,
    pub status: String,
    pub artifact: String,
}

/// Summary cards: total, one per catalog type, reports generated.
pub fn stat_cards(state: &DashboardState) -> Vec<StatCard> {
    let stats = state.statistics();
    let mut cards = vec![StatCard {
        label: "Total Detections".to_string(),
        value: stats.total_detections,
    }];
    for dt in state.catalog() {
        cards.push(StatCard {
            label: dt.name.clone(),
            value: stats.for_type(&dt.id),
        });
    }
    cards.push(StatCard {
        label: "Reports Generated".to_string(),
        value: stats.reports_generated,
    });
    cards
}

/// One row per detection, most recent first. The action is Generate until a
/// report references the detection, then View.
pub fn detection_rows(state: &DashboardState) -> Vec<DetectionRow> {
    state
        .detections()
        .iter()
        .map(|d| {
            let action = if state.report_for(d.id).is_some() {
                RowAction::View
            } else {
                RowAction::Generate
            };
            DetectionRow {
                id: d.id,
                type_name: state.type_name(&d.type_id).to_string(),
                filename: d.filename.clone(),
                confidence: format_confidence(d.confidence),
                timestamp: local_stamp(&d.timestamp),
                action,
            }
        })
        .collect()
}

/// One row per evidence report, most recent first.
pub fn report_rows(state: &DashboardState) -> Vec<ReportRow> {
    state
        .reports()
        .iter()
        .map(|r| ReportRow {
            id: r.id.clone(),
            type_name: state.type_name(&r.type_id).to_string(),
            generated_at: local_stamp(&r.generated_at),
            status: r.status.to_string(),
            artifact: r.artifact.to_string(),
        })
        .collect()
}
