use std::fs;
use std::path::Path;

use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::core::error::DashboardError;
use crate::core::time::local_stamp;
use crate::core::types::{format_confidence, ArtifactRef, Detection};

/// Renders a minimal one-page report for a detection: id, type, confidence
/// as a percentage, and a human-formatted timestamp. Built-in fonts only,
/// so no font files are required at runtime.
pub fn render_detection_pdf(
    detection: &Detection,
    report_id: &str,
) -> Result<Vec<u8>, DashboardError> {
    let (doc, page, layer) =
        PdfDocument::new("AI Detection Report", Mm(210.0), Mm(297.0), "report");
    let heading = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| DashboardError::Artifact(e.to_string()))?;
    let body = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| DashboardError::Artifact(e.to_string()))?;

    let layer = doc.get_page(page).get_layer(layer);
    layer.use_text("AI Detection Report", 18.0, Mm(20.0), Mm(270.0), &heading);

    let lines = [
        format!("Report: {}", report_id),
        format!("Detection ID: {}", detection.id),
        format!("Type: {}", detection.type_id),
        format!("File: {}", detection.filename),
        format!("Confidence: {}", format_confidence(detection.confidence)),
        format!("Timestamp: {}", local_stamp(&detection.timestamp)),
    ];
    let mut y = 255.0;
    for line in &lines {
        layer.use_text(line.as_str(), 11.0, Mm(20.0), Mm(y), &body);
        y -= 8.0;
    }

    doc.save_to_bytes()
        .map_err(|e| DashboardError::Artifact(e.to_string()))
}

/// Renders the PDF and writes it under `dir`, returning an openable handle.
pub fn write_artifact(
    detection: &Detection,
    report_id: &str,
    dir: &Path,
) -> Result<ArtifactRef, DashboardError> {
    let bytes = render_detection_pdf(detection, report_id)?;
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.pdf", report_id));
    fs::write(&path, bytes)?;
    Ok(ArtifactRef::File(path))
}
