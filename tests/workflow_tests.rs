use std::path::PathBuf;
use std::sync::Arc;

use httpmock::prelude::*;
use serde_json::json;

use veridash::config::{AnalysisMode, AppConfig, ReportMode};
use veridash::core::error::DashboardError;
use veridash::core::state::DashboardState;
use veridash::core::types::{ArtifactRef, Detection, ReportStatus};
use veridash::workflows::{progress::ProgressTracker, Engine, FileInput};

fn test_config(base_url: &str) -> AppConfig {
    AppConfig {
        base_url: base_url.trim_end_matches('/').to_string(),
        timeout_ms: 2_000,
        user_agent: "vd-test".to_string(),
        analysis_mode: AnalysisMode::Simulated,
        report_mode: ReportMode::LocalOnly,
        reports_dir: PathBuf::from("data/reports"),
        progress_tick_ms: 5,
        default_confidence: 0.85,
    }
}

#[tokio::test]
async fn simulated_analysis_records_one_detection() {
    let engine = Engine::new(test_config("http://127.0.0.1:1")).unwrap();
    let mut state = DashboardState::new();
    let (tracker, progress_rx) = ProgressTracker::channel();

    let detection = engine
        .analyze("deepfake", &FileInput::named("sample.mp4"), &tracker)
        .await
        .unwrap();
    state.record_detection(detection.clone()).unwrap();

    assert_eq!(state.detections().len(), 1);
    assert_eq!(detection.type_id, "deepfake");
    assert_eq!(detection.filename, "sample.mp4");
    assert!((0.7..=1.0).contains(&detection.confidence));
    assert_eq!(state.statistics().for_type("deepfake"), 1);
    assert_eq!(*progress_rx.borrow(), 100);
}

#[tokio::test]
async fn remote_analysis_uses_endpoint_fields() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/detection");
        then.status(200).json_body(json!({
            "success": true,
            "detection_id": 4242,
            "detection_type": "object",
            "filename": "server-name.png",
            "confidence": 0.66,
            "timestamp": "2026-01-02T03:04:05Z"
        }));
    });

    let mut cfg = test_config(&server.base_url());
    cfg.analysis_mode = AnalysisMode::Remote;
    let engine = Engine::new(cfg).unwrap();
    let (tracker, _rx) = ProgressTracker::channel();

    let detection = engine
        .analyze("object", &FileInput::named("scene.png"), &tracker)
        .await
        .unwrap();

    mock.assert();
    assert_eq!(detection.id, 4242);
    assert_eq!(detection.type_id, "object");
    assert_eq!(detection.filename, "server-name.png");
    assert!((detection.confidence - 0.66).abs() < 1e-9);
    assert_eq!(detection.timestamp.to_rfc3339(), "2026-01-02T03:04:05+00:00");
    assert_eq!(tracker.value(), 100);
}

#[tokio::test]
async fn remote_analysis_fills_missing_fields_with_defaults() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/detection");
        then.status(200).json_body(json!({ "success": true }));
    });

    let mut cfg = test_config(&server.base_url());
    cfg.analysis_mode = AnalysisMode::Remote;
    let engine = Engine::new(cfg).unwrap();
    let (tracker, _rx) = ProgressTracker::channel();

    let detection = engine
        .analyze("fraud", &FileInput::named("ledger.csv"), &tracker)
        .await
        .unwrap();

    assert_eq!(detection.type_id, "fraud");
    assert_eq!(detection.filename, "ledger.csv");
    assert!((detection.confidence - 0.85).abs() < 1e-9);
    assert!(detection.id > 0);
}

#[tokio::test]
async fn rejected_analysis_surfaces_error_and_adds_nothing() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/detection");
        then.status(200)
            .json_body(json!({ "success": false, "error": "bad format" }));
    });

    let mut cfg = test_config(&server.base_url());
    cfg.analysis_mode = AnalysisMode::Remote;
    let engine = Engine::new(cfg).unwrap();
    let mut state = DashboardState::new();
    let (tracker, _rx) = ProgressTracker::channel();

    let err = engine
        .analyze("deepfake", &FileInput::named("sample.mp4"), &tracker)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("bad format"));
    assert!(state.detections().is_empty());
    assert_eq!(state.statistics().total_detections, 0);
}

#[tokio::test]
async fn transport_failure_creates_no_detection() {
    // Nothing listens on this port.
    let mut cfg = test_config("http://127.0.0.1:9");
    cfg.analysis_mode = AnalysisMode::Remote;
    cfg.timeout_ms = 300;
    let engine = Engine::new(cfg).unwrap();
    let (tracker, _rx) = ProgressTracker::channel();

    let result = engine
        .analyze("object", &FileInput::named("scene.png"), &tracker)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn analyze_is_guarded_against_reentry() {
    let mut cfg = test_config("http://127.0.0.1:1");
    cfg.progress_tick_ms = 50;
    let engine = Arc::new(Engine::new(cfg).unwrap());
    let (tracker, _rx) = ProgressTracker::channel();

    let first = {
        let engine = engine.clone();
        let tracker = tracker.clone();
        tokio::spawn(async move {
            engine
                .analyze("deepfake", &FileInput::named("a.mp4"), &tracker)
                .await
        })
    };
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let second = engine
        .analyze("deepfake", &FileInput::named("b.mp4"), &tracker)
        .await;
    assert!(matches!(second, Err(DashboardError::Busy(_))));

    let first = first.await.unwrap().unwrap();
    assert_eq!(first.filename, "a.mp4");
}

#[tokio::test]
async fn remote_report_uses_server_artifact() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/reports/generate")
            .json_body(json!({ "detection_id": 77 }));
        then.status(200).json_body(json!({
            "success": true,
            "report_id": "EVD-SRV00001",
            "pdf_url": format!("{}/static/evd.pdf", server.base_url())
        }));
    });

    let mut cfg = test_config(&server.base_url());
    cfg.report_mode = ReportMode::RemoteFirst;
    let engine = Engine::new(cfg).unwrap();

    let mut detection = Detection::new("deepfake", "clip.mp4", 0.9);
    detection.id = 77;
    let outcome = engine.generate_report(&detection).await.unwrap();

    mock.assert();
    assert!(outcome.remote_error.is_none());
    assert_eq!(outcome.report.id, "EVD-SRV00001");
    assert_eq!(outcome.report.detection_id, 77);
    assert!(matches!(outcome.report.artifact, ArtifactRef::Url(ref u) if u.ends_with("/static/evd.pdf")));
}

#[tokio::test]
async fn remote_report_without_pdf_url_points_at_download_route() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/reports/generate");
        then.status(200)
            .json_body(json!({ "success": true, "report_id": "EVD-SRV00002" }));
    });

    let mut cfg = test_config(&server.base_url());
    cfg.report_mode = ReportMode::RemoteFirst;
    let engine = Engine::new(cfg).unwrap();

    let detection = Detection::new("object", "scene.png", 0.8);
    let outcome = engine.generate_report(&detection).await.unwrap();

    let ArtifactRef::Url(url) = &outcome.report.artifact else {
        panic!("expected a URL artifact");
    };
    assert!(url.ends_with("/reports/download/EVD-SRV00002"));
}

#[tokio::test]
async fn failed_remote_report_falls_back_to_local_pdf() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/reports/generate");
        then.status(500);
    });

    let dir = tempfile::tempdir().unwrap();
    let mut cfg = test_config(&server.base_url());
    cfg.report_mode = ReportMode::RemoteFirst;
    cfg.reports_dir = dir.path().to_path_buf();
    let engine = Engine::new(cfg).unwrap();

    let mut state = DashboardState::new();
    let detection = Detection::new("fraud", "ledger.csv", 0.83);
    state.record_detection(detection.clone()).unwrap();

    let outcome = engine.generate_report(&detection).await.unwrap();
    assert!(outcome.remote_error.is_some());
    assert_eq!(outcome.report.status, ReportStatus::Verified);
    let ArtifactRef::File(path) = &outcome.report.artifact else {
        panic!("expected a local file artifact");
    };
    let bytes = std::fs::read(path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));

    state.record_report(outcome.report).unwrap();
    assert_eq!(state.statistics().reports_generated, 1);
    assert_eq!(state.reports().len(), 1);
}

#[tokio::test]
async fn local_only_report_never_touches_the_network() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = test_config("http://127.0.0.1:9");
    cfg.reports_dir = dir.path().to_path_buf();
    let engine = Engine::new(cfg).unwrap();

    let detection = Detection::new("deepfake", "clip.mp4", 0.93);
    let outcome = engine.generate_report(&detection).await.unwrap();

    assert!(outcome.remote_error.is_none());
    assert!(outcome.report.id.starts_with("EVD-"));
    assert_eq!(outcome.report.id.len(), 12);
    assert!(matches!(outcome.report.artifact, ArtifactRef::File(_)));
}

#[tokio::test]
async fn repeated_generation_appends_reports_without_dedup() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = test_config("http://127.0.0.1:9");
    cfg.reports_dir = dir.path().to_path_buf();
    let engine = Engine::new(cfg).unwrap();

    let mut state = DashboardState::new();
    let detection = Detection::new("object", "scene.png", 0.71);
    state.record_detection(detection.clone()).unwrap();

    for _ in 0..2 {
        let outcome = engine.generate_report(&detection).await.unwrap();
        state.record_report(outcome.report).unwrap();
    }

    assert_eq!(state.statistics().reports_generated, 2);
    assert_eq!(state.reports().len(), 2);
    assert!(state.report_for(detection.id).is_some());
}
