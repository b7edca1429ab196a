use std::{fs, path::Path, path::PathBuf};

use serde::Deserialize;

use crate::core::error::DashboardError;

/// Which analyze strategy a build runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisMode {
    Remote,
    Simulated,
}

/// Which report-generation strategy a build runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportMode {
    RemoteFirst,
    LocalOnly,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub user_agent: String,
    pub analysis_mode: AnalysisMode,
    pub report_mode: ReportMode,
    pub reports_dir: PathBuf,
    /// Interval between progress ticks (heartbeat and simulated strategy).
    pub progress_tick_ms: u64,
    /// Confidence assumed when the endpoint omits one.
    pub default_confidence: f64,
}

pub fn load_config(path: Option<&str>) -> Result<AppConfig, DashboardError> {
    let default_path = Path::new("config/veridash.toml");
    let path = path.map(Path::new).unwrap_or(default_path);

    if !path.exists() {
        return Ok(default_config());
    }

    let content = fs::read_to_string(path).map_err(|e| DashboardError::Config(e.to_string()))?;
    let cfg: AppConfig =
        toml::from_str(&content).map_err(|e| DashboardError::Config(e.to_string()))?;
    Ok(cfg)
}

pub fn default_config() -> AppConfig {
    AppConfig {
        base_url: "http://127.0.0.1:8080".to_string(),
        timeout_ms: 10_000,
        user_agent: "veridash/0.1".to_string(),
        analysis_mode: AnalysisMode::Simulated,
        report_mode: ReportMode::LocalOnly,
        reports_dir: PathBuf::from("data/reports"),
        progress_tick_ms: 200,
        default_confidence: 0.85,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = load_config(Some("config/does-not-exist.toml")).unwrap();
        assert_eq!(cfg.analysis_mode, AnalysisMode::Simulated);
        assert_eq!(cfg.report_mode, ReportMode::LocalOnly);
        assert!((cfg.default_confidence - 0.85).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_kebab_case_modes() {
        let cfg: AppConfig = toml::from_str(
            r#"
            base_url = "http://localhost:9000"
            timeout_ms = 5000
            user_agent = "vd-test"
            analysis_mode = "remote"
            report_mode = "remote-first"
            reports_dir = "out/reports"
            progress_tick_ms = 100
            default_confidence = 0.85
            "#,
        )
        .unwrap();
        assert_eq!(cfg.analysis_mode, AnalysisMode::Remote);
        assert_eq!(cfg.report_mode, ReportMode::RemoteFirst);
    }
}
