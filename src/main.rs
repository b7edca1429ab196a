use std::sync::Arc;
use std::{fs, path::Path, path::PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use veridash::{
    config::{load_config, AnalysisMode, AppConfig, ReportMode},
    core::state::DashboardState,
    ui::{app::App, terminal::run_tui},
    workflows::{progress::ProgressTracker, Engine, FileInput},
};

#[derive(Parser, Debug)]
#[command(
    name = "veridash",
    about = "AI detection dashboard with evidence report generation"
)]
struct Cli {
    /// Path to config file (TOML). Default: config/veridash.toml
    #[arg(long)]
    config: Option<String>,
    /// Override the detection/report endpoint base URL
    #[arg(long)]
    base_url: Option<String>,
    /// Analyze strategy override
    #[arg(long, value_enum)]
    analysis: Option<AnalysisArg>,
    /// Report strategy override
    #[arg(long, value_enum)]
    report: Option<ReportArg>,
    /// Directory for locally synthesized report PDFs
    #[arg(long)]
    reports_dir: Option<PathBuf>,
    /// Run without TUI: analyze one file, print the state as JSON
    #[arg(long)]
    no_tui: bool,
    /// File to analyze (headless)
    file: Option<String>,
    /// Detection type id for the headless run (deepfake|object|fraud)
    #[arg(long)]
    detection_type: Option<String>,
    /// Also generate an evidence report in the headless run
    #[arg(long)]
    generate_report: bool,
    /// Write the headless state JSON to a file as well
    #[arg(long)]
    output: Option<PathBuf>,
    /// Increase verbosity (info, debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Optional log file path
    #[arg(long, default_value = "data/veridash.log")]
    log_file: String,
}

#[derive(ValueEnum, Clone, Debug)]
enum AnalysisArg {
    Remote,
    Simulated,
}

impl From<AnalysisArg> for AnalysisMode {
    fn from(value: AnalysisArg) -> Self {
        match value {
            AnalysisArg::Remote => AnalysisMode::Remote,
            AnalysisArg::Simulated => AnalysisMode::Simulated,
        }
    }
}

#[derive(ValueEnum, Clone, Debug)]
enum ReportArg {
    RemoteFirst,
    LocalOnly,
}

impl From<ReportArg> for ReportMode {
    fn from(value: ReportArg) -> Self {
        match value {
            ReportArg::RemoteFirst => ReportMode::RemoteFirst,
            ReportArg::LocalOnly => ReportMode::LocalOnly,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli)?;

    let mut cfg = load_config(cli.config.as_deref())?;
    apply_overrides(&mut cfg, &cli);

    let engine = Arc::new(Engine::new(cfg)?);
    let mut state = DashboardState::new();

    if cli.no_tui {
        let file = cli
            .file
            .as_deref()
            .context("no file provided for headless run; pass a file")?;
        let type_id = cli
            .detection_type
            .as_deref()
            .context("pass --detection-type for headless runs")?;
        if state.detection_type(type_id).is_none() {
            anyhow::bail!("unknown detection type: {type_id}");
        }

        let path = PathBuf::from(file);
        let input = if path.exists() {
            FileInput::from_path(path)
        } else {
            FileInput::named(file)
        };

        let (tracker, _progress_rx) = ProgressTracker::channel();
        let detection = engine.analyze(type_id, &input, &tracker).await?;
        tracing::info!(
            detection_id = detection.id,
            confidence = detection.confidence,
            "analysis complete"
        );
        state.record_detection(detection.clone())?;

        if cli.generate_report {
            let outcome = engine.generate_report(&detection).await?;
            if let Some(remote_err) = &outcome.remote_error {
                tracing::warn!(%remote_err, "remote report failed; fell back to local synthesis");
            }
            tracing::info!(report_id = %outcome.report.id, artifact = %outcome.report.artifact, "report ready");
            state.record_report(outcome.report)?;
        }

        let json = serde_json::to_string_pretty(&state)?;
        if let Some(out_path) = &cli.output {
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(out_path, &json)?;
        }
        println!("{json}");
        Ok(())
    } else {
        run_tui(engine, state, App::new()).await?;
        Ok(())
    }
}

fn apply_overrides(cfg: &mut AppConfig, cli: &Cli) {
    if let Some(base_url) = &cli.base_url {
        cfg.base_url = base_url.trim_end_matches('/').to_string();
    }
    if let Some(mode) = cli.analysis.clone() {
        cfg.analysis_mode = mode.into();
    }
    if let Some(mode) = cli.report.clone() {
        cfg.report_mode = mode.into();
    }
    if let Some(dir) = &cli.reports_dir {
        cfg.reports_dir = dir.clone();
    }
}

fn init_tracing(cli: &Cli) -> anyhow::Result<()> {
    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let log_path = Path::new(&cli.log_file);
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    if log_path.exists() {
        if let Ok(meta) = fs::metadata(log_path) {
            if meta.len() > 1_000_000 {
                let rotated = log_path.with_extension("log.1");
                let _ = fs::rename(log_path, rotated);
            }
        }
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(false);

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);
    if cli.no_tui {
        // file-only under the TUI; the alternate screen owns the terminal
        registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init()
            .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    } else {
        registry
            .try_init()
            .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    }
    Ok(())
}
