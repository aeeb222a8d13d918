//! hem CLI
//!
//! Replays capture files through the statistics engine and writes one JSON
//! report per completed match.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use hem_core::capture::CaptureReader;
use hem_core::transport::{record_queue, RecordReceiver, RX_BUFFER_COUNT};
use hem_core::{EngineConfig, EngineDiagnostics, MatchReport, RecordOutcome, StatsEngine, ThresholdsConfig};

#[derive(Parser)]
#[command(name = "hem")]
#[command(about = "Replay match captures through the statistics engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a capture file and export match reports
    Replay(ReplayArgs),

    /// Print the effective engine configuration
    Config {
        /// Threshold preset (legacy, extended)
        #[arg(long)]
        profile: Option<String>,
    },
}

#[derive(Args, Debug, Clone)]
struct ReplayArgs {
    /// Capture file path
    #[arg(long)]
    input: PathBuf,

    /// Engine configuration JSON file
    #[arg(long, conflicts_with = "profile")]
    config: Option<PathBuf>,

    /// Threshold preset (legacy, extended)
    #[arg(long)]
    profile: Option<String>,

    /// Output file; reports go to stdout when omitted
    #[arg(long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportedReport {
    timestamp: DateTime<Utc>,
    source: String,
    #[serde(flatten)]
    report: MatchReport,
}

#[derive(Debug)]
struct ReplayOutcome {
    reports: Vec<ExportedReport>,
    diagnostics: EngineDiagnostics,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay(args) => {
            let config = load_config(args.config.as_deref(), args.profile.as_deref())?;
            let outcome = replay(&args.input, config)?;
            info!(
                matches = outcome.reports.len(),
                processed = outcome.diagnostics.records_processed,
                malformed = outcome.diagnostics.malformed_records,
                out_of_order = outcome.diagnostics.out_of_order_frames,
                rejected = outcome.diagnostics.rejected_records,
                "replay finished"
            );
            write_reports(&outcome.reports, args.output.as_deref(), args.pretty)?;
        }
        Commands::Config { profile } => {
            let config = load_config(None, profile.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>, profile: Option<&str>) -> Result<EngineConfig> {
    let config = match (path, profile) {
        (Some(path), _) => {
            let json = fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
            EngineConfig::from_json_str(&json).with_context(|| format!("parsing config {}", path.display()))?
        }
        (None, Some(name)) => {
            let thresholds = ThresholdsConfig::preset(name).ok_or_else(|| anyhow!("unknown threshold profile `{name}`"))?;
            EngineConfig { thresholds }
        }
        (None, None) => EngineConfig::from_env_or_default(),
    };
    config.validate()?;
    Ok(config)
}

fn replay(input: &Path, config: EngineConfig) -> Result<ReplayOutcome> {
    let reader = CaptureReader::open(input).with_context(|| format!("opening capture {}", input.display()))?;
    let source = input.display().to_string();

    let mut engine = StatsEngine::new(config);
    let (mut tx, mut rx) = record_queue(RX_BUFFER_COUNT);
    let mut reports = Vec::new();

    for record in reader {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                warn!(error = %err, "capture ended early");
                break;
            }
        };
        if tx.vacant_len() == 0 {
            pump(&mut rx, &mut engine, &source, &mut reports);
        }
        if !tx.send(record) {
            bail!("record queue rejected a record with free slots");
        }
    }
    pump(&mut rx, &mut engine, &source, &mut reports);

    Ok(ReplayOutcome { reports, diagnostics: engine.diagnostics() })
}

fn pump(rx: &mut RecordReceiver, engine: &mut StatsEngine, source: &str, reports: &mut Vec<ExportedReport>) {
    for record in rx.drain() {
        if engine.process(&record) != RecordOutcome::MatchEnded {
            continue;
        }
        if let Some(state) = engine.finished_match() {
            let report = MatchReport::from_state(state);
            info!(frames = report.frames, win_condition = ?report.win_condition, "match report ready");
            reports.push(ExportedReport { timestamp: Utc::now(), source: source.to_string(), report });
        }
    }
}

fn write_reports(reports: &[ExportedReport], output: Option<&Path>, pretty: bool) -> Result<()> {
    let json = if pretty { serde_json::to_string_pretty(reports)? } else { serde_json::to_string(reports)? };
    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "reports written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hem_core::capture::CaptureWriter;
    use hem_core::decoder::{FrameUpdate, MatchResult, MatchSetup};
    use hem_core::EventRecord;

    fn write_capture(path: &Path, matches: usize) {
        let mut writer = CaptureWriter::create(path).unwrap();
        for _ in 0..matches {
            let mut setup = MatchSetup { stage_id: 32, ..Default::default() };
            setup.competitors[0].starting_stocks = 4;
            setup.competitors[1].starting_stocks = 4;
            writer.write_record(&setup.to_record()).unwrap();
            for frame in 1..=120 {
                let mut update = FrameUpdate { frame_counter: frame, ..Default::default() };
                update.competitors[0].stocks = 4;
                update.competitors[1].stocks = 4;
                writer.write_record(&update.to_record()).unwrap();
            }
            writer.write_record(&MatchResult { win_condition: 2 }.to_record()).unwrap();
        }
        writer.write_record(&EventRecord::new(7, &[1, 2, 3]).unwrap()).unwrap();
        writer.finish().unwrap();
    }

    #[test]
    fn test_load_config_profiles() {
        assert_eq!(load_config(None, Some("extended")).unwrap(), EngineConfig::extended());
        assert!(load_config(None, Some("nope")).is_err());
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        fs::write(&path, r#"{"thresholds": {"punish_reset_frames": 30}}"#).unwrap();
        let config = load_config(Some(&path), None).unwrap();
        assert_eq!(config.thresholds.punish_reset_frames, 30);
        assert_eq!(config.thresholds.recovery_landing_frames, 45);

        fs::write(&path, r#"{"thresholds": {"punish_reset_frames": 0}}"#).unwrap();
        assert!(load_config(Some(&path), None).is_err());
    }

    #[test]
    fn test_replay_reports_every_match() {
        let dir = tempfile::tempdir().unwrap();
        let capture = dir.path().join("session.hem");
        write_capture(&capture, 3);

        let outcome = replay(&capture, EngineConfig::default()).unwrap();
        assert_eq!(outcome.reports.len(), 3);
        assert_eq!(outcome.diagnostics.malformed_records, 1);
        assert_eq!(outcome.reports[0].report.frames, 120);

        let output = dir.path().join("reports.json");
        write_reports(&outcome.reports, Some(&output), false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 3);
        assert_eq!(value[0]["winCondition"], 2);
        assert!(value[0]["timestamp"].is_string());
    }

    #[test]
    fn test_replay_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(replay(&dir.path().join("missing.hem"), EngineConfig::default()).is_err());
    }
}
