use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use uwb_lateration::{init_logging, EngineConfig, EstimateFormatter, PositioningEngine, SolveMethod};

/// Headless UWB positioning: reads gateway JSON payloads, one per line, from stdin
#[derive(Debug, Parser)]
#[command(name = "uwb-lateration", version)]
struct Cli {
    /// Engine configuration file (JSON); defaults to the lab layout
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Decimal places for printed coordinates
    #[arg(short, long, default_value_t = 2)]
    precision: u8,

    /// Print full solve reports as JSON lines instead of text
    #[arg(long)]
    json: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => EngineConfig::default(),
    };

    if cli.print_config {
        println!("{}", config.to_json_pretty()?);
        return Ok(());
    }

    init_logging(config.log_level);
    let engine = PositioningEngine::new(&config)?;
    let formatter = EstimateFormatter::new().with_precision(cli.precision);
    info!(anchors = config.anchors.len(), "reading payloads from stdin");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        let payload = line.trim();
        if payload.is_empty() {
            continue;
        }

        match engine.ingest(payload) {
            Ok(report) => {
                if !report.applied.is_clean() || !report.malformed.is_empty() {
                    warn!(
                        rejected = report.applied.rejected.len(),
                        malformed = report.malformed.len(),
                        "payload partially applied"
                    );
                }
            }
            Err(err) => {
                warn!(error = %err, "dropping payload");
                continue;
            }
        }

        if cli.json {
            let report = engine.estimate_detailed();
            writeln!(out, "{}", formatter.format_report_json(&report)?)?;
        } else {
            // Both methods side by side; an unresolved line means "marker unchanged"
            let comparison = engine.compare();
            writeln!(
                out,
                "{}",
                formatter.format_text(SolveMethod::Trilateration.label(), &comparison.trilateration)
            )?;
            writeln!(
                out,
                "{}",
                formatter.format_text(SolveMethod::LeastSquares.label(), &comparison.least_squares)
            )?;
        }
        out.flush()?;
    }

    info!(observed = engine.table().observed_ids().len(), "input closed");
    Ok(())
}
