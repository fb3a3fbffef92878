//! `pathsense` – replay recorded depth frames through the obstacle pipeline.
//!
//! The binary:
//!
//! 1. Loads `~/.pathsense/config.toml` (or `--config`), applying
//!    `PATHSENSE_*` environment overrides on top.
//! 2. Reads one or more JSON frame files (a single frame or an array).
//! 3. Gates, processes and announces every frame as a live session would,
//!    routing speech and haptic events to the log.
//! 4. Prints a per-frame report, or newline-delimited JSON with `--json`.

mod config;
mod frames;
mod replay;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use pathsense_feedback::{FeedbackEvent, LogSink, Units};
use pathsense_types::PathSenseError;
use tracing::info;

use crate::replay::{FrameOutcome, Replay, ReplayStep};

#[derive(Parser, Debug)]
#[command(name = "pathsense", version, about = "Obstacle detection over recorded depth frames")]
struct Args {
    /// JSON frame files, replayed in timestamp order.
    #[arg(required = true)]
    frames: Vec<PathBuf>,

    /// Config file (defaults to ~/.pathsense/config.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit one JSON object per frame instead of the text report.
    #[arg(long)]
    json: bool,

    /// Announce distances in feet.
    #[arg(long)]
    feet: bool,

    /// Disable spoken feedback.
    #[arg(long)]
    no_voice: bool,

    /// Disable haptic feedback.
    #[arg(long)]
    no_haptic: bool,

    /// Treat the recording device as having no depth sensor.
    #[arg(long)]
    no_lidar: bool,

    /// Write the effective configuration back to the config file.
    #[arg(long)]
    save_config: bool,
}

fn main() -> ExitCode {
    // ── Structured logging ────────────────────────────────────────────────
    // RUST_LOG selects the level (default "info").  PATHSENSE_LOG_FORMAT=json
    // switches to newline-delimited JSON.  Logs go to stderr so `--json`
    // output on stdout stays machine-readable.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("PATHSENSE_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }

    let args = Args::parse();
    match try_main(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn try_main(args: &Args) -> Result<(), PathSenseError> {
    let config_path = args.config.clone().unwrap_or_else(config::config_path);
    let mut cfg = config::load_or_default(&config_path)?;
    apply_flags(&mut cfg, args);

    if args.save_config {
        config::save_to(&cfg, &config_path)?;
        info!(path = %config_path.display(), "config saved");
    }

    let frames = frames::load_all(&args.frames)?;
    info!(frames = frames.len(), "frames loaded");

    let mut replay = Replay::new(&cfg)?;
    let mut sink = LogSink;
    replay.startup(&mut sink);

    let steps = replay.run(&frames, &mut sink);
    for step in &steps {
        if args.json {
            print_json(step)?;
        } else {
            print_step(step, cfg.feedback.units);
        }
    }
    let processed = steps
        .iter()
        .filter(|s| matches!(s.outcome, FrameOutcome::Processed { .. }))
        .count();
    info!(
        processed,
        closest = ?replay.session().closest_obstacle(),
        "replay finished"
    );

    if !args.json {
        println!();
        println!(
            "  {} {} of {} frame(s) processed",
            "✓".green().bold(),
            processed,
            frames.len()
        );
    }
    Ok(())
}

/// Command-line switches win over the config file and the environment.
fn apply_flags(cfg: &mut config::Config, args: &Args) {
    if args.feet
        && let Some(phrase) = cfg.feedback.set_units(Units::Feet)
    {
        info!("{phrase}");
    }
    if args.no_voice && cfg.feedback.voice {
        info!("{}", cfg.feedback.toggle_voice());
    }
    if args.no_haptic && cfg.feedback.haptic {
        info!("{}", cfg.feedback.toggle_haptic());
    }
    if args.no_lidar {
        cfg.lidar_available = false;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Output
// ─────────────────────────────────────────────────────────────────────────────

fn print_step(step: &ReplayStep, units: Units) {
    let header = format!("[{:>4}] t={:>7.2}s", step.index, step.timestamp_s);
    match &step.outcome {
        FrameOutcome::Skipped => println!("  {} {}", header.dimmed(), "skipped".dimmed()),
        FrameOutcome::Rejected(e) => println!("  {} {}: {}", header, "rejected".red(), e),
        FrameOutcome::Processed { report, events } => {
            let obstacles = if report.obstacles.is_empty() {
                "clear".green().to_string()
            } else {
                report
                    .obstacles
                    .iter()
                    .map(|d| pathsense_feedback::format_distance(*d, units))
                    .collect::<Vec<_>>()
                    .join(", ")
                    .yellow()
                    .to_string()
            };
            println!(
                "  {} obstacles [{} {}]  kept {} / corridor {}",
                header.bold(),
                obstacles,
                units,
                report.retained_points,
                report.isolated_points
            );
            let mut pulses = Vec::new();
            for event in events {
                match event {
                    FeedbackEvent::Speak(text) => println!("      {} {}", "speak".cyan(), text),
                    FeedbackEvent::Vibrate(intensity) => pulses.push(*intensity),
                }
            }
            if let Some(intensity) = pulses.first() {
                println!("      {} {:.2} x{}", "pulse".magenta(), intensity, pulses.len());
            }
        }
    }
}

fn print_json(step: &ReplayStep) -> Result<(), PathSenseError> {
    let value = match &step.outcome {
        FrameOutcome::Skipped => serde_json::json!({
            "index": step.index,
            "timestamp_s": step.timestamp_s,
            "status": "skipped",
        }),
        FrameOutcome::Rejected(e) => serde_json::json!({
            "index": step.index,
            "timestamp_s": step.timestamp_s,
            "status": "rejected",
            "error": e.to_string(),
        }),
        FrameOutcome::Processed { report, events } => serde_json::json!({
            "index": step.index,
            "timestamp_s": step.timestamp_s,
            "status": "processed",
            "report": report,
            "events": events,
        }),
    };
    let line = serde_json::to_string(&value)
        .map_err(|e| PathSenseError::Serialization(format!("Failed to encode report: {}", e)))?;
    println!("{line}");
    Ok(())
}
