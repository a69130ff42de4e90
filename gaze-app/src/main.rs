mod app;
mod host;
mod session;

use anyhow::Context;
use app::App;
use clap::Parser;
use gaze_core::{GazeEvent, TrackerKind};
use gaze_experiment::{CalibrateConfig, load_items};
use session::SessionConfig;
use std::path::PathBuf;
use tracing::info;

/// Runs drift-checked recording trials against a simulated eye tracker.
#[derive(Debug, Parser)]
#[command(name = "gaze-app", version)]
struct Cli {
    /// simple-dummy, extended-dummy (mouse), eyelink or smi.
    #[arg(long, default_value = "extended-dummy")]
    tracker: TrackerKind,

    #[arg(long, default_value_t = 3)]
    trials: u32,

    /// Event each trial waits for, by code (3..=8) or label ("Saccade start").
    #[arg(long, default_value = "5", value_parser = parse_event)]
    event: GazeEvent,

    /// Accept drift correction on a steady fixation instead of the space bar.
    #[arg(long)]
    fix_triggered: bool,

    /// Calibration target diameter in pixels.
    #[arg(long, default_value_t = 16)]
    target_size: u32,

    /// JSON item list run in every trial, replacing wait/log/stop.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_event(s: &str) -> Result<GazeEvent, String> {
    match s.parse::<i32>() {
        Ok(code) => GazeEvent::from_code(code),
        Err(_) => GazeEvent::from_label(s),
    }
    .ok_or_else(|| format!("unknown event '{s}'"))
}

impl Cli {
    fn session_config(&self) -> anyhow::Result<SessionConfig> {
        let trial_items = match &self.config {
            Some(path) => load_items(path)
                .with_context(|| format!("reading item list {}", path.display()))?,
            None => SessionConfig::default_items(self.event),
        };
        Ok(SessionConfig {
            tracker: self.tracker,
            trials: self.trials,
            fix_triggered: self.fix_triggered,
            calibrate: CalibrateConfig {
                tracker_type: self.tracker,
                cal_target_size: self.target_size,
                ..CalibrateConfig::default()
            },
            trial_items,
        })
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gaze_app=info,gaze_tracker=info,gaze_experiment=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.session_config()?;
    info!(tracker = cli.tracker.as_str(), trials = cli.trials, "session configured");
    App::run(config)
}
