use anyhow::{Context, Result};
use gaze_core::{EyeTracker, GazeEvent, Position, Resolution, TrackerKind};
use gaze_experiment::{
    Calibrate, CalibrateConfig, ExperimentContext, Item, ItemKind, ItemSpec, LogConfig, Sequence,
    StopRecordingConfig, WaitConfig,
};
use gaze_render::Scene;
use gaze_timing::Timer;
use parking_lot::Mutex;
use rand::Rng;
use std::sync::Arc;
use tracing::{info, warn};

/// Share of the screen, around the centre, where drift targets are placed.
const TARGET_SPREAD: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub tracker: TrackerKind,
    pub trials: u32,
    pub fix_triggered: bool,
    pub calibrate: CalibrateConfig,
    /// Items run inside each trial, after recording has started.
    pub trial_items: Vec<ItemSpec>,
}

impl SessionConfig {
    /// Wait for `event`, log it, stop recording.
    pub fn default_items(event: GazeEvent) -> Vec<ItemSpec> {
        vec![
            ItemSpec::new("wait", ItemKind::EyetrackerWait(WaitConfig { event })),
            ItemSpec::new(
                "log",
                ItemKind::EyetrackerLog(LogConfig {
                    msg: format!("trial [trial] {} at [time_wait]", event.label()),
                    ..LogConfig::default()
                }),
            ),
            ItemSpec::new(
                "stop_recording",
                ItemKind::EyetrackerStopRecording(StopRecordingConfig::default()),
            ),
        ]
    }
}

/// Places a drift target uniformly inside the central part of the screen.
pub fn random_target(resolution: Resolution, rng: &mut impl Rng) -> Position {
    let center = resolution.center();
    let dx = resolution.width as f64 * TARGET_SPREAD / 2.0;
    let dy = resolution.height as f64 * TARGET_SPREAD / 2.0;
    Position::new(
        center.x + rng.random_range(-dx..=dx),
        center.y + rng.random_range(-dy..=dy),
    )
}

/// Calibrate, then per trial: drift check, record, run the trial items.
///
/// The tracker is closed through [`ExperimentContext::finish`] even when a
/// trial fails.
pub fn run_session<T: Timer<Timestamp = u64>>(
    ctx: &mut ExperimentContext<T>,
    config: &SessionConfig,
    scene: &Mutex<Scene>,
    rng: &mut impl Rng,
) -> Result<()> {
    let result = run_trials(ctx, config, scene, rng);
    let finished = ctx.finish().context("closing tracker");
    {
        let mut scene = scene.lock();
        scene.drift_target = None;
        scene.fixation_cross = false;
        scene.recording = false;
    }
    result.and(finished.map(|_| ()))
}

fn run_trials<T: Timer<Timestamp = u64>>(
    ctx: &mut ExperimentContext<T>,
    config: &SessionConfig,
    scene: &Mutex<Scene>,
    rng: &mut impl Rng,
) -> Result<()> {
    let mut calibrate = Calibrate::new(
        "eyetracker_calibrate",
        CalibrateConfig {
            tracker_type: config.tracker,
            ..config.calibrate.clone()
        },
    );
    calibrate.prepare(ctx).context("connecting tracker")?;
    calibrate.run(ctx).context("calibrating tracker")?;
    scene.lock().target_size = config.calibrate.cal_target_size;

    for trial in 1..=config.trials {
        ctx.set_var("trial", trial);
        let target = random_target(ctx.resolution(), rng);
        scene.lock().drift_target = Some(target);
        info!(trial, %target, "drift correction");

        loop {
            let accepted = ctx
                .tracker_mut()?
                .drift_correction(Some(target), config.fix_triggered)?;
            if accepted {
                break;
            }
            warn!(trial, "drift correction failed, retrying");
        }

        {
            let mut scene = scene.lock();
            scene.drift_target = None;
            scene.fixation_cross = true;
            scene.recording = true;
        }
        ctx.tracker_mut()?.start_recording()?;

        let items = config
            .trial_items
            .iter()
            .cloned()
            .map(ItemSpec::build)
            .collect();
        let mut sequence: Sequence<T> = Sequence::new(&format!("trial_{trial}"), items);
        sequence.prepare(ctx)?;
        sequence.run(ctx)?;

        let mut scene = scene.lock();
        scene.fixation_cross = false;
        scene.recording = false;
    }
    Ok(())
}

/// Scene shared between the session thread and the renderer.
pub fn shared_scene(config: &SessionConfig) -> Arc<Mutex<Scene>> {
    Arc::new(Mutex::new(Scene {
        target_size: config.calibrate.cal_target_size,
        ..Scene::default()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gaze_core::{AbortSignal, TrackerError};
    use gaze_timing::ManualTimer;
    use gaze_tracker::HostServices;
    use gaze_tracker::scripted::{RecordingSynth, ScriptedKeyboard, ScriptedPointer};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn config(tracker: TrackerKind, trials: u32) -> SessionConfig {
        SessionConfig {
            tracker,
            trials,
            fix_triggered: false,
            calibrate: CalibrateConfig::default(),
            trial_items: SessionConfig::default_items(GazeEvent::SaccadeStart),
        }
    }

    #[test]
    fn test_targets_stay_in_central_region() {
        let mut rng = StdRng::seed_from_u64(3);
        let res = Resolution::new(1000, 800);
        for _ in 0..100 {
            let p = random_target(res, &mut rng);
            assert!((250.0..=750.0).contains(&p.x));
            assert!((200.0..=600.0).contains(&p.y));
        }
    }

    #[test]
    fn test_simple_dummy_session_runs_all_trials() {
        let timer = ManualTimer::new();
        let host = HostServices::new(
            timer.clone(),
            ScriptedPointer::full(),
            ScriptedKeyboard::default(),
            RecordingSynth::new(),
            AbortSignal::new(),
        );
        let mut ctx = ExperimentContext::new(Resolution::new(800, 600), host);
        let cfg = config(TrackerKind::SimpleDummy, 3);
        let scene = shared_scene(&cfg);

        run_session(&mut ctx, &cfg, &scene, &mut StdRng::seed_from_u64(1)).unwrap();

        assert_eq!(ctx.var("trial"), Some("3"));
        assert!(ctx.var("time_trial_3").is_some());
        assert!(!ctx.has_tracker());
        assert_eq!(*scene.lock(), Scene::default());
    }

    #[test]
    fn test_abort_still_closes_tracker() {
        let abort = AbortSignal::new();
        let pointer = ScriptedPointer::full().abort_when_exhausted(&abort);
        let keyboard = ScriptedKeyboard::new([None, None]).abort_when_exhausted(&abort);
        let host = HostServices::new(
            ManualTimer::new(),
            pointer.clone(),
            keyboard,
            RecordingSynth::new(),
            abort,
        );
        let mut ctx = ExperimentContext::new(Resolution::new(800, 600), host);
        let cfg = config(TrackerKind::ExtendedDummy, 2);
        let scene = shared_scene(&cfg);

        let err = run_session(&mut ctx, &cfg, &scene, &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert_eq!(err.downcast_ref::<TrackerError>(), Some(&TrackerError::Aborted));
        assert!(!ctx.has_tracker());
        assert!(!pointer.is_visible());
    }
}
