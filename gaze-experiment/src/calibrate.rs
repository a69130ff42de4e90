use crate::config::CalibrateConfig;
use crate::{ExperimentContext, ExperimentError, Item, Result};
use gaze_core::{CalibrationOptions, EyeTracker, TrackerError, TrackerKind};
use gaze_timing::Timer;
use gaze_tracker::{TrackerSettings, connect};
use tracing::{debug, info, warn};

/// Connects the configured tracker and calibrates it.
///
/// Must come before every other eyetracker item; the connection stays open
/// until [`ExperimentContext::finish`].
#[derive(Debug, Clone)]
pub struct Calibrate {
    name: String,
    config: CalibrateConfig,
}

impl Calibrate {
    pub fn new(name: &str, config: CalibrateConfig) -> Self {
        Self {
            name: name.to_string(),
            config,
        }
    }

    pub fn config(&self) -> &CalibrateConfig {
        &self.config
    }

    fn settings(&self, ctx: &ExperimentContext<impl Timer<Timestamp = u64>>) -> TrackerSettings {
        TrackerSettings {
            saccade_velocity_threshold: self.config.sacc_vel_thresh,
            saccade_acceleration_threshold: self.config.sacc_acc_thresh,
            force_drift_correct: self.config.force_drift_correct,
            ..TrackerSettings::for_resolution(ctx.resolution())
        }
    }
}

impl<T: Timer<Timestamp = u64>> Item<T> for Calibrate {
    fn name(&self) -> &str {
        &self.name
    }

    fn item_type(&self) -> &'static str {
        "eyetracker_calibrate"
    }

    fn prepare(&mut self, ctx: &mut ExperimentContext<T>) -> Result<()> {
        if ctx.has_tracker() {
            return Err(ExperimentError::AlreadyConnected);
        }
        let kind = self.config.tracker_type;
        if kind == TrackerKind::Smi {
            debug!(
                ip = %self.config.ip,
                sendport = self.config.sendport,
                receiveport = self.config.receiveport,
                screen_w = self.config.screen_w,
                screen_h = self.config.screen_h,
                "SMI link settings"
            );
        }
        // the host can be taken only once
        if kind.is_hardware() {
            warn!(%kind, "no driver for hardware tracker");
            return Err(TrackerError::Unavailable(kind).into());
        }
        let settings = self.settings(ctx);
        info!(%kind, data_file = %settings.data_file, "loading tracker");
        let host = ctx.take_host()?;
        let driver = connect(kind, host, settings)?;
        ctx.register_tracker(driver)
    }

    fn run(&mut self, ctx: &mut ExperimentContext<T>) -> Result<()> {
        ctx.set_item_onset(&self.name);
        let options = CalibrationOptions {
            beep: self.config.cal_beep,
            target_size: self.config.cal_target_size,
        };
        ctx.tracker_mut()?.calibrate(options)?;
        Ok(())
    }
}
