//! Mouse-driven tracker simulator ("extended dummy").
//!
//! The pointer stands in for gaze. Events are derived from pointer movement with
//! two fixed rules:
//!
//! - a saccade starts (or a fixation ends) once the pointer is more than
//!   [`MOVEMENT_THRESHOLD_PX`] away from where it was;
//! - a fixation starts (or a saccade ends) once [`STABLE_SAMPLES`] consecutive
//!   samples, taken [`POLL_INTERVAL`] apart, spread less than
//!   [`MOVEMENT_THRESHOLD_PX`] on both axes.
//!
//! Blinks are simulated with a mouse button, see [`BlinkTracker`].

mod blink;
mod drift;
mod window;

pub use blink::BlinkTracker;
pub use window::StabilityWindow;

use crate::{HostServices, TrackerSettings};
use gaze_core::{
    CalibrationOptions, Detection, EyeTracker, FixTrigger, Position, Saccade, TrackerKind,
    TrackerResult,
};
use gaze_timing::Timer;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const MOVEMENT_THRESHOLD_PX: f64 = 3.0;
pub const STABLE_SAMPLES: usize = 5;
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);
/// Largest gaze error accepted by a key-triggered drift check.
pub const DRIFT_TOLERANCE_PX: f64 = 60.0;
/// Number of `log`/`log_var` lines kept by [`SimulatedTracker::messages`].
pub const MESSAGE_HISTORY: usize = 1000;

pub struct SimulatedTracker<T: Timer<Timestamp = u64>> {
    host: HostServices<T>,
    settings: TrackerSettings,
    recording: bool,
    blink: BlinkTracker,
    blink_available: bool,
    messages: VecDeque<String>,
}

impl<T: Timer<Timestamp = u64>> SimulatedTracker<T> {
    pub fn new(host: HostServices<T>, settings: TrackerSettings) -> Self {
        let capabilities = host.pointer.capabilities();
        let blink_available = capabilities.supports_blink();
        if !blink_available {
            warn!(
                ?capabilities,
                "blink simulation not available: pointer lacks button state and/or warping"
            );
        }
        info!(
            resolution = ?settings.resolution,
            data_file = %settings.data_file,
            "mouse tracker simulator ready"
        );
        Self {
            blink: BlinkTracker::new(settings.resolution, settings.blink_button),
            host,
            settings,
            recording: false,
            blink_available,
            messages: VecDeque::with_capacity(MESSAGE_HISTORY),
        }
    }

    pub fn blink_available(&self) -> bool {
        self.blink_available
    }

    pub fn is_blinking(&self) -> bool {
        self.blink.is_blinking()
    }

    /// The last [`MESSAGE_HISTORY`] lines written with `log` and `log_var`,
    /// oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.messages.iter().cloned().collect()
    }

    fn record_message(&mut self, line: String) {
        if self.messages.len() >= MESSAGE_HISTORY {
            self.messages.pop_front();
        }
        self.messages.push_back(line);
    }

    fn default_target(&self, target: Option<Position>) -> Position {
        target.unwrap_or_else(|| self.settings.resolution.center())
    }

    /// Busy-polls until gaze is further than the movement threshold from `origin`.
    fn wait_for_departure(&mut self, origin: Position) -> TrackerResult<()> {
        loop {
            self.host.abort.check()?;
            if self.sample().distance(origin) > MOVEMENT_THRESHOLD_PX {
                return Ok(());
            }
        }
    }

    /// Polls every [`POLL_INTERVAL`] until gaze settles; returns the newest sample.
    fn wait_for_stability(&mut self) -> TrackerResult<Position> {
        let mut window = StabilityWindow::new(STABLE_SAMPLES, MOVEMENT_THRESHOLD_PX);
        loop {
            self.host.abort.check()?;
            let sample = self.sample();
            let settled = window.push(sample);
            self.host.timer.sleep(POLL_INTERVAL);
            if let Some(pos) = settled {
                return Ok(pos);
            }
        }
    }

    fn wait_for_blink_state(&mut self, blinking: bool) -> TrackerResult<Position> {
        loop {
            self.host.abort.check()?;
            let pos = self.sample();
            if self.blink.is_blinking() == blinking {
                return Ok(pos);
            }
        }
    }

    fn blink_unavailable(&self) -> Detection {
        warn!("blink functionality not available");
        Detection {
            timestamp: self.now(),
            position: Position::ORIGIN,
        }
    }
}

impl<T: Timer<Timestamp = u64>> EyeTracker for SimulatedTracker<T> {
    fn kind(&self) -> TrackerKind {
        TrackerKind::ExtendedDummy
    }

    fn now(&self) -> u64 {
        self.host.timer.now()
    }

    fn connected(&self) -> bool {
        true
    }

    fn is_recording(&self) -> bool {
        self.recording
    }

    fn send_command(&mut self, cmd: &str) {
        info!(%cmd, "send_command");
    }

    fn log(&mut self, msg: &str) {
        info!(%msg, "log");
        self.record_message(msg.to_string());
    }

    fn log_var(&mut self, var: &str, val: &str) {
        info!(%var, %val, "log_var");
        self.record_message(format!("var {var} {val}"));
    }

    fn status_msg(&mut self, msg: &str) {
        info!(%msg, "status_msg");
    }

    fn calibrate(&mut self, options: CalibrationOptions) -> TrackerResult<()> {
        info!(
            beep = options.beep,
            target_size = options.target_size,
            "calibration would now take place"
        );
        Ok(())
    }

    fn drift_correction(
        &mut self,
        target: Option<Position>,
        fix_triggered: bool,
    ) -> TrackerResult<bool> {
        if fix_triggered {
            return self.fix_triggered_drift_correction(target, FixTrigger::default());
        }
        let target = self.default_target(target);
        self.key_triggered_drift(target)
    }

    fn fix_triggered_drift_correction(
        &mut self,
        target: Option<Position>,
        trigger: FixTrigger,
    ) -> TrackerResult<bool> {
        let target = self.default_target(target);
        self.fixation_triggered_drift(target, trigger)
    }

    fn start_recording(&mut self) -> TrackerResult<()> {
        self.host.pointer.set_visible(true);
        self.recording = true;
        info!("recording started");
        Ok(())
    }

    fn stop_recording(&mut self) -> TrackerResult<()> {
        self.host.pointer.set_visible(false);
        self.recording = false;
        info!("recording stopped");
        Ok(())
    }

    fn close(&mut self) -> TrackerResult<()> {
        if self.recording {
            self.stop_recording()?;
        }
        info!("connection closed");
        Ok(())
    }

    /// Reads the pointer, applying blink transitions first when supported.
    fn sample(&mut self) -> Position {
        if self.blink_available {
            self.blink.update(self.host.pointer.as_mut());
        }
        self.host.pointer.position()
    }

    fn wait_for_saccade_start(&mut self) -> TrackerResult<Detection> {
        let start = self.sample();
        self.wait_for_departure(start)?;
        debug!(%start, "saccade start");
        Ok(Detection {
            timestamp: self.now(),
            position: start,
        })
    }

    fn wait_for_saccade_end(&mut self) -> TrackerResult<Saccade> {
        let start = self.wait_for_saccade_start()?.position;
        let end = self.wait_for_stability()?;
        debug!(%start, %end, "saccade end");
        Ok(Saccade {
            timestamp: self.now(),
            start,
            end,
        })
    }

    fn wait_for_fixation_start(&mut self) -> TrackerResult<Detection> {
        let position = self.wait_for_stability()?;
        debug!(%position, "fixation start");
        Ok(Detection {
            timestamp: self.now(),
            position,
        })
    }

    fn wait_for_fixation_end(&mut self) -> TrackerResult<Detection> {
        let start = self.wait_for_fixation_start()?.position;
        self.wait_for_departure(start)?;
        debug!(%start, "fixation end");
        Ok(Detection {
            timestamp: self.now(),
            position: start,
        })
    }

    fn wait_for_blink_start(&mut self) -> TrackerResult<Detection> {
        if !self.blink_available {
            return Ok(self.blink_unavailable());
        }
        let position = self.wait_for_blink_state(true)?;
        Ok(Detection {
            timestamp: self.now(),
            position,
        })
    }

    fn wait_for_blink_end(&mut self) -> TrackerResult<Detection> {
        if !self.blink_available {
            return Ok(self.blink_unavailable());
        }
        self.wait_for_blink_state(true)?;
        let position = self.wait_for_blink_state(false)?;
        Ok(Detection {
            timestamp: self.now(),
            position,
        })
    }
}
