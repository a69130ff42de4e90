use crate::{Detection, EventStamp, GazeEvent, Position, Saccade, TrackerKind, TrackerResult};

/// Options forwarded to a driver's calibration routine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationOptions {
    /// Beep when the calibration target jumps.
    pub beep: bool,
    /// Target diameter in pixels.
    pub target_size: u32,
}

impl Default for CalibrationOptions {
    fn default() -> Self {
        Self {
            beep: true,
            target_size: 16,
        }
    }
}

/// Parameters of a fixation-triggered drift check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixTrigger {
    /// Consecutive stable samples required before the mean is evaluated.
    pub min_samples: usize,
    /// Maximum distance between the mean and the target, in pixels.
    pub max_dev: f64,
    /// Per-axis jump between consecutive samples that restarts collection.
    pub reset_threshold: f64,
}

impl Default for FixTrigger {
    fn default() -> Self {
        Self {
            min_samples: 30,
            max_dev: 60.0,
            reset_threshold: 10.0,
        }
    }
}

/// Capability interface every tracker driver implements.
///
/// All `wait_for_*` methods and the drift checks block the calling thread until
/// the condition occurs. They only return an error when the host aborts.
pub trait EyeTracker {
    fn kind(&self) -> TrackerKind;

    /// Current time on the host clock, in nanoseconds.
    fn now(&self) -> u64;

    fn connected(&self) -> bool;

    fn is_recording(&self) -> bool;

    fn send_command(&mut self, cmd: &str);

    fn log(&mut self, msg: &str);

    fn log_var(&mut self, var: &str, val: &str);

    fn status_msg(&mut self, msg: &str);

    fn calibrate(&mut self, options: CalibrationOptions) -> TrackerResult<()>;

    /// Offset between the tracker clock and the host clock, in nanoseconds.
    fn clock_offset(&self) -> i64 {
        0
    }

    fn prepare_drift_correction(&mut self, _target: Position) {}

    fn drift_correction(
        &mut self,
        target: Option<Position>,
        fix_triggered: bool,
    ) -> TrackerResult<bool>;

    fn fix_triggered_drift_correction(
        &mut self,
        target: Option<Position>,
        trigger: FixTrigger,
    ) -> TrackerResult<bool>;

    fn start_recording(&mut self) -> TrackerResult<()>;

    fn stop_recording(&mut self) -> TrackerResult<()>;

    fn close(&mut self) -> TrackerResult<()>;

    /// Latest gaze position.
    fn sample(&mut self) -> Position;

    fn pupil_size(&mut self) -> f64 {
        0.0
    }

    fn wait_for_saccade_start(&mut self) -> TrackerResult<Detection>;

    fn wait_for_saccade_end(&mut self) -> TrackerResult<Saccade>;

    fn wait_for_fixation_start(&mut self) -> TrackerResult<Detection>;

    fn wait_for_fixation_end(&mut self) -> TrackerResult<Detection>;

    fn wait_for_blink_start(&mut self) -> TrackerResult<Detection>;

    fn wait_for_blink_end(&mut self) -> TrackerResult<Detection>;

    /// Waits for the event with the given numeric code and returns only the time.
    ///
    /// Unrecognised codes are passed through: nothing is awaited and the
    /// returned stamp has `event: None`.
    fn wait_for_event(&mut self, code: i32) -> TrackerResult<EventStamp> {
        let event = GazeEvent::from_code(code);
        match event {
            Some(GazeEvent::SaccadeStart) => {
                let _ = self.wait_for_saccade_start()?;
            }
            Some(GazeEvent::SaccadeEnd) => {
                let _ = self.wait_for_saccade_end()?;
            }
            Some(GazeEvent::FixationStart) => {
                let _ = self.wait_for_fixation_start()?;
            }
            Some(GazeEvent::FixationEnd) => {
                let _ = self.wait_for_fixation_end()?;
            }
            Some(GazeEvent::BlinkStart) => {
                let _ = self.wait_for_blink_start()?;
            }
            Some(GazeEvent::BlinkEnd) => {
                let _ = self.wait_for_blink_end()?;
            }
            None => {}
        }
        Ok(EventStamp {
            timestamp: self.now(),
            event,
        })
    }
}
