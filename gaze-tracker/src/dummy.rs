use gaze_core::{
    CalibrationOptions, Detection, EventStamp, EyeTracker, FixTrigger, GazeEvent, Position,
    Saccade, TrackerKind, TrackerResult,
};
use gaze_timing::Timer;
use std::time::Duration;
use tracing::{debug, trace};

const EVENT_DELAY: Duration = Duration::from_millis(100);
const DRIFT_DELAY: Duration = Duration::from_millis(200);

/// Driver that keeps an experiment running without any tracker attached.
///
/// Waits pause briefly and report the origin; drift checks always pass.
#[derive(Debug, Clone)]
pub struct SimpleDummy<T: Timer<Timestamp = u64>> {
    timer: T,
    recording: bool,
}

impl<T: Timer<Timestamp = u64>> SimpleDummy<T> {
    pub fn new(timer: T) -> Self {
        debug!("simple dummy tracker ready");
        Self {
            timer,
            recording: false,
        }
    }

    fn fixed_detection(&self) -> Detection {
        self.timer.sleep(EVENT_DELAY);
        Detection {
            timestamp: self.timer.now(),
            position: Position::ORIGIN,
        }
    }
}

impl<T: Timer<Timestamp = u64>> EyeTracker for SimpleDummy<T> {
    fn kind(&self) -> TrackerKind {
        TrackerKind::SimpleDummy
    }

    fn now(&self) -> u64 {
        self.timer.now()
    }

    fn connected(&self) -> bool {
        true
    }

    fn is_recording(&self) -> bool {
        self.recording
    }

    fn send_command(&mut self, cmd: &str) {
        trace!(%cmd, "send_command ignored");
    }

    fn log(&mut self, msg: &str) {
        trace!(%msg, "log ignored");
    }

    fn log_var(&mut self, var: &str, val: &str) {
        trace!(%var, %val, "log_var ignored");
    }

    fn status_msg(&mut self, msg: &str) {
        trace!(%msg, "status_msg ignored");
    }

    fn calibrate(&mut self, _options: CalibrationOptions) -> TrackerResult<()> {
        Ok(())
    }

    fn drift_correction(
        &mut self,
        _target: Option<Position>,
        _fix_triggered: bool,
    ) -> TrackerResult<bool> {
        self.timer.sleep(DRIFT_DELAY);
        Ok(true)
    }

    fn fix_triggered_drift_correction(
        &mut self,
        _target: Option<Position>,
        _trigger: FixTrigger,
    ) -> TrackerResult<bool> {
        self.timer.sleep(DRIFT_DELAY);
        Ok(true)
    }

    fn start_recording(&mut self) -> TrackerResult<()> {
        self.recording = true;
        Ok(())
    }

    fn stop_recording(&mut self) -> TrackerResult<()> {
        self.recording = false;
        Ok(())
    }

    fn close(&mut self) -> TrackerResult<()> {
        self.recording = false;
        Ok(())
    }

    fn sample(&mut self) -> Position {
        Position::ORIGIN
    }

    fn wait_for_saccade_start(&mut self) -> TrackerResult<Detection> {
        Ok(self.fixed_detection())
    }

    fn wait_for_saccade_end(&mut self) -> TrackerResult<Saccade> {
        let Detection { timestamp, .. } = self.fixed_detection();
        Ok(Saccade {
            timestamp,
            start: Position::ORIGIN,
            end: Position::ORIGIN,
        })
    }

    fn wait_for_fixation_start(&mut self) -> TrackerResult<Detection> {
        Ok(self.fixed_detection())
    }

    fn wait_for_fixation_end(&mut self) -> TrackerResult<Detection> {
        Ok(self.fixed_detection())
    }

    fn wait_for_blink_start(&mut self) -> TrackerResult<Detection> {
        Ok(self.fixed_detection())
    }

    fn wait_for_blink_end(&mut self) -> TrackerResult<Detection> {
        Ok(self.fixed_detection())
    }

    /// Returns at once; the dummy has no event stream to wait on.
    fn wait_for_event(&mut self, code: i32) -> TrackerResult<EventStamp> {
        Ok(EventStamp {
            timestamp: self.timer.now(),
            event: GazeEvent::from_code(code),
        })
    }
}
