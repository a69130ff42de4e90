use crate::{HostServices, SimpleDummy, SimulatedTracker, TrackerSettings};
use gaze_core::{
    CalibrationOptions, Detection, EventStamp, EyeTracker, FixTrigger, Position, Saccade,
    TrackerError, TrackerKind, TrackerResult,
};
use gaze_timing::Timer;
use tracing::{info, warn};

/// Every driver this build can construct.
pub enum Driver<T: Timer<Timestamp = u64>> {
    SimpleDummy(SimpleDummy<T>),
    Simulated(SimulatedTracker<T>),
}

/// Builds the driver for `kind`, handing it the host services.
///
/// Hardware kinds have no protocol implementation here and yield
/// [`TrackerError::Unavailable`].
pub fn connect<T: Timer<Timestamp = u64>>(
    kind: TrackerKind,
    host: HostServices<T>,
    settings: TrackerSettings,
) -> TrackerResult<Driver<T>> {
    info!(%kind, "connecting tracker");
    match kind {
        TrackerKind::SimpleDummy => Ok(Driver::SimpleDummy(SimpleDummy::new(host.timer))),
        TrackerKind::ExtendedDummy => Ok(Driver::Simulated(SimulatedTracker::new(host, settings))),
        TrackerKind::EyeLink | TrackerKind::Smi => {
            warn!(%kind, "no driver for hardware tracker");
            Err(TrackerError::Unavailable(kind))
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $tracker:ident => $body:expr) => {
        match $self {
            Driver::SimpleDummy($tracker) => $body,
            Driver::Simulated($tracker) => $body,
        }
    };
}

impl<T: Timer<Timestamp = u64>> Driver<T> {
    pub fn as_simulated(&self) -> Option<&SimulatedTracker<T>> {
        match self {
            Driver::Simulated(sim) => Some(sim),
            Driver::SimpleDummy(_) => None,
        }
    }
}

impl<T: Timer<Timestamp = u64>> std::fmt::Debug for Driver<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Driver").field(&self.kind()).finish()
    }
}

impl<T: Timer<Timestamp = u64>> EyeTracker for Driver<T> {
    fn kind(&self) -> TrackerKind {
        dispatch!(self, t => t.kind())
    }

    fn now(&self) -> u64 {
        dispatch!(self, t => t.now())
    }

    fn connected(&self) -> bool {
        dispatch!(self, t => t.connected())
    }

    fn is_recording(&self) -> bool {
        dispatch!(self, t => t.is_recording())
    }

    fn send_command(&mut self, cmd: &str) {
        dispatch!(self, t => t.send_command(cmd))
    }

    fn log(&mut self, msg: &str) {
        dispatch!(self, t => t.log(msg))
    }

    fn log_var(&mut self, var: &str, val: &str) {
        dispatch!(self, t => t.log_var(var, val))
    }

    fn status_msg(&mut self, msg: &str) {
        dispatch!(self, t => t.status_msg(msg))
    }

    fn calibrate(&mut self, options: CalibrationOptions) -> TrackerResult<()> {
        dispatch!(self, t => t.calibrate(options))
    }

    fn clock_offset(&self) -> i64 {
        dispatch!(self, t => t.clock_offset())
    }

    fn prepare_drift_correction(&mut self, target: Position) {
        dispatch!(self, t => t.prepare_drift_correction(target))
    }

    fn drift_correction(
        &mut self,
        target: Option<Position>,
        fix_triggered: bool,
    ) -> TrackerResult<bool> {
        dispatch!(self, t => t.drift_correction(target, fix_triggered))
    }

    fn fix_triggered_drift_correction(
        &mut self,
        target: Option<Position>,
        trigger: FixTrigger,
    ) -> TrackerResult<bool> {
        dispatch!(self, t => t.fix_triggered_drift_correction(target, trigger))
    }

    fn start_recording(&mut self) -> TrackerResult<()> {
        dispatch!(self, t => t.start_recording())
    }

    fn stop_recording(&mut self) -> TrackerResult<()> {
        dispatch!(self, t => t.stop_recording())
    }

    fn close(&mut self) -> TrackerResult<()> {
        dispatch!(self, t => t.close())
    }

    fn sample(&mut self) -> Position {
        dispatch!(self, t => t.sample())
    }

    fn pupil_size(&mut self) -> f64 {
        dispatch!(self, t => t.pupil_size())
    }

    fn wait_for_saccade_start(&mut self) -> TrackerResult<Detection> {
        dispatch!(self, t => t.wait_for_saccade_start())
    }

    fn wait_for_saccade_end(&mut self) -> TrackerResult<Saccade> {
        dispatch!(self, t => t.wait_for_saccade_end())
    }

    fn wait_for_fixation_start(&mut self) -> TrackerResult<Detection> {
        dispatch!(self, t => t.wait_for_fixation_start())
    }

    fn wait_for_fixation_end(&mut self) -> TrackerResult<Detection> {
        dispatch!(self, t => t.wait_for_fixation_end())
    }

    fn wait_for_blink_start(&mut self) -> TrackerResult<Detection> {
        dispatch!(self, t => t.wait_for_blink_start())
    }

    fn wait_for_blink_end(&mut self) -> TrackerResult<Detection> {
        dispatch!(self, t => t.wait_for_blink_end())
    }

    fn wait_for_event(&mut self, code: i32) -> TrackerResult<EventStamp> {
        dispatch!(self, t => t.wait_for_event(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::{RecordingSynth, ScriptedKeyboard, ScriptedPointer};
    use gaze_core::AbortSignal;
    use gaze_timing::ManualTimer;

    fn host() -> HostServices<ManualTimer> {
        HostServices::new(
            ManualTimer::new(),
            ScriptedPointer::full(),
            ScriptedKeyboard::default(),
            RecordingSynth::new(),
            AbortSignal::new(),
        )
    }

    #[test]
    fn test_hardware_kinds_are_unavailable() {
        for kind in [TrackerKind::EyeLink, TrackerKind::Smi] {
            let err = connect(kind, host(), TrackerSettings::default()).unwrap_err();
            assert_eq!(err, TrackerError::Unavailable(kind));
        }
    }

    #[test]
    fn test_dummy_kinds_connect() {
        for kind in [TrackerKind::SimpleDummy, TrackerKind::ExtendedDummy] {
            let driver = connect(kind, host(), TrackerSettings::default()).unwrap();
            assert_eq!(driver.kind(), kind);
            assert!(driver.connected());
        }
    }

    #[test]
    fn test_only_extended_dummy_is_simulated() {
        let simple = connect(TrackerKind::SimpleDummy, host(), TrackerSettings::default()).unwrap();
        assert!(simple.as_simulated().is_none());
        let sim = connect(TrackerKind::ExtendedDummy, host(), TrackerSettings::default()).unwrap();
        assert!(sim.as_simulated().is_some_and(|s| s.blink_available()));
    }
}
