use crate::{ExperimentError, Result};
use gaze_core::{EyeTracker, Resolution};
use gaze_timing::Timer;
use gaze_tracker::{Driver, HostServices};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

const CLEANUP_PAUSE: Duration = Duration::from_millis(100);

/// State shared by the items of one experiment run.
///
/// Holds the host services until a calibration item hands them to a driver,
/// the connected driver itself, and the experiment variables.
pub struct ExperimentContext<T: Timer<Timestamp = u64>> {
    resolution: Resolution,
    timer: T,
    host: Option<HostServices<T>>,
    tracker: Option<Driver<T>>,
    vars: BTreeMap<String, String>,
}

impl<T: Timer<Timestamp = u64>> ExperimentContext<T> {
    pub fn new(resolution: Resolution, host: HostServices<T>) -> Self {
        let mut ctx = Self {
            resolution,
            timer: host.timer.clone(),
            host: Some(host),
            tracker: None,
            vars: BTreeMap::new(),
        };
        ctx.set_var("width", resolution.width);
        ctx.set_var("height", resolution.height);
        ctx
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn sleep_ms(&self, ms: u64) {
        self.timer.sleep_ms(ms)
    }

    pub fn set_var(&mut self, name: &str, value: impl ToString) {
        self.vars.insert(name.to_string(), value.to_string());
    }

    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn vars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Stores the current time, in milliseconds, as `time_<item>`.
    pub fn set_item_onset(&mut self, item: &str) -> u64 {
        let ms = self.timer.now() / 1_000_000;
        self.set_var(&format!("time_{item}"), ms);
        ms
    }

    /// Replaces every `[name]` with the variable's value.
    ///
    /// Unknown names and unbalanced brackets are kept as written.
    pub fn eval_text(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(open) = rest.find('[') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find(']') {
                Some(close) => {
                    let name = &after[..close];
                    match self.vars.get(name) {
                        Some(value) => out.push_str(value),
                        None => {
                            out.push('[');
                            out.push_str(name);
                            out.push(']');
                        }
                    }
                    rest = &after[close + 1..];
                }
                None => {
                    out.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }

    pub fn take_host(&mut self) -> Result<HostServices<T>> {
        self.host.take().ok_or(ExperimentError::HostConsumed)
    }

    pub fn has_tracker(&self) -> bool {
        self.tracker.is_some()
    }

    pub fn register_tracker(&mut self, driver: Driver<T>) -> Result<()> {
        if self.tracker.is_some() {
            return Err(ExperimentError::AlreadyConnected);
        }
        info!(kind = %driver.kind(), "tracker registered");
        self.tracker = Some(driver);
        Ok(())
    }

    pub fn tracker(&self) -> Result<&Driver<T>> {
        self.tracker.as_ref().ok_or(ExperimentError::NotConnected)
    }

    pub fn tracker_mut(&mut self) -> Result<&mut Driver<T>> {
        self.tracker.as_mut().ok_or(ExperimentError::NotConnected)
    }

    /// Closes and unregisters the tracker, pausing briefly on either side.
    ///
    /// Returns `false` when no tracker was connected.
    pub fn finish(&mut self) -> Result<bool> {
        let Some(mut tracker) = self.tracker.take() else {
            return Ok(false);
        };
        debug!("starting eyetracker deinitialisation");
        self.timer.sleep(CLEANUP_PAUSE);
        let closed = tracker.close();
        drop(tracker);
        debug!("finished eyetracker deinitialisation");
        self.timer.sleep(CLEANUP_PAUSE);
        closed?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gaze_core::{AbortSignal, TrackerKind};
    use gaze_timing::ManualTimer;
    use gaze_tracker::scripted::{RecordingSynth, ScriptedKeyboard, ScriptedPointer};
    use gaze_tracker::{TrackerSettings, connect};

    fn context(timer: &ManualTimer) -> ExperimentContext<ManualTimer> {
        let host = HostServices::new(
            timer.clone(),
            ScriptedPointer::full(),
            ScriptedKeyboard::default(),
            RecordingSynth::new(),
            AbortSignal::new(),
        );
        ExperimentContext::new(Resolution::new(800, 600), host)
    }

    #[test]
    fn test_eval_text_substitutes_known_vars() {
        let mut ctx = context(&ManualTimer::new());
        ctx.set_var("subject", 7);
        assert_eq!(ctx.eval_text("start [subject] at [width]x[height]"), "start 7 at 800x600");
        assert_eq!(ctx.eval_text("keep [missing] and [open"), "keep [missing] and [open");
        assert_eq!(ctx.eval_text("no vars"), "no vars");
    }

    #[test]
    fn test_item_onset_in_milliseconds() {
        let timer = ManualTimer::starting_at(1_500_000_000);
        let mut ctx = context(&timer);
        assert_eq!(ctx.set_item_onset("wait"), 1500);
        assert_eq!(ctx.var("time_wait"), Some("1500"));
    }

    #[test]
    fn test_host_is_handed_out_once() {
        let mut ctx = context(&ManualTimer::new());
        assert!(ctx.take_host().is_ok());
        assert!(matches!(ctx.take_host(), Err(ExperimentError::HostConsumed)));
    }

    #[test]
    fn test_finish_closes_and_unregisters() {
        let timer = ManualTimer::new();
        let mut ctx = context(&timer);
        assert!(!ctx.finish().unwrap());

        let host = ctx.take_host().unwrap();
        let driver = connect(TrackerKind::SimpleDummy, host, TrackerSettings::default()).unwrap();
        ctx.register_tracker(driver).unwrap();
        assert!(ctx.finish().unwrap());
        assert!(!ctx.has_tracker());
        assert_eq!(timer.total(), Duration::from_millis(200));
        assert!(!ctx.finish().unwrap());
    }

    #[test]
    fn test_tracker_required() {
        let mut ctx = context(&ManualTimer::new());
        assert!(matches!(ctx.tracker_mut(), Err(ExperimentError::NotConnected)));
    }
}
