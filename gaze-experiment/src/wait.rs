use crate::config::WaitConfig;
use crate::{ExperimentContext, Item, Result};
use gaze_core::EyeTracker;
use gaze_timing::Timer;
use tracing::debug;

/// Blocks until the configured gaze event, then records the item onset.
#[derive(Debug, Clone)]
pub struct WaitForEvent {
    name: String,
    config: WaitConfig,
    code: i32,
}

impl WaitForEvent {
    pub fn new(name: &str, config: WaitConfig) -> Self {
        Self {
            name: name.to_string(),
            code: config.event.code(),
            config,
        }
    }

    pub fn code(&self) -> i32 {
        self.code
    }
}

impl<T: Timer<Timestamp = u64>> Item<T> for WaitForEvent {
    fn name(&self) -> &str {
        &self.name
    }

    fn item_type(&self) -> &'static str {
        "eyetracker_wait"
    }

    fn prepare(&mut self, ctx: &mut ExperimentContext<T>) -> Result<()> {
        ctx.tracker()?;
        self.code = self.config.event.code();
        Ok(())
    }

    fn run(&mut self, ctx: &mut ExperimentContext<T>) -> Result<()> {
        let stamp = ctx.tracker_mut()?.wait_for_event(self.code)?;
        debug!(event = ?stamp.event, timestamp = stamp.timestamp, "gaze event");
        ctx.set_item_onset(&self.name);
        Ok(())
    }
}
