use crate::config::StopRecordingConfig;
use crate::{ExperimentContext, Item, Result};
use gaze_core::EyeTracker;
use gaze_timing::Timer;

#[derive(Debug, Clone)]
pub struct StopRecording {
    name: String,
    config: StopRecordingConfig,
}

impl StopRecording {
    pub fn new(name: &str, config: StopRecordingConfig) -> Self {
        Self {
            name: name.to_string(),
            config,
        }
    }
}

impl<T: Timer<Timestamp = u64>> Item<T> for StopRecording {
    fn name(&self) -> &str {
        &self.name
    }

    fn item_type(&self) -> &'static str {
        "eyetracker_stop_recording"
    }

    fn prepare(&mut self, ctx: &mut ExperimentContext<T>) -> Result<()> {
        ctx.tracker()?;
        Ok(())
    }

    fn run(&mut self, ctx: &mut ExperimentContext<T>) -> Result<()> {
        ctx.set_item_onset(&self.name);
        let msg = ctx.eval_text(&self.config.log_msg);
        let tracker = ctx.tracker_mut()?;
        tracker.status_msg(&msg);
        tracker.log(&msg);
        tracker.stop_recording()?;
        Ok(())
    }
}
