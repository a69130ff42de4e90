use crate::config::LogConfig;
use crate::{ExperimentContext, Item, Result};
use gaze_core::EyeTracker;
use gaze_timing::Timer;

/// Writes message lines, and optionally every experiment variable, to the
/// tracker log.
#[derive(Debug, Clone)]
pub struct LogMessage {
    name: String,
    config: LogConfig,
    lines: Vec<String>,
}

impl LogMessage {
    pub fn new(name: &str, config: LogConfig) -> Self {
        Self {
            name: name.to_string(),
            config,
            lines: Vec::new(),
        }
    }
}

impl<T: Timer<Timestamp = u64>> Item<T> for LogMessage {
    fn name(&self) -> &str {
        &self.name
    }

    fn item_type(&self) -> &'static str {
        "eyetracker_log"
    }

    fn prepare(&mut self, ctx: &mut ExperimentContext<T>) -> Result<()> {
        ctx.tracker()?;
        self.lines = self.config.msg.split('\n').map(str::to_owned).collect();
        Ok(())
    }

    fn run(&mut self, ctx: &mut ExperimentContext<T>) -> Result<()> {
        ctx.set_item_onset(&self.name);
        let throttle = self.config.throttle;

        for line in &self.lines {
            let text = ctx.eval_text(line);
            ctx.tracker_mut()?.log(&text);
            ctx.sleep_ms(throttle);
        }

        if self.config.auto_log {
            let vars: Vec<(String, String)> = ctx
                .vars()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect();
            for (var, val) in vars {
                ctx.tracker_mut()?.log(&format!("var {var} {val}"));
                ctx.sleep_ms(throttle);
            }
        }
        Ok(())
    }
}
