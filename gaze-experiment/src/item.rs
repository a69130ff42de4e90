use crate::{ExperimentContext, Result};
use gaze_timing::Timer;
use tracing::debug;

/// One step of an experiment.
///
/// `prepare` runs ahead of time and may fail on missing prerequisites; `run`
/// does the time-critical part.
pub trait Item<T: Timer<Timestamp = u64>> {
    fn name(&self) -> &str;

    fn item_type(&self) -> &'static str;

    fn prepare(&mut self, ctx: &mut ExperimentContext<T>) -> Result<()>;

    fn run(&mut self, ctx: &mut ExperimentContext<T>) -> Result<()>;
}

/// Items prepared one after another and then run in order.
pub struct Sequence<T: Timer<Timestamp = u64>> {
    name: String,
    items: Vec<Box<dyn Item<T>>>,
}

impl<T: Timer<Timestamp = u64>> Sequence<T> {
    pub fn new(name: &str, items: Vec<Box<dyn Item<T>>>) -> Self {
        Self {
            name: name.to_string(),
            items,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Timer<Timestamp = u64>> Item<T> for Sequence<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn item_type(&self) -> &'static str {
        "sequence"
    }

    fn prepare(&mut self, ctx: &mut ExperimentContext<T>) -> Result<()> {
        for item in &mut self.items {
            debug!(item = item.name(), kind = item.item_type(), "prepare");
            item.prepare(ctx)?;
        }
        Ok(())
    }

    fn run(&mut self, ctx: &mut ExperimentContext<T>) -> Result<()> {
        ctx.set_item_onset(&self.name);
        for item in &mut self.items {
            debug!(item = item.name(), kind = item.item_type(), "run");
            item.run(ctx)?;
        }
        Ok(())
    }
}
