use super::{DRIFT_TOLERANCE_PX, POLL_INTERVAL, SimulatedTracker};
use gaze_core::{EyeTracker, FixTrigger, Key, Position, Tone, TrackerResult};
use gaze_timing::Timer;
use std::time::Duration;
use tracing::{debug, info};

const ACCEPT_KEYS: [Key; 1] = [Key::Space];
const CANCEL_KEYS: [Key; 2] = [Key::Escape, Key::Char('q')];

impl<T: Timer<Timestamp = u64>> SimulatedTracker<T> {
    /// Hides the pointer before surfacing an abort.
    fn check_abort(&mut self) -> TrackerResult<()> {
        let checked = self.host.abort.check();
        if checked.is_err() {
            self.host.pointer.set_visible(false);
        }
        checked
    }

    /// Waits for the space bar, then judges the gaze sample taken at that press.
    ///
    /// Only the first press counts: a miss beeps and returns `false` rather than
    /// waiting for another attempt.
    pub(super) fn key_triggered_drift(&mut self, target: Position) -> TrackerResult<bool> {
        self.host.pointer.set_visible(true);
        loop {
            self.check_abort()?;
            if self
                .host
                .keyboard
                .poll_key(&ACCEPT_KEYS, Some(POLL_INTERVAL))
                .is_some()
            {
                break;
            }
        }

        let gaze = self.sample();
        let error = gaze.distance(target);
        debug!(%gaze, %target, error, "drift check");
        if error < DRIFT_TOLERANCE_PX {
            self.host.pointer.set_visible(false);
            return Ok(true);
        }

        self.host.synth.play(Tone::ERROR);
        self.host.pointer.set_visible(false);
        Ok(false)
    }

    /// Collects a run of steady samples and accepts once their mean is on target.
    ///
    /// Loops until success; escape or `q` cancels the check and stops recording.
    pub(super) fn fixation_triggered_drift(
        &mut self,
        target: Position,
        trigger: FixTrigger,
    ) -> TrackerResult<bool> {
        let min_samples = trigger.min_samples.max(1);
        self.host.pointer.set_visible(true);
        self.prepare_drift_correction(target);

        let mut collected: Vec<Position> = Vec::with_capacity(min_samples);
        loop {
            self.check_abort()?;

            if self
                .host
                .keyboard
                .poll_key(&CANCEL_KEYS, Some(Duration::ZERO))
                .is_some()
            {
                self.host.pointer.set_visible(false);
                self.recording = false;
                info!("fixation-triggered drift correction cancelled by key press");
                return Ok(false);
            }

            let sample = self.sample();
            match collected.last().copied() {
                None => collected.push(sample),
                Some(prev) if prev == sample => {}
                Some(prev) if prev.deviates(sample, trigger.reset_threshold) => {
                    collected.clear();
                }
                Some(_) => collected.push(sample),
            }

            if collected.len() < min_samples {
                continue;
            }
            let Some(mean) = Position::mean(&collected) else {
                continue;
            };
            let error = mean.distance(target);
            debug!(%mean, %target, error, "fixation drift check");
            if error < trigger.max_dev {
                self.host.pointer.set_visible(false);
                return Ok(true);
            }
            collected.clear();
        }
    }
}
