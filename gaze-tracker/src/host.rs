use gaze_core::{AbortSignal, Keyboard, Pointer, Synth};
use gaze_timing::Timer;

/// Everything a driver needs from the application that embeds it.
///
/// Handed over once when a driver is connected; the driver owns it until it is
/// dropped.
pub struct HostServices<T: Timer> {
    pub timer: T,
    pub pointer: Box<dyn Pointer + Send>,
    pub keyboard: Box<dyn Keyboard + Send>,
    pub synth: Box<dyn Synth + Send>,
    pub abort: AbortSignal,
}

impl<T: Timer> HostServices<T> {
    pub fn new(
        timer: T,
        pointer: impl Pointer + Send + 'static,
        keyboard: impl Keyboard + Send + 'static,
        synth: impl Synth + Send + 'static,
        abort: AbortSignal,
    ) -> Self {
        Self {
            timer,
            pointer: Box::new(pointer),
            keyboard: Box::new(keyboard),
            synth: Box::new(synth),
            abort,
        }
    }
}

impl<T: Timer + std::fmt::Debug> std::fmt::Debug for HostServices<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostServices")
            .field("timer", &self.timer)
            .field("pointer", &self.pointer.capabilities())
            .field("aborted", &self.abort.is_triggered())
            .finish_non_exhaustive()
    }
}
