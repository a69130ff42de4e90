//! Host services backed by the application window.
//!
//! Input arrives on the event-loop thread and is shared with the session
//! thread through [`PointerState`] and a key channel. Cursor changes requested
//! by a driver travel back to the event loop as [`SessionEvent`]s.

use gaze_core::{
    Key, KeyPress, Keyboard, MouseButton, Pointer, PointerCapabilities, Position, Synth, Tone,
};
use parking_lot::Mutex;
use rodio::source::{SineWave, Source};
use rodio::{OutputStream, Sink};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::warn;
use winit::event_loop::EventLoopProxy;

/// Messages from the session thread to the event loop.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    WarpCursor(Position),
    CursorVisible(bool),
    Finished(Result<(), String>),
}

#[derive(Debug, Clone, Default)]
pub struct PointerState {
    pub position: Position,
    pub pressed: [bool; 3],
}

impl PointerState {
    pub fn set_button(&mut self, button: MouseButton, down: bool) {
        self.pressed[button.index()] = down;
    }
}

/// The mouse, read from the latest window events.
pub struct WindowPointer {
    state: Arc<Mutex<PointerState>>,
    proxy: EventLoopProxy<SessionEvent>,
}

impl WindowPointer {
    pub fn new(state: Arc<Mutex<PointerState>>, proxy: EventLoopProxy<SessionEvent>) -> Self {
        Self { state, proxy }
    }

    fn send(&self, event: SessionEvent) {
        if self.proxy.send_event(event).is_err() {
            warn!("event loop closed; cursor request dropped");
        }
    }
}

impl Pointer for WindowPointer {
    fn capabilities(&self) -> PointerCapabilities {
        PointerCapabilities::FULL
    }

    fn position(&mut self) -> Position {
        self.state.lock().position
    }

    fn pressed(&mut self) -> [bool; 3] {
        self.state.lock().pressed
    }

    fn set_position(&mut self, pos: Position) {
        self.state.lock().position = pos;
        self.send(SessionEvent::WarpCursor(pos));
    }

    fn set_visible(&mut self, visible: bool) {
        self.send(SessionEvent::CursorVisible(visible));
    }
}

/// Key presses forwarded by the event loop.
pub struct ChannelKeyboard {
    rx: Receiver<KeyPress>,
}

impl ChannelKeyboard {
    pub fn new(rx: Receiver<KeyPress>) -> Self {
        Self { rx }
    }
}

impl Keyboard for ChannelKeyboard {
    fn poll_key(&mut self, keys: &[Key], timeout: Option<Duration>) -> Option<KeyPress> {
        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            let received = match deadline {
                Some(deadline) => {
                    let left = deadline.saturating_duration_since(Instant::now());
                    match self.rx.recv_timeout(left) {
                        Ok(press) => Some(press),
                        Err(RecvTimeoutError::Timeout) => return None,
                        Err(RecvTimeoutError::Disconnected) => return None,
                    }
                }
                None => self.rx.recv().ok(),
            };
            match received {
                Some(press) if keys.contains(&press.key) => return Some(press),
                Some(_) => continue,
                None => return None,
            }
        }
    }
}

/// Plays sine tones on the default audio output.
#[derive(Debug, Clone)]
pub struct ToneSynth {
    volume: f32,
}

impl ToneSynth {
    pub fn new(volume: f32) -> Self {
        Self {
            volume: volume.clamp(0.0, 1.0),
        }
    }
}

impl Synth for ToneSynth {
    fn play(&mut self, tone: Tone) {
        let volume = self.volume;
        thread::spawn(move || {
            // the stream is not Send on every platform, so it lives on this thread
            let (_stream, handle) = match OutputStream::try_default() {
                Ok(v) => v,
                Err(e) => {
                    warn!(error = %e, "no audio output; tone skipped");
                    return;
                }
            };
            let sink = match Sink::try_new(&handle) {
                Ok(s) => s,
                Err(e) => {
                    warn!(error = %e, "failed to create audio sink");
                    return;
                }
            };
            sink.set_volume(volume);
            sink.append(SineWave::new(tone.freq_hz).take_duration(tone.duration));
            sink.sleep_until_end();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_keyboard_skips_unrequested_keys() {
        let (tx, rx) = mpsc::channel();
        let mut keyboard = ChannelKeyboard::new(rx);
        tx.send(KeyPress { key: Key::Char('x'), timestamp: 1 }).unwrap();
        tx.send(KeyPress { key: Key::Space, timestamp: 2 }).unwrap();

        let press = keyboard.poll_key(&[Key::Space], Some(Duration::from_millis(50)));
        assert_eq!(press, Some(KeyPress { key: Key::Space, timestamp: 2 }));
    }

    #[test]
    fn test_keyboard_times_out() {
        let (_tx, rx) = mpsc::channel();
        let mut keyboard = ChannelKeyboard::new(rx);
        assert_eq!(keyboard.poll_key(&[Key::Space], Some(Duration::ZERO)), None);
    }

    #[test]
    fn test_pointer_state_buttons() {
        let mut state = PointerState::default();
        state.set_button(MouseButton::Right, true);
        assert_eq!(state.pressed, [false, false, true]);
        state.set_button(MouseButton::Right, false);
        assert_eq!(state.pressed, [false; 3]);
    }
}
