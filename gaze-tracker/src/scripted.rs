//! Host services that replay prepared input, for tests and headless runs.
//!
//! Each handle is cheaply cloneable and shares its state, so a caller can keep
//! one clone for inspection after moving another into [`HostServices`].
//!
//! [`HostServices`]: crate::HostServices

use gaze_core::{
    AbortSignal, Key, KeyPress, Keyboard, MouseButton, Pointer, PointerCapabilities, Position,
    Synth, Tone,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// One step of pointer input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerFrame {
    /// New pointer position; `None` leaves it where it is (including warps).
    pub position: Option<Position>,
    pub pressed: [bool; 3],
}

impl PointerFrame {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            position: Some(Position::new(x, y)),
            pressed: [false; 3],
        }
    }

    /// Keeps the current position with all buttons up.
    pub fn hold() -> Self {
        Self {
            position: None,
            pressed: [false; 3],
        }
    }

    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.pressed[button.index()] = true;
        self
    }
}

#[derive(Debug)]
struct PointerScript {
    frames: VecDeque<PointerFrame>,
    capabilities: PointerCapabilities,
    current: Position,
    pressed: [bool; 3],
    visible: bool,
    visibility_changes: Vec<bool>,
    warps: Vec<Position>,
    abort_when_exhausted: Option<AbortSignal>,
}

impl PointerScript {
    fn advance(&mut self) {
        match self.frames.pop_front() {
            Some(frame) => {
                if let Some(pos) = frame.position {
                    self.current = pos;
                }
                self.pressed = frame.pressed;
            }
            None => {
                if let Some(abort) = &self.abort_when_exhausted {
                    abort.trigger();
                }
            }
        }
    }
}

/// Pointer that steps through a list of frames, one frame per gaze sample.
///
/// With button support the script advances when buttons are read, otherwise
/// when the position is read. Either way a single `sample()` of the simulator
/// consumes exactly one frame.
#[derive(Debug, Clone)]
pub struct ScriptedPointer {
    inner: Arc<Mutex<PointerScript>>,
}

impl ScriptedPointer {
    pub fn new(capabilities: PointerCapabilities, start: Position) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PointerScript {
                frames: VecDeque::new(),
                capabilities,
                current: start,
                pressed: [false; 3],
                visible: false,
                visibility_changes: Vec::new(),
                warps: Vec::new(),
                abort_when_exhausted: None,
            })),
        }
    }

    /// Pointer with buttons and warping, starting at the origin.
    pub fn full() -> Self {
        Self::new(PointerCapabilities::FULL, Position::ORIGIN)
    }

    /// Pointer that can only report its position.
    pub fn position_only() -> Self {
        Self::new(PointerCapabilities::default(), Position::ORIGIN)
    }

    /// Raise `abort` once the script runs out, so blocked loops terminate.
    pub fn abort_when_exhausted(self, abort: &AbortSignal) -> Self {
        self.inner.lock().abort_when_exhausted = Some(abort.clone());
        self
    }

    pub fn push(&self, frame: PointerFrame) {
        self.inner.lock().frames.push_back(frame);
    }

    pub fn extend(&self, frames: impl IntoIterator<Item = PointerFrame>) {
        self.inner.lock().frames.extend(frames);
    }

    /// Queues plain moves to each point with buttons up.
    pub fn moves(&self, points: impl IntoIterator<Item = (f64, f64)>) {
        self.extend(points.into_iter().map(|(x, y)| PointerFrame::at(x, y)));
    }

    pub fn remaining(&self) -> usize {
        self.inner.lock().frames.len()
    }

    pub fn current(&self) -> Position {
        self.inner.lock().current
    }

    pub fn is_visible(&self) -> bool {
        self.inner.lock().visible
    }

    pub fn visibility_changes(&self) -> Vec<bool> {
        self.inner.lock().visibility_changes.clone()
    }

    pub fn warps(&self) -> Vec<Position> {
        self.inner.lock().warps.clone()
    }
}

impl Pointer for ScriptedPointer {
    fn capabilities(&self) -> PointerCapabilities {
        self.inner.lock().capabilities
    }

    fn position(&mut self) -> Position {
        let mut script = self.inner.lock();
        if !script.capabilities.buttons {
            script.advance();
        }
        script.current
    }

    fn pressed(&mut self) -> [bool; 3] {
        let mut script = self.inner.lock();
        if !script.capabilities.buttons {
            return [false; 3];
        }
        script.advance();
        script.pressed
    }

    fn set_position(&mut self, pos: Position) {
        let mut script = self.inner.lock();
        if script.capabilities.warp {
            script.current = pos;
            script.warps.push(pos);
        }
    }

    fn set_visible(&mut self, visible: bool) {
        let mut script = self.inner.lock();
        script.visible = visible;
        script.visibility_changes.push(visible);
    }
}

#[derive(Debug, Default)]
struct KeyScript {
    polls: VecDeque<Option<Key>>,
    polled: u64,
    abort_when_exhausted: Option<AbortSignal>,
}

/// Keyboard that answers successive polls from a list.
///
/// Each poll consumes one entry: `Some(key)` is a press (ignored when the key is
/// not in the requested set), `None` means nothing was pressed. Press timestamps
/// are the poll count.
#[derive(Debug, Clone, Default)]
pub struct ScriptedKeyboard {
    inner: Arc<Mutex<KeyScript>>,
}

impl ScriptedKeyboard {
    pub fn new(polls: impl IntoIterator<Item = Option<Key>>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(KeyScript {
                polls: polls.into_iter().collect(),
                ..KeyScript::default()
            })),
        }
    }

    pub fn abort_when_exhausted(self, abort: &AbortSignal) -> Self {
        self.inner.lock().abort_when_exhausted = Some(abort.clone());
        self
    }

    pub fn push(&self, poll: Option<Key>) {
        self.inner.lock().polls.push_back(poll);
    }

    pub fn polls(&self) -> u64 {
        self.inner.lock().polled
    }

    pub fn remaining(&self) -> usize {
        self.inner.lock().polls.len()
    }
}

impl Keyboard for ScriptedKeyboard {
    fn poll_key(&mut self, keys: &[Key], _timeout: Option<Duration>) -> Option<KeyPress> {
        let mut script = self.inner.lock();
        script.polled += 1;
        match script.polls.pop_front() {
            Some(Some(key)) if keys.contains(&key) => Some(KeyPress {
                key,
                timestamp: script.polled,
            }),
            Some(_) => None,
            None => {
                if let Some(abort) = &script.abort_when_exhausted {
                    abort.trigger();
                }
                None
            }
        }
    }
}

/// Synth that records every tone instead of playing it.
#[derive(Debug, Clone, Default)]
pub struct RecordingSynth {
    played: Arc<Mutex<Vec<Tone>>>,
}

impl RecordingSynth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> Vec<Tone> {
        self.played.lock().clone()
    }
}

impl Synth for RecordingSynth {
    fn play(&mut self, tone: Tone) {
        self.played.lock().push(tone);
    }
}
