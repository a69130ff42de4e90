//! Services the embedding application provides to tracker drivers.
//!
//! Drivers never talk to a window system directly. They read the pointer,
//! poll the keyboard and play tones through these traits, which keeps the
//! simulators testable with scripted inputs.

use crate::{Position, TrackerError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    /// Index into the `[left, middle, right]` array returned by [`Pointer::pressed`].
    pub fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Middle => 1,
            Self::Right => 2,
        }
    }
}

/// Optional pointer features, negotiated once when a driver is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerCapabilities {
    /// `pressed()` reports real button state.
    pub buttons: bool,
    /// `set_position()` moves the pointer.
    pub warp: bool,
}

impl PointerCapabilities {
    pub const FULL: PointerCapabilities = PointerCapabilities {
        buttons: true,
        warp: true,
    };

    /// Blink simulation needs to read a button and park the pointer off-screen.
    pub fn supports_blink(&self) -> bool {
        self.buttons && self.warp
    }
}

pub trait Pointer {
    fn capabilities(&self) -> PointerCapabilities;

    fn position(&mut self) -> Position;

    /// Button state as `[left, middle, right]`.
    fn pressed(&mut self) -> [bool; 3] {
        [false; 3]
    }

    fn set_position(&mut self, _pos: Position) {}

    fn set_visible(&mut self, visible: bool);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    Space,
    Escape,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub timestamp: u64,
}

pub trait Keyboard {
    /// Waits for one of `keys`. `None` blocks indefinitely, `Some(Duration::ZERO)`
    /// only checks keys already pressed.
    fn poll_key(&mut self, keys: &[Key], timeout: Option<Duration>) -> Option<KeyPress>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub freq_hz: f32,
    pub duration: Duration,
}

impl Tone {
    /// Low beep played when a drift check lands too far from its target.
    pub const ERROR: Tone = Tone {
        freq_hz: 220.0,
        duration: Duration::from_millis(200),
    };
}

pub trait Synth {
    /// Starts playback and returns immediately.
    fn play(&mut self, tone: Tone);
}

/// Shared flag the host raises to break out of blocking tracker calls.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal(Arc<AtomicBool>);

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> Result<(), TrackerError> {
        if self.is_triggered() {
            Err(TrackerError::Aborted)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abort_signal_is_shared_between_clones() {
        let signal = AbortSignal::new();
        let remote = signal.clone();
        assert!(signal.check().is_ok());
        remote.trigger();
        assert_eq!(signal.check(), Err(TrackerError::Aborted));
        signal.reset();
        assert!(!remote.is_triggered());
    }

    #[test]
    fn blink_needs_both_capabilities() {
        assert!(PointerCapabilities::FULL.supports_blink());
        let no_warp = PointerCapabilities {
            buttons: true,
            warp: false,
        };
        assert!(!no_warp.supports_blink());
        assert!(!PointerCapabilities::default().supports_blink());
    }

    #[test]
    fn button_indices() {
        assert_eq!(MouseButton::Left.index(), 0);
        assert_eq!(MouseButton::Right.index(), 2);
    }
}
