use crate::Position;
use serde::{Deserialize, Serialize};

/// Gaze events a tracker can be asked to wait for.
///
/// The numeric codes are the ones EyeLink uses for its event stream, so scripts
/// written against real hardware keep working against the simulators.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GazeEvent {
    #[serde(rename = "Blink start")]
    BlinkStart = 3,
    #[serde(rename = "Blink end")]
    BlinkEnd = 4,
    #[serde(rename = "Saccade start")]
    SaccadeStart = 5,
    #[serde(rename = "Saccade end")]
    SaccadeEnd = 6,
    #[serde(rename = "Fixation start")]
    FixationStart = 7,
    #[serde(rename = "Fixation end")]
    FixationEnd = 8,
}

impl GazeEvent {
    pub const ALL: [GazeEvent; 6] = [
        GazeEvent::SaccadeStart,
        GazeEvent::SaccadeEnd,
        GazeEvent::FixationStart,
        GazeEvent::FixationEnd,
        GazeEvent::BlinkStart,
        GazeEvent::BlinkEnd,
    ];

    pub fn code(self) -> i32 {
        self as u8 as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            3 => Some(Self::BlinkStart),
            4 => Some(Self::BlinkEnd),
            5 => Some(Self::SaccadeStart),
            6 => Some(Self::SaccadeEnd),
            7 => Some(Self::FixationStart),
            8 => Some(Self::FixationEnd),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::BlinkStart => "Blink start",
            Self::BlinkEnd => "Blink end",
            Self::SaccadeStart => "Saccade start",
            Self::SaccadeEnd => "Saccade end",
            Self::FixationStart => "Fixation start",
            Self::FixationEnd => "Fixation end",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.label() == s)
    }
}

impl Default for GazeEvent {
    fn default() -> Self {
        GazeEvent::SaccadeStart
    }
}

impl std::fmt::Display for GazeEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A detected event with the position that characterises it.
///
/// For saccade start and fixation end this is where the eye *was* when the
/// movement began, not the sample that triggered detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub timestamp: u64,
    pub position: Position,
}

/// End of a saccade, with both endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Saccade {
    pub timestamp: u64,
    pub start: Position,
    pub end: Position,
}

/// Result of a generic `wait_for_event` call.
///
/// Carries no per-event payload. `event` is `None` when the requested code was
/// not recognised and nothing was awaited.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventStamp {
    pub timestamp: u64,
    pub event: Option<GazeEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_roundtrip() {
        for event in GazeEvent::ALL {
            assert_eq!(GazeEvent::from_code(event.code()), Some(event));
        }
        assert_eq!(GazeEvent::from_code(2), None);
        assert_eq!(GazeEvent::from_code(9), None);
        assert_eq!(GazeEvent::SaccadeStart.code(), 5);
        assert_eq!(GazeEvent::BlinkEnd.code(), 4);
    }

    #[test]
    fn labels_match_serde_names() {
        for event in GazeEvent::ALL {
            let json = serde_json::to_string(&event).unwrap();
            assert_eq!(json, format!("\"{}\"", event.label()));
            assert_eq!(GazeEvent::from_label(event.label()), Some(event));
        }
        assert_eq!(GazeEvent::from_label("Microsaccade"), None);
    }
}
