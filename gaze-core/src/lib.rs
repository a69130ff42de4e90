pub mod error;
pub mod event;
pub mod host;
pub mod kind;
pub mod position;
pub mod tracker;

pub use error::{TrackerError, TrackerResult};
pub use event::{Detection, EventStamp, GazeEvent, Saccade};
pub use host::{
    AbortSignal, Key, KeyPress, Keyboard, MouseButton, Pointer, PointerCapabilities, Synth, Tone,
};
pub use kind::{TrackerKind, UnknownTracker};
pub use position::{Position, Resolution};
pub use tracker::{CalibrationOptions, EyeTracker, FixTrigger};
