//! Experiment items that drive an eye tracker: connect and calibrate, write
//! log messages, stop recording and wait for gaze events.

pub mod calibrate;
pub mod config;
pub mod context;
pub mod error;
pub mod item;
pub mod log;
pub mod stop_recording;
pub mod wait;

pub use calibrate::Calibrate;
pub use config::{
    CalibrateConfig, ItemKind, ItemSpec, LogConfig, StopRecordingConfig, WaitConfig, load_items,
    parse_items,
};
pub use context::ExperimentContext;
pub use error::{ExperimentError, Result};
pub use item::{Item, Sequence};
pub use log::LogMessage;
pub use stop_recording::StopRecording;
pub use wait::WaitForEvent;
