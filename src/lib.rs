//! Eye-tracker experiment items with mouse-driven tracker simulation.
//!
//! The pieces live in separate crates; this one re-exports them under one
//! name for embedders.

pub use gaze_core;
pub use gaze_experiment;
pub use gaze_render;
pub use gaze_timing;
pub use gaze_tracker;

pub use gaze_core::{EyeTracker, GazeEvent, Position, Resolution, TrackerError, TrackerKind};
pub use gaze_experiment::{ExperimentContext, ExperimentError, Item, ItemSpec, Sequence};
pub use gaze_tracker::{Driver, HostServices, connect};
