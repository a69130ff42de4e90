pub mod timer;

pub use timer::{FrameSummary, FrameTimes, HighPrecisionTimer, ManualTimer, Timer};
