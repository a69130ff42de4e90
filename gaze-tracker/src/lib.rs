//! Tracker drivers: the mouse-driven simulator, the do-nothing dummy and the
//! closed driver registry used by the experiment plugins.

pub mod driver;
pub mod dummy;
pub mod host;
pub mod scripted;
pub mod settings;
pub mod simulator;

pub use driver::{Driver, connect};
pub use dummy::SimpleDummy;
pub use host::HostServices;
pub use settings::TrackerSettings;
pub use simulator::{
    BlinkTracker, DRIFT_TOLERANCE_PX, MESSAGE_HISTORY, MOVEMENT_THRESHOLD_PX, POLL_INTERVAL,
    STABLE_SAMPLES, SimulatedTracker, StabilityWindow,
};
