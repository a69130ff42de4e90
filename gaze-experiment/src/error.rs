use gaze_core::TrackerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExperimentError {
    #[error(
        "please connect to the eyetracker using the eyetracker_calibrate plugin before using any other eyetracker plugins"
    )]
    NotConnected,

    #[error("an eye tracker is already connected")]
    AlreadyConnected,

    #[error("host services were already handed to a tracker")]
    HostConsumed,

    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error("invalid item configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExperimentError>;
