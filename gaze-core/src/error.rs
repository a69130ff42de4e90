use crate::TrackerKind;
use thiserror::Error;

/// Errors surfaced by tracker drivers.
///
/// Waiting operations never fail by themselves, they block until the awaited
/// condition occurs. The only way out of a wait other than success is an
/// external abort.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    #[error("tracker operation aborted")]
    Aborted,

    #[error("tracker '{0}' is not available in this build (no hardware driver)")]
    Unavailable(TrackerKind),
}

pub type TrackerResult<T> = std::result::Result<T, TrackerError>;
