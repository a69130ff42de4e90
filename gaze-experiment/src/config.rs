use crate::Result;
use crate::item::Item;
use crate::{Calibrate, LogMessage, StopRecording, WaitForEvent};
use gaze_core::{GazeEvent, TrackerKind};
use gaze_timing::Timer;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrateConfig {
    pub tracker_type: TrackerKind,
    pub sacc_vel_thresh: f64,
    pub sacc_acc_thresh: f64,
    pub cal_target_size: u32,
    pub cal_beep: bool,
    pub force_drift_correct: bool,
    // SMI link
    pub ip: String,
    pub sendport: u16,
    pub receiveport: u16,
    /// Physical screen size in millimetres.
    pub screen_w: u32,
    pub screen_h: u32,
}

impl Default for CalibrateConfig {
    fn default() -> Self {
        Self {
            tracker_type: TrackerKind::SimpleDummy,
            sacc_vel_thresh: 35.0,
            sacc_acc_thresh: 9500.0,
            cal_target_size: 16,
            cal_beep: true,
            force_drift_correct: false,
            ip: "127.0.0.1".to_string(),
            sendport: 4444,
            receiveport: 5555,
            screen_w: 399,
            screen_h: 299,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// One tracker log line per text line.
    pub msg: String,
    pub auto_log: bool,
    /// Pause after each line, in milliseconds.
    pub throttle: u64,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            msg: String::new(),
            auto_log: false,
            throttle: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StopRecordingConfig {
    pub log_msg: String,
}

impl Default for StopRecordingConfig {
    fn default() -> Self {
        Self {
            log_msg: "stop_trial".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    pub event: GazeEvent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "item_type", rename_all = "snake_case")]
pub enum ItemKind {
    EyetrackerCalibrate(CalibrateConfig),
    EyetrackerLog(LogConfig),
    EyetrackerStopRecording(StopRecordingConfig),
    EyetrackerWait(WaitConfig),
}

/// A named item as it appears in a JSON item list.
///
/// ```json
/// {"name": "wait_fix", "item_type": "eyetracker_wait", "event": "Fixation start"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: ItemKind,
}

impl ItemSpec {
    pub fn new(name: &str, kind: ItemKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
        }
    }

    pub fn build<T: Timer<Timestamp = u64>>(self) -> Box<dyn Item<T>> {
        match self.kind {
            ItemKind::EyetrackerCalibrate(c) => Box::new(Calibrate::new(&self.name, c)),
            ItemKind::EyetrackerLog(c) => Box::new(LogMessage::new(&self.name, c)),
            ItemKind::EyetrackerStopRecording(c) => Box::new(StopRecording::new(&self.name, c)),
            ItemKind::EyetrackerWait(c) => Box::new(WaitForEvent::new(&self.name, c)),
        }
    }
}

pub fn parse_items(json: &str) -> Result<Vec<ItemSpec>> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_items(path: impl AsRef<Path>) -> Result<Vec<ItemSpec>> {
    let text = std::fs::read_to_string(path)?;
    parse_items(&text)
}
