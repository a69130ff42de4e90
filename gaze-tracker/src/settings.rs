use gaze_core::{MouseButton, Resolution};
use serde::{Deserialize, Serialize};

/// Construction parameters shared by every driver.
///
/// The saccade thresholds and the drift-correct flag only matter to hardware
/// trackers; the dummies accept them so all drivers are built the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerSettings {
    pub resolution: Resolution,
    pub data_file: String,
    pub fg_color: [u8; 3],
    pub bg_color: [u8; 3],
    pub saccade_velocity_threshold: f64,
    pub saccade_acceleration_threshold: f64,
    pub force_drift_correct: bool,
    /// Button that closes the simulated eyes while held.
    pub blink_button: MouseButton,
}

impl TrackerSettings {
    pub fn for_resolution(resolution: Resolution) -> Self {
        Self {
            resolution,
            ..Self::default()
        }
    }
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            data_file: "default.edf".to_string(),
            fg_color: [255, 255, 255],
            bg_color: [0, 0, 0],
            saccade_velocity_threshold: 35.0,
            saccade_acceleration_threshold: 9500.0,
            force_drift_correct: false,
            blink_button: MouseButton::Right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let settings: TrackerSettings =
            serde_json::from_str(r#"{"resolution": {"width": 800, "height": 600}}"#).unwrap();
        assert_eq!(settings.resolution, Resolution::new(800, 600));
        assert_eq!(settings.saccade_velocity_threshold, 35.0);
        assert_eq!(settings.saccade_acceleration_threshold, 9500.0);
        assert_eq!(settings.blink_button, MouseButton::Right);
        assert_eq!(settings.data_file, "default.edf");
    }
}
