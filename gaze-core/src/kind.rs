use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown tracker '{0}' (expected eyelink, smi, simple-dummy or extended-dummy)")]
pub struct UnknownTracker(pub String);

/// The closed set of tracker drivers a calibration item can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackerKind {
    #[serde(rename = "EyeLink")]
    EyeLink,
    #[serde(rename = "SMI")]
    Smi,
    /// Accepts every call and returns fixed values.
    #[serde(rename = "simple dummy mode (does nothing)")]
    SimpleDummy,
    /// Uses the mouse to simulate eye movement.
    #[serde(rename = "extended dummy mode (use mouse to simulate eye movement)")]
    ExtendedDummy,
}

impl TrackerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EyeLink => "eyelink",
            Self::Smi => "smi",
            Self::SimpleDummy => "simple-dummy",
            Self::ExtendedDummy => "extended-dummy",
        }
    }

    /// True for drivers that need tracker hardware attached.
    pub fn is_hardware(&self) -> bool {
        matches!(self, Self::EyeLink | Self::Smi)
    }
}

impl FromStr for TrackerKind {
    type Err = UnknownTracker;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eyelink" => Ok(Self::EyeLink),
            "smi" => Ok(Self::Smi),
            "simple-dummy" | "dummy" => Ok(Self::SimpleDummy),
            "extended-dummy" | "mouse" => Ok(Self::ExtendedDummy),
            _ => Err(UnknownTracker(s.to_string())),
        }
    }
}

impl Default for TrackerKind {
    fn default() -> Self {
        TrackerKind::SimpleDummy
    }
}

impl std::fmt::Display for TrackerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        for kind in [
            TrackerKind::EyeLink,
            TrackerKind::Smi,
            TrackerKind::SimpleDummy,
            TrackerKind::ExtendedDummy,
        ] {
            assert_eq!(kind.as_str().parse::<TrackerKind>(), Ok(kind));
        }
        assert_eq!(
            "tobii".parse::<TrackerKind>(),
            Err(UnknownTracker("tobii".to_string()))
        );
    }

    #[test]
    fn test_kind_serde_uses_item_labels() {
        let kind: TrackerKind = serde_json::from_str(
            "\"extended dummy mode (use mouse to simulate eye movement)\"",
        )
        .unwrap();
        assert_eq!(kind, TrackerKind::ExtendedDummy);
        assert_eq!(serde_json::to_string(&TrackerKind::Smi).unwrap(), "\"SMI\"");
    }

    #[test]
    fn test_hardware_kinds() {
        assert!(TrackerKind::EyeLink.is_hardware());
        assert!(TrackerKind::Smi.is_hardware());
        assert!(!TrackerKind::SimpleDummy.is_hardware());
        assert!(!TrackerKind::ExtendedDummy.is_hardware());
    }
}
