//! Detector state and the per-frame stats snapshot.

use serde::{Deserialize, Serialize};

/// Behavioral state of the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DetectorState {
    /// Hand not near the head.
    #[default]
    Normal,
    /// Hand near the head, dwell time not yet reached.
    Warning,
    /// Dwell time reached; a trigger fired.
    Detected,
}

impl DetectorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Warning => "Warning",
            Self::Detected => "Detected",
        }
    }

    /// Lower-case label used by the debug frame stream.
    pub fn as_status(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Warning => "warning",
            Self::Detected => "detected",
        }
    }
}

impl std::fmt::Display for DetectorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A change of [`DetectorState`] between two consecutive frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    pub from: DetectorState,
    pub to: DetectorState,
}

/// Read-only summary of the detector after one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub state: DetectorState,
    /// Smoothed proximity signal, absent when no person was detected.
    pub distance: Option<f64>,
    /// Seconds of the current proximity session.
    pub duration: f64,
    pub trigger_count: u64,
    pub fps: f64,
}

impl Default for StatsSnapshot {
    fn default() -> Self {
        Self {
            state: DetectorState::Normal,
            distance: None,
            duration: 0.0,
            trigger_count: 0,
            fps: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_serializes_with_capitalized_names() {
        assert_eq!(
            serde_json::to_string(&DetectorState::Warning).unwrap(),
            "\"Warning\""
        );
        assert_eq!(DetectorState::Detected.as_status(), "detected");
    }

    #[test]
    fn snapshot_serializes_missing_distance_as_null() {
        let json = serde_json::to_value(StatsSnapshot::default()).unwrap();
        assert!(json["distance"].is_null());
        assert_eq!(json["state"], "Normal");
        assert_eq!(json["trigger_count"], 0);
    }
}
