//! Report events for the host UI.
//!
//! Events are written as line-delimited JSON, one object per line, each
//! carrying an `event` tag and an ISO-8601 `timestamp` next to the payload
//! fields.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::state::{DetectorState, StatsSnapshot};

/// Payload of one report line, discriminated by the `event` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReportEvent {
    /// The detector moved to a different state.
    StateChanged {
        state: DetectorState,
        stats: StatsSnapshot,
    },

    /// A dwell-time trigger fired.
    ScratchDetected {
        trigger_count: u64,
        duration: f64,
        distance: Option<f64>,
        /// Saved annotated frame, absent if it could not be written.
        screenshot_path: Option<String>,
        screenshot_dir: String,
    },

    /// Periodic heartbeat.
    StatusUpdate {
        state: DetectorState,
        stats: StatsSnapshot,
        frame_count: u64,
    },

    /// Downsized JPEG of the annotated frame, base64-encoded.
    DebugFrame {
        image_b64: String,
        status: String,
        count: u64,
        duration: f64,
    },

    /// The frame source could not be opened.
    CameraPermissionNeeded { message: String, help: String },

    /// The trigger counter was reset by an external command.
    CounterReset { trigger_count: u64 },
}

impl ReportEvent {
    /// The `event` tag this payload serializes with.
    pub fn name(&self) -> &'static str {
        match self {
            Self::StateChanged { .. } => "state_changed",
            Self::ScratchDetected { .. } => "scratch_detected",
            Self::StatusUpdate { .. } => "status_update",
            Self::DebugFrame { .. } => "debug_frame",
            Self::CameraPermissionNeeded { .. } => "camera_permission_needed",
            Self::CounterReset { .. } => "counter_reset",
        }
    }
}

/// A timestamped report line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    /// Wall-clock emission time (ISO 8601).
    pub timestamp: DateTime<Local>,

    #[serde(flatten)]
    pub event: ReportEvent,
}

impl ReportRecord {
    /// Stamp an event with the current wall-clock time.
    pub fn now(event: ReportEvent) -> Self {
        Self {
            timestamp: Local::now(),
            event,
        }
    }
}

/// Parse report records from JSONL content (one JSON object per line).
pub fn parse_reports(jsonl: &str) -> Result<Vec<ReportRecord>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(serde_json::from_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_changed_wire_format() {
        let record = ReportRecord::now(ReportEvent::StateChanged {
            state: DetectorState::Warning,
            stats: StatsSnapshot {
                state: DetectorState::Warning,
                distance: Some(0.12),
                duration: 0.0,
                trigger_count: 3,
                fps: 29.5,
            },
        });
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["event"], "state_changed");
        assert_eq!(json["state"], "Warning");
        assert_eq!(json["stats"]["trigger_count"], 3);
        assert!(json["timestamp"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn parse_reports_reads_every_line() {
        let a = ReportRecord::now(ReportEvent::CounterReset { trigger_count: 0 });
        let b = ReportRecord::now(ReportEvent::CameraPermissionNeeded {
            message: "camera unavailable".into(),
            help: "grant access and retry".into(),
        });
        let jsonl = format!(
            "{}\n\n{}\n",
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );

        let parsed = parse_reports(&jsonl).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].event, a.event);
        assert_eq!(parsed[1].event.name(), "camera_permission_needed");
    }

    #[test]
    fn name_matches_serialized_tag() {
        let event = ReportEvent::ScratchDetected {
            trigger_count: 1,
            duration: 2.0,
            distance: Some(0.1),
            screenshot_path: None,
            screenshot_dir: "/tmp".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], event.name());
    }
}
