//! Line-delimited JSON event writer.
//!
//! Every event is flushed as soon as it is written, so a host reading the
//! stream sees it immediately.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Stdout, Write};
use std::path::Path;

use handsoff_common::error::{HandsoffError, HandsoffResult};
use handsoff_pose_model::report::{ReportEvent, ReportRecord};

/// Writes timestamped report events, one JSON object per line.
pub struct EventWriter<W: Write> {
    writer: BufWriter<W>,
    events_written: u64,
}

impl EventWriter<Stdout> {
    /// Writer on standard output.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl EventWriter<File> {
    /// Writer appending to a file, creating parent directories as needed.
    pub fn append_to(path: &Path) -> HandsoffResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(file))
    }
}

impl<W: Write> EventWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: BufWriter::new(inner),
            events_written: 0,
        }
    }

    /// Stamp `event` with the current time and write it as one line.
    pub fn emit(&mut self, event: ReportEvent) -> HandsoffResult<()> {
        self.write_record(&ReportRecord::now(event))
    }

    /// Write an already-stamped record.
    pub fn write_record(&mut self, record: &ReportRecord) -> HandsoffResult<()> {
        let json = serde_json::to_string(record)?;
        writeln!(self.writer, "{json}")
            .map_err(|e| HandsoffError::report(format!("Failed to write event: {e}")))?;
        self.flush()?;
        self.events_written += 1;
        tracing::trace!(event = record.event.name(), "Event written");
        Ok(())
    }

    pub fn flush(&mut self) -> HandsoffResult<()> {
        self.writer
            .flush()
            .map_err(|e| HandsoffError::report(format!("Failed to flush events: {e}")))
    }

    /// Number of events written.
    pub fn events_written(&self) -> u64 {
        self.events_written
    }

    pub fn get_ref(&self) -> &W {
        self.writer.get_ref()
    }
}

impl<W: Write> Drop for EventWriter<W> {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handsoff_pose_model::report::parse_reports;
    use handsoff_pose_model::state::{DetectorState, StatsSnapshot};

    #[test]
    fn test_writes_one_line_per_event() {
        let mut writer = EventWriter::new(Vec::new());
        writer
            .emit(ReportEvent::StateChanged {
                state: DetectorState::Warning,
                stats: StatsSnapshot::default(),
            })
            .unwrap();
        writer
            .emit(ReportEvent::CounterReset { trigger_count: 0 })
            .unwrap();
        assert_eq!(writer.events_written(), 2);

        let text = String::from_utf8(writer.get_ref().clone()).unwrap();
        assert_eq!(text.lines().count(), 2);
        let records = parse_reports(&text).unwrap();
        assert_eq!(records[0].event.name(), "state_changed");
        assert_eq!(records[1].event.name(), "counter_reset");
    }

    #[test]
    fn test_events_are_visible_without_explicit_flush() {
        let mut writer = EventWriter::new(Vec::new());
        writer
            .emit(ReportEvent::CameraPermissionNeeded {
                message: "no camera".into(),
                help: "grant access".into(),
            })
            .unwrap();
        assert!(!writer.get_ref().is_empty());
    }

    #[test]
    fn test_append_to_file_keeps_previous_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("events.jsonl");

        for count in [1, 2] {
            let mut writer = EventWriter::append_to(&path).unwrap();
            writer
                .emit(ReportEvent::CounterReset {
                    trigger_count: count,
                })
                .unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let records = parse_reports(&content).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[1].event,
            ReportEvent::CounterReset { trigger_count: 2 }
        );
    }
}
