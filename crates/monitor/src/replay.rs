//! JSONL landmark replay.
//!
//! Stands in for the capture device and pose model. Each non-empty line that
//! does not start with `#` is either a frame:
//!
//! ```json
//! {"t": 1.2, "landmarks": [[0.5, 0.32, 0.98], ...], "frame": "frames/0012.png"}
//! ```
//!
//! where `landmarks` is `null` when nobody is in view and `frame` is an
//! optional image path (relative paths resolve against the replay file), or
//! a command:
//!
//! ```json
//! {"command": "reset"}
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use handsoff_common::error::{HandsoffError, HandsoffResult};
use handsoff_pose_model::landmarks::Landmarks;
use handsoff_pose_model::source::{LandmarkSource, SourceFrame, SourceItem};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ReplayCommand {
    Reset,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReplayLine {
    Command {
        command: ReplayCommand,
    },
    Frame {
        t: f64,
        #[serde(default)]
        landmarks: Option<Landmarks>,
        #[serde(default)]
        frame: Option<PathBuf>,
    },
}

/// A [`LandmarkSource`] reading replay lines from any buffered reader.
pub struct ReplaySource<R: BufRead> {
    name: String,
    lines: Lines<R>,
    base_dir: Option<PathBuf>,
    line_no: usize,
    last_timestamp: f64,
    released: bool,
}

impl ReplaySource<BufReader<File>> {
    /// Open a replay file. A missing or unreadable file means the source is
    /// unavailable.
    pub fn open(path: &Path) -> HandsoffResult<Self> {
        let file = File::open(path).map_err(|e| {
            HandsoffError::source_unavailable(format!("cannot open {}: {e}", path.display()))
        })?;
        let mut source = Self::new(BufReader::new(file), path.display().to_string());
        source.base_dir = path.parent().map(Path::to_path_buf);
        Ok(source)
    }
}

impl ReplaySource<std::io::StdinLock<'static>> {
    pub fn stdin() -> Self {
        Self::new(std::io::stdin().lock(), "stdin")
    }
}

impl<R: BufRead> ReplaySource<R> {
    pub fn new(reader: R, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lines: reader.lines(),
            base_dir: None,
            line_no: 0,
            last_timestamp: f64::NEG_INFINITY,
            released: false,
        }
    }

    /// Resolve relative `frame` paths against `dir`.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    fn parse(&mut self, line: &str) -> HandsoffResult<SourceItem> {
        let parsed: ReplayLine = serde_json::from_str(line).map_err(|e| {
            HandsoffError::frame_read(format!("{} line {}: {e}", self.name, self.line_no))
        })?;

        match parsed {
            ReplayLine::Command {
                command: ReplayCommand::Reset,
            } => Ok(SourceItem::ResetCounter),
            ReplayLine::Frame {
                t,
                landmarks,
                frame,
            } => {
                if !t.is_finite() || t < self.last_timestamp {
                    return Err(HandsoffError::frame_read(format!(
                        "{} line {}: timestamp {t} goes backwards",
                        self.name, self.line_no
                    )));
                }
                self.last_timestamp = t;

                let image = frame.map(|path| self.load_frame(&path)).transpose()?;
                Ok(SourceItem::Frame(SourceFrame {
                    timestamp_secs: t,
                    image,
                    landmarks,
                }))
            }
        }
    }

    fn load_frame(&self, path: &Path) -> HandsoffResult<image::RgbImage> {
        let resolved = match &self.base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        };
        let image = image::open(&resolved).map_err(|e| {
            HandsoffError::frame_read(format!("cannot read frame {}: {e}", resolved.display()))
        })?;
        Ok(image.to_rgb8())
    }
}

impl<R: BufRead> LandmarkSource for ReplaySource<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn next_item(&mut self) -> HandsoffResult<Option<SourceItem>> {
        if self.released {
            return Ok(None);
        }
        while let Some(line) = self.lines.next() {
            self.line_no += 1;
            let line = line.map_err(|e| {
                HandsoffError::frame_read(format!("{} line {}: {e}", self.name, self.line_no))
            })?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return self.parse(trimmed).map(Some);
        }
        Ok(None)
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            tracing::debug!(source = %self.name, lines = self.line_no, "Replay source released");
        }
    }
}
