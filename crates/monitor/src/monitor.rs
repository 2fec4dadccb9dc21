//! The per-stream monitoring loop.
//!
//! One [`Monitor`] owns a landmark source and everything downstream of it:
//! the detection engine, the beauty filter, the event writer and the two
//! file stores. Per frame it runs detection on the caller while the beauty
//! filter works on a blocking task over its own copy of the frame, then
//! annotates the cosmetic frame and reports.
//!
//! The source is released exactly once, whether the loop ends normally,
//! returns an error, or the monitor is dropped mid-run.

use std::io::Write;
use std::sync::Arc;

use handsoff_common::config::{AppConfig, DisplayConfig, OutputConfig};
use handsoff_common::error::{HandsoffError, HandsoffResult};
use handsoff_detection_core::annotate::annotate;
use handsoff_detection_core::beauty::BeautyFilterPipeline;
use handsoff_detection_core::engine::{DetectionEngine, EngineConfig, FrameOutcome};
use handsoff_pose_model::report::ReportEvent;
use handsoff_pose_model::source::{Frame, LandmarkSource, SourceFrame, SourceItem};
use handsoff_pose_model::state::DetectorState;
use image::imageops;

use crate::debug_frame::DebugFrameEncoder;
use crate::screenshot::ScreenshotStore;
use crate::stats::DailyStatsStore;
use crate::writer::EventWriter;

const PERMISSION_HELP: &str =
    "Allow camera access for this application in your system privacy settings, then start detection again";

/// What a finished run did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Frames processed.
    pub frames: u64,
    /// Triggers fired during this run, unaffected by counter resets.
    pub triggers: u64,
    /// Trigger counter at the end of the run.
    pub trigger_count: u64,
    pub final_state: DetectorState,
}

/// Emit `camera_permission_needed` for an unavailable source.
pub fn report_source_unavailable<W: Write>(
    writer: &mut EventWriter<W>,
    error: &HandsoffError,
) -> HandsoffResult<()> {
    tracing::error!(error = %error, "Frame source unavailable");
    writer.emit(ReportEvent::CameraPermissionNeeded {
        message: error.to_string(),
        help: PERMISSION_HELP.to_string(),
    })
}

pub struct Monitor<S: LandmarkSource, W: Write> {
    source: S,
    engine: DetectionEngine,
    beauty: Arc<BeautyFilterPipeline>,
    display: DisplayConfig,
    output: OutputConfig,
    writer: EventWriter<W>,
    screenshots: Option<ScreenshotStore>,
    stats: Option<DailyStatsStore>,
    debug_frames: DebugFrameEncoder,
    triggers: u64,
    released: bool,
}

impl<S: LandmarkSource, W: Write> Monitor<S, W> {
    /// Build a monitor from a validated config.
    ///
    /// The screenshot and stats stores are optional: if either cannot be
    /// opened the run continues without it.
    pub fn new(source: S, config: &AppConfig, writer: EventWriter<W>) -> Self {
        let screenshots =
            match ScreenshotStore::new(&config.output.screenshots_dir, config.output.jpeg_quality) {
                Ok(store) => Some(store),
                Err(e) => {
                    tracing::warn!(error = %e, "Screenshots disabled");
                    None
                }
            };
        let stats = match DailyStatsStore::open(&config.output.stats_file) {
            Ok(store) => Some(store),
            Err(e) => {
                tracing::warn!(error = %e, "Daily statistics disabled");
                None
            }
        };

        Self {
            source,
            engine: DetectionEngine::new(EngineConfig::new(config.detection.clone())),
            beauty: Arc::new(BeautyFilterPipeline::new(config.beauty.clone())),
            display: config.display.clone(),
            output: config.output.clone(),
            writer,
            screenshots,
            stats,
            debug_frames: DebugFrameEncoder::new(&config.output),
            triggers: 0,
            released: false,
        }
    }

    pub fn engine(&self) -> &DetectionEngine {
        &self.engine
    }

    pub fn writer(&self) -> &EventWriter<W> {
        &self.writer
    }

    pub fn stats(&self) -> Option<&DailyStatsStore> {
        self.stats.as_ref()
    }

    /// Process the source until it ends.
    ///
    /// An unavailable source is reported as `camera_permission_needed` and
    /// returned as an error. A frame read failure ends the stream normally.
    pub async fn run(&mut self) -> HandsoffResult<RunSummary> {
        tracing::info!(
            source = self.source.name(),
            beauty = self.beauty.is_enabled(),
            policy = ?self.engine.config().policy.retrigger,
            "Monitoring started"
        );
        let result = self.run_loop().await;
        self.release();

        if let Ok(summary) = &result {
            tracing::info!(
                frames = summary.frames,
                triggers = summary.triggers,
                "Monitoring finished"
            );
        }
        result
    }

    async fn run_loop(&mut self) -> HandsoffResult<RunSummary> {
        loop {
            let item = match self.source.next_item() {
                Ok(Some(item)) => item,
                Ok(None) => break,
                Err(e) if e.is_fatal() => {
                    report_source_unavailable(&mut self.writer, &e)?;
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Frame read failed, ending stream");
                    break;
                }
            };

            match item {
                SourceItem::ResetCounter => self.reset_counter()?,
                SourceItem::Frame(frame) => {
                    self.process_frame(frame).await?;
                }
            }
        }
        Ok(self.summary())
    }

    /// Reset the trigger counter and acknowledge it on the event stream.
    pub fn reset_counter(&mut self) -> HandsoffResult<()> {
        self.engine.reset();
        self.writer.emit(ReportEvent::CounterReset {
            trigger_count: self.engine.trigger_count(),
        })
    }

    /// Run one frame through detection, the beauty filter and reporting.
    pub async fn process_frame(&mut self, frame: SourceFrame) -> HandsoffResult<FrameOutcome> {
        let SourceFrame {
            timestamp_secs,
            image,
            mut landmarks,
        } = frame;

        let mut image = image
            .unwrap_or_else(|| Frame::new(self.display.window_width, self.display.window_height));
        if self.display.mirror {
            imageops::flip_horizontal_in_place(&mut image);
            landmarks = landmarks.map(|l| l.mirrored());
        }

        let cosmetic = self.beauty.is_enabled().then(|| {
            let pipeline = Arc::clone(&self.beauty);
            let copy = image.clone();
            tokio::task::spawn_blocking(move || pipeline.apply(&copy))
        });

        let outcome = self.engine.process(timestamp_secs, landmarks.as_ref());

        let mut shown = match cosmetic {
            Some(task) => task
                .await
                .map_err(|e| HandsoffError::image(format!("Beauty filter task failed: {e}")))?,
            None => image,
        };
        annotate(
            &mut shown,
            landmarks.as_ref(),
            &outcome,
            &self.display,
            self.engine.config().policy.distance_threshold,
        );

        self.report(&outcome, &shown)?;
        Ok(outcome)
    }

    fn report(&mut self, outcome: &FrameOutcome, shown: &Frame) -> HandsoffResult<()> {
        let stats = outcome.snapshot;

        if let Some(transition) = outcome.transition {
            tracing::info!(from = %transition.from, to = %transition.to, "State changed");
            self.writer.emit(ReportEvent::StateChanged {
                state: transition.to,
                stats,
            })?;
        }

        if let Some(trigger) = outcome.trigger {
            self.triggers += 1;
            let screenshot_path = self.save_screenshot(shown);
            if let Some(store) = self.stats.as_mut() {
                if let Err(e) = store.record_trigger() {
                    tracing::warn!(error = %e, "Failed to record trigger");
                }
            }
            tracing::info!(
                count = trigger.count,
                dwell = trigger.dwell,
                "Hand-near-head detected"
            );
            self.writer.emit(ReportEvent::ScratchDetected {
                trigger_count: trigger.count,
                duration: trigger.dwell,
                distance: stats.distance,
                screenshot_path,
                screenshot_dir: self
                    .screenshots
                    .as_ref()
                    .map(|s| s.dir())
                    .unwrap_or(self.output.screenshots_dir.as_path())
                    .display()
                    .to_string(),
            })?;
        }

        let frames = self.engine.frame_count();
        if frames % self.output.status_interval_frames.max(1) == 0 {
            self.writer.emit(ReportEvent::StatusUpdate {
                state: stats.state,
                stats,
                frame_count: frames,
            })?;
        }

        match self.debug_frames.encode_if_due(outcome.timestamp_secs, shown) {
            Ok(Some(image_b64)) => self.writer.emit(ReportEvent::DebugFrame {
                image_b64,
                status: stats.state.as_status().to_string(),
                count: stats.trigger_count,
                duration: stats.duration,
            })?,
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Debug frame skipped"),
        }

        Ok(())
    }

    fn save_screenshot(&self, shown: &Frame) -> Option<String> {
        let store = self.screenshots.as_ref()?;
        match store.save(shown) {
            Ok(path) => Some(path.display().to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to save screenshot");
                None
            }
        }
    }

    fn summary(&self) -> RunSummary {
        RunSummary {
            frames: self.engine.frame_count(),
            triggers: self.triggers,
            trigger_count: self.engine.trigger_count(),
            final_state: self.engine.detector_state(),
        }
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.source.release();
            tracing::debug!(source = self.source.name(), "Source released");
        }
    }
}

impl<S: LandmarkSource, W: Write> Drop for Monitor<S, W> {
    fn drop(&mut self) {
        self.release();
    }
}
