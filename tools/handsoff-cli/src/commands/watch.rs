//! Replay a landmark stream through the monitor.

use std::io::Write;
use std::path::{Path, PathBuf};

use handsoff_common::config::{AppConfig, RetriggerPolicy};
use handsoff_monitor::monitor::report_source_unavailable;
use handsoff_monitor::{EventWriter, Monitor, ReplaySource};
use handsoff_pose_model::source::LandmarkSource;

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
pub struct WatchOverrides {
    pub input: Option<PathBuf>,
    pub beauty: Option<bool>,
    pub screenshots: Option<PathBuf>,
    pub stats_file: Option<PathBuf>,
    pub policy: Option<RetriggerPolicy>,
    /// Append events here instead of writing them to stdout.
    pub events_file: Option<PathBuf>,
}

impl WatchOverrides {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(enabled) = self.beauty {
            config.beauty.enabled = enabled;
        }
        if let Some(dir) = &self.screenshots {
            config.output.screenshots_dir = dir.clone();
        }
        if let Some(file) = &self.stats_file {
            config.output.stats_file = file.clone();
        }
        if let Some(policy) = self.policy {
            config.detection.retrigger = policy;
        }
    }
}

pub async fn run(mut config: AppConfig, overrides: WatchOverrides) -> anyhow::Result<()> {
    overrides.apply(&mut config);
    match &overrides.events_file {
        Some(path) => {
            tracing::info!("Appending events to {}", path.display());
            watch(&config, &overrides, EventWriter::append_to(path)?).await
        }
        None => watch(&config, &overrides, EventWriter::stdout()).await,
    }
}

async fn watch<W: Write>(
    config: &AppConfig,
    overrides: &WatchOverrides,
    mut writer: EventWriter<W>,
) -> anyhow::Result<()> {
    let source: Box<dyn LandmarkSource> = match overrides.input.as_deref() {
        Some(path) if path != Path::new("-") => match ReplaySource::open(path) {
            Ok(source) => Box::new(source),
            Err(e) => {
                report_source_unavailable(&mut writer, &e)?;
                return Err(e.into());
            }
        },
        _ => Box::new(ReplaySource::stdin()),
    };

    let mut monitor = Monitor::new(source, config, writer);
    let summary = monitor.run().await?;
    tracing::info!(
        frames = summary.frames,
        triggers = summary.triggers,
        final_state = %summary.final_state,
        "Watch complete"
    );
    Ok(())
}
