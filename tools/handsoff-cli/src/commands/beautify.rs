//! Apply the beauty filter to a single image.

use std::path::PathBuf;

use handsoff_common::config::{AppConfig, BeautyConfig};
use handsoff_detection_core::beauty::BeautyFilterPipeline;

pub fn run(config: &AppConfig, input: PathBuf, output: PathBuf) -> anyhow::Result<()> {
    let frame = image::open(&input)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", input.display()))?
        .to_rgb8();

    // The config switch governs live streams; this command always filters.
    let pipeline = BeautyFilterPipeline::new(BeautyConfig {
        enabled: true,
        ..config.beauty.clone()
    });
    let filtered = pipeline.apply(&frame);

    filtered
        .save(&output)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", output.display()))?;

    println!(
        "Beautified {}x{} image: {} -> {}",
        frame.width(),
        frame.height(),
        input.display(),
        output.display()
    );
    Ok(())
}
