//! Show or create the configuration file.

use std::path::Path;

use handsoff_common::config::AppConfig;

pub fn run(config: &AppConfig, path: &Path, write_default: bool) -> anyhow::Result<()> {
    if write_default {
        if path.exists() {
            anyhow::bail!("Config already exists at {}", path.display());
        }
        AppConfig::default()
            .save_to(path)
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", path.display()))?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    println!("# {}", path.display());
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
