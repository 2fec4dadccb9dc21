//! Application configuration.
//!
//! Every section deserializes with `#[serde(default)]`, so a partial file
//! only overrides the keys it names. Missing or malformed files fall back
//! to [`AppConfig::default`] with a warning; they are never fatal.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Detection engine parameters.
    pub detection: DetectionConfig,

    /// Overlay and frame presentation toggles.
    pub display: DisplayConfig,

    /// Cosmetic filter applied to output frames.
    pub beauty: BeautyConfig,

    /// Capture device selection.
    pub camera: CameraConfig,

    /// Where reports, screenshots and statistics go.
    pub output: OutputConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// How the detector behaves while proximity is sustained past the dwell time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RetriggerPolicy {
    /// Fire again after every further `time_threshold` seconds of proximity.
    #[default]
    Periodic,
    /// Fire once, then hold `Detected` until the hand leaves.
    OncePerEpisode,
}

/// Inclusive clamp range for an adaptive zone radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneBounds {
    pub min: f64,
    pub max: f64,
}

impl ZoneBounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamp a radius into this range.
    pub fn clamp(&self, radius: f64) -> f64 {
        radius.max(self.min).min(self.max)
    }
}

/// Shoulder width, in normalized units, of a subject seated at a typical
/// desk distance. The configured zone radii apply at this width and scale
/// linearly with the measured width.
pub const REFERENCE_SHOULDER_WIDTH: f64 = 0.3;

/// Detection engine parameters. Immutable once the engine is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Smoothed-signal cutoff below which the hand counts as near the head.
    pub distance_threshold: f64,

    /// Seconds of sustained proximity required before a trigger fires.
    pub time_threshold: f64,

    /// Number of frames averaged by the temporal smoother (>= 1).
    pub smoothing_frames: usize,

    /// Head zone radius at [`REFERENCE_SHOULDER_WIDTH`]. Also the zone
    /// reported before the first person is seen.
    pub head_zone_radius: f64,

    /// Face zone radius at [`REFERENCE_SHOULDER_WIDTH`]. Also the zone
    /// reported before the first person is seen.
    pub face_exclude_radius: f64,

    /// Head zone radius as a multiple of shoulder width. Derived from
    /// `head_zone_radius` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_zone_multiplier: Option<f64>,

    /// Clamp range for the head zone radius.
    pub head_zone_bounds: ZoneBounds,

    /// Face zone radius as a multiple of shoulder width. Derived from
    /// `face_exclude_radius` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face_zone_multiplier: Option<f64>,

    /// Clamp range for the face zone radius.
    pub face_zone_bounds: ZoneBounds,

    /// Behaviour while proximity continues after a trigger.
    pub retrigger: RetriggerPolicy,
}

/// Overlay and presentation toggles. None of these affect detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub show_skeleton: bool,
    pub show_distance: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub fps: u32,
    /// Flip frames horizontally before processing, like a mirror.
    pub mirror: bool,
}

/// Parameters of the cosmetic beauty filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeautyConfig {
    pub enabled: bool,
    /// Bilateral filter neighbourhood diameter in pixels.
    pub diameter: u32,
    /// Bilateral range sigma, in 0..255 intensity units.
    pub sigma_color: f64,
    /// Bilateral spatial sigma, in pixels.
    pub sigma_space: f64,
    /// Contrast gain, > 1.
    pub alpha: f64,
    /// Brightness offset, > 0.
    pub beta: f64,
    /// Saturation gain, > 1.
    pub saturation: f64,
}

/// Capture device selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub device_id: u32,
}

/// Reporting boundary settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for trigger screenshots.
    pub screenshots_dir: PathBuf,

    /// JSON file holding per-day trigger counts.
    pub stats_file: PathBuf,

    /// Emit a `status_update` every N frames.
    pub status_interval_frames: u64,

    /// Maximum rate of `debug_frame` events.
    pub debug_frame_hz: u32,

    /// Width debug frames are resized to before encoding.
    pub debug_frame_width: u32,

    /// JPEG quality for debug frames and screenshots.
    pub jpeg_quality: u8,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "handsoff=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            distance_threshold: 0.22,
            time_threshold: 2.0,
            smoothing_frames: 5,
            head_zone_radius: 0.35,
            face_exclude_radius: 0.10,
            head_zone_multiplier: None,
            head_zone_bounds: ZoneBounds::new(0.20, 0.60),
            face_zone_multiplier: None,
            face_zone_bounds: ZoneBounds::new(0.05, 0.20),
            retrigger: RetriggerPolicy::Periodic,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_skeleton: true,
            show_distance: true,
            window_width: 640,
            window_height: 480,
            fps: 30,
            mirror: true,
        }
    }
}

impl Default for BeautyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            diameter: 9,
            sigma_color: 75.0,
            sigma_space: 75.0,
            alpha: 1.1,
            beta: 10.0,
            saturation: 1.2,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { device_id: 0 }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            screenshots_dir: default_screenshots_dir(),
            stats_file: default_stats_file(),
            status_interval_frames: 150,
            debug_frame_hz: 5,
            debug_frame_width: 720,
            jpeg_quality: 90,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl DetectionConfig {
    /// Effective head zone multiplier.
    pub fn head_multiplier(&self) -> f64 {
        self.head_zone_multiplier
            .unwrap_or(self.head_zone_radius / REFERENCE_SHOULDER_WIDTH)
    }

    /// Effective face zone multiplier.
    pub fn face_multiplier(&self) -> f64 {
        self.face_zone_multiplier
            .unwrap_or(self.face_exclude_radius / REFERENCE_SHOULDER_WIDTH)
    }

    /// Repair out-of-range values in place, returning a note per repair.
    pub fn repair(&mut self) -> Vec<String> {
        let defaults = Self::default();
        let mut notes = Vec::new();

        if self.smoothing_frames == 0 {
            notes.push("smoothing_frames must be >= 1, using 1".to_string());
            self.smoothing_frames = 1;
        }

        for (name, value, fallback) in [
            (
                "distance_threshold",
                &mut self.distance_threshold,
                defaults.distance_threshold,
            ),
            (
                "time_threshold",
                &mut self.time_threshold,
                defaults.time_threshold,
            ),
        ] {
            if !value.is_finite() || *value <= 0.0 {
                notes.push(format!("{name} must be positive, using {fallback}"));
                *value = fallback;
            }
        }

        for (name, multiplier) in [
            ("head_zone_multiplier", &mut self.head_zone_multiplier),
            ("face_zone_multiplier", &mut self.face_zone_multiplier),
        ] {
            if let Some(value) = *multiplier {
                if !value.is_finite() || value <= 0.0 {
                    notes.push(format!(
                        "{name} must be positive, deriving it from the zone radius"
                    ));
                    *multiplier = None;
                }
            }
        }

        for (name, bounds, fallback) in [
            (
                "head_zone_bounds",
                &mut self.head_zone_bounds,
                defaults.head_zone_bounds,
            ),
            (
                "face_zone_bounds",
                &mut self.face_zone_bounds,
                defaults.face_zone_bounds,
            ),
        ] {
            let valid = bounds.min.is_finite()
                && bounds.max.is_finite()
                && bounds.min >= 0.0
                && bounds.min <= bounds.max;
            if !valid {
                notes.push(format!(
                    "{name} [{}, {}] is not a valid range, using [{}, {}]",
                    bounds.min, bounds.max, fallback.min, fallback.max
                ));
                *bounds = fallback;
            }
        }

        self.head_zone_radius = self.head_zone_bounds.clamp(self.head_zone_radius);
        self.face_exclude_radius = self
            .face_zone_bounds
            .clamp(self.face_exclude_radius)
            .min(0.7 * self.head_zone_radius);

        notes
    }
}

impl BeautyConfig {
    /// Repair out-of-range values in place, returning a note per repair.
    pub fn repair(&mut self) -> Vec<String> {
        let mut notes = Vec::new();
        if self.diameter == 0 {
            notes.push("beauty.diameter must be >= 1, using 1".to_string());
            self.diameter = 1;
        }
        for (name, value) in [
            ("beauty.sigma_color", &mut self.sigma_color),
            ("beauty.sigma_space", &mut self.sigma_space),
            ("beauty.alpha", &mut self.alpha),
            ("beauty.saturation", &mut self.saturation),
        ] {
            if !value.is_finite() || *value <= 0.0 {
                notes.push(format!("{name} must be positive, using 1.0"));
                *value = 1.0;
            }
        }
        if !self.beta.is_finite() {
            notes.push("beauty.beta must be finite, using 0.0".to_string());
            self.beta = 0.0;
        }
        notes
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(path: &Path) -> Self {
        let config = match Self::try_load(path) {
            Ok(Some(config)) => config,
            Ok(None) => {
                tracing::debug!("No config at {:?}, using defaults", path);
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to load config at {:?}: {}, using defaults", path, e);
                Self::default()
            }
        };
        config.validated()
    }

    /// Read and parse a config file. `Ok(None)` when the file does not exist.
    pub fn try_load(path: &Path) -> crate::HandsoffResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content).map_err(|e| {
            crate::HandsoffError::config(format!("{}: {e}", path.display()))
        })?;
        Ok(Some(config))
    }

    /// Repair invalid values, logging each repair.
    pub fn validated(mut self) -> Self {
        let mut notes = self.detection.repair();
        notes.extend(self.beauty.repair());
        if self.output.debug_frame_hz == 0 {
            notes.push("output.debug_frame_hz must be >= 1, using 1".to_string());
            self.output.debug_frame_hz = 1;
        }
        if self.output.status_interval_frames == 0 {
            notes.push("output.status_interval_frames must be >= 1, using 150".to_string());
            self.output.status_interval_frames = 150;
        }
        self.output.jpeg_quality = self.output.jpeg_quality.clamp(1, 100);
        for note in notes {
            tracing::warn!("Config repaired: {}", note);
        }
        self
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&config_file_path())
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

fn home_dir() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string()))
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"));
    base.join("handsoff").join("config.json")
}

/// Default screenshot directory, under the user's pictures folder.
fn default_screenshots_dir() -> PathBuf {
    home_dir()
        .join("Pictures")
        .join("HandsOff")
        .join("screenshots")
}

/// Default per-day statistics file.
fn default_stats_file() -> PathBuf {
    home_dir().join(".handsoff").join("stats.json")
}
