//! Trigger screenshots.
//!
//! Files are named `screenshot_YYYYMMDD_HHMMSS.jpg` from local wall-clock
//! time. A second capture within the same second gets a `_N` suffix instead
//! of overwriting the first.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use handsoff_common::error::HandsoffResult;
use handsoff_pose_model::source::Frame;

use crate::debug_frame::encode_jpeg;

/// Write-only store for annotated trigger frames.
#[derive(Debug, Clone)]
pub struct ScreenshotStore {
    dir: PathBuf,
    quality: u8,
}

impl ScreenshotStore {
    /// Open the store, creating `dir` if it does not exist.
    pub fn new(dir: impl Into<PathBuf>, quality: u8) -> HandsoffResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        tracing::debug!(dir = %dir.display(), "Screenshot directory ready");
        Ok(Self { dir, quality })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save `frame` stamped with the current time.
    pub fn save(&self, frame: &Frame) -> HandsoffResult<PathBuf> {
        self.save_at(frame, Local::now())
    }

    /// Save `frame` stamped with `at`.
    pub fn save_at(&self, frame: &Frame, at: DateTime<Local>) -> HandsoffResult<PathBuf> {
        let path = self.free_path(&at.format("screenshot_%Y%m%d_%H%M%S").to_string());
        std::fs::write(&path, encode_jpeg(frame, self.quality)?)?;
        tracing::info!(path = %path.display(), "Screenshot saved");
        Ok(path)
    }

    fn free_path(&self, stem: &str) -> PathBuf {
        let mut path = self.dir.join(format!("{stem}.jpg"));
        let mut n = 1;
        while path.exists() {
            path = self.dir.join(format!("{stem}_{n}.jpg"));
            n += 1;
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use image::Rgb;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap()
    }

    #[test]
    fn test_creates_directory_and_names_by_timestamp() {
        let root = tempfile::tempdir().unwrap();
        let store = ScreenshotStore::new(root.path().join("shots"), 90).unwrap();
        let frame = Frame::from_pixel(16, 12, Rgb([1, 2, 3]));

        let path = store.save_at(&frame, at()).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "screenshot_20260314_092653.jpg"
        );
        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 12));
    }

    #[test]
    fn test_same_second_gets_suffix() {
        let root = tempfile::tempdir().unwrap();
        let store = ScreenshotStore::new(root.path(), 90).unwrap();
        let frame = Frame::from_pixel(4, 4, Rgb([0, 0, 0]));

        let names: Vec<String> = (0..3)
            .map(|_| {
                let path = store.save_at(&frame, at()).unwrap();
                path.file_name().unwrap().to_string_lossy().into_owned()
            })
            .collect();
        assert_eq!(
            names,
            vec![
                "screenshot_20260314_092653.jpg",
                "screenshot_20260314_092653_1.jpg",
                "screenshot_20260314_092653_2.jpg",
            ]
        );
    }
}
