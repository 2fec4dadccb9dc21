//! The landmark source contract.
//!
//! Capture and pose estimation live outside the engine. A source hands the
//! monitor one item per frame: the frame buffer (when it has one) plus the
//! keypoints of the tracked person, or `None` when nobody is in view.

use handsoff_common::error::HandsoffResult;

use crate::landmarks::Landmarks;

/// An 8-bit RGB frame buffer.
pub type Frame = image::RgbImage;

/// One captured frame and its pose estimate.
#[derive(Debug, Clone)]
pub struct SourceFrame {
    /// Seconds since the stream started. Must not decrease.
    pub timestamp_secs: f64,

    /// The raw frame, if the source carries pixels.
    pub image: Option<Frame>,

    /// Keypoints of the tracked person; `None` when no person was detected.
    pub landmarks: Option<Landmarks>,
}

/// Items a source can yield.
#[derive(Debug, Clone)]
pub enum SourceItem {
    Frame(SourceFrame),
    /// External request to reset the trigger counter.
    ResetCounter,
}

/// A per-frame supplier of landmarks.
///
/// `open` failures surface as `HandsoffError::SourceUnavailable`. Returning
/// `Ok(None)` from [`LandmarkSource::next_item`] means the stream ended.
pub trait LandmarkSource {
    /// Human-readable source name for logs.
    fn name(&self) -> &str;

    /// Pull the next item, blocking until one is available.
    fn next_item(&mut self) -> HandsoffResult<Option<SourceItem>>;

    /// Release the underlying capture device and model handle.
    ///
    /// Called exactly once by the owner; implementations must tolerate
    /// being released after the stream already ended.
    fn release(&mut self) {}
}

impl<S: LandmarkSource + ?Sized> LandmarkSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn next_item(&mut self) -> HandsoffResult<Option<SourceItem>> {
        (**self).next_item()
    }

    fn release(&mut self) {
        (**self).release()
    }
}
