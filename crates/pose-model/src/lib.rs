//! HandsOff Pose Model
//!
//! Defines the data contracts shared by the detection engine and the
//! reporting boundary:
//! - **Landmarks:** Per-frame body keypoints from the external pose model
//! - **State:** Detector state and the per-frame stats snapshot
//! - **Report:** Line-delimited JSON events consumed by the host UI
//! - **Source:** The landmark source contract the engine consumes
//!
//! All keypoint coordinates are normalized to `[0.0, 1.0]` relative to the
//! frame width and height.

pub mod landmarks;
pub mod report;
pub mod source;
pub mod state;

pub use landmarks::*;
pub use report::*;
pub use source::*;
pub use state::*;
