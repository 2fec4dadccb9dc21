//! HandsOff Monitor: the reporting boundary
//!
//! Connects a landmark source to the detection engine and reports what it
//! sees:
//! - **Writer:** Line-delimited JSON events for a host UI
//! - **Screenshots:** Annotated frames saved on every trigger
//! - **Debug frames:** Throttled, downsized JPEG previews
//! - **Stats:** Per-day trigger counts and a weekly view
//! - **Replay:** A JSONL landmark source standing in for camera and pose model
//! - **Monitor:** The per-frame loop tying them together

pub mod debug_frame;
pub mod monitor;
pub mod replay;
pub mod screenshot;
pub mod stats;
pub mod writer;

pub use monitor::{Monitor, RunSummary};
pub use replay::ReplaySource;
pub use screenshot::ScreenshotStore;
pub use stats::DailyStatsStore;
pub use writer::EventWriter;
