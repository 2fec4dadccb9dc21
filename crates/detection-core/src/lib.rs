//! HandsOff Detection Core: the gesture state engine
//!
//! Turns a per-frame stream of body landmarks into a behavioral state:
//! - **Geometry:** Adaptive head/face zones scaled by shoulder width, and a
//!   single proximity signal from the hand points
//! - **Smoothing:** Moving average of the signal over a fixed frame window
//! - **State machine:** Dwell-time tracking with a configurable retrigger policy
//! - **Engine:** The explicit per-stream state record and the per-frame step
//! - **Beauty:** A stateless cosmetic filter for output frames
//! - **Annotate:** Overlay drawing for display and screenshots
//!
//! This crate is pure computation with no I/O and no clocks. Timing comes from
//! frame timestamps supplied by the caller.

pub mod annotate;
pub mod beauty;
pub mod engine;
pub mod geometry;
pub mod smoothing;
pub mod state_machine;

pub use beauty::BeautyFilterPipeline;
pub use engine::{DetectionEngine, EngineConfig, EngineState, FrameOutcome};
pub use geometry::GeometryAnalyzer;
pub use smoothing::TemporalSmoother;
pub use state_machine::StateMachine;
