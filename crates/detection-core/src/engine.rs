//! The per-stream detection engine.
//!
//! All mutable detection state lives in one explicit record,
//! [`EngineState`], and [`step`] is a function of `(config, state, input)`.
//! [`DetectionEngine`] pairs the two for callers that want an object.
//!
//! Per frame: landmarks → geometry → smoother → state machine → snapshot.
//! A frame without a usable person forces `Normal`, clears the session and
//! empties the smoothing buffer so stale history never carries over.

use handsoff_common::clock::FpsMeter;
use handsoff_common::config::DetectionConfig;
use handsoff_pose_model::landmarks::Landmarks;
use handsoff_pose_model::state::{DetectorState, StateTransition, StatsSnapshot};

use crate::geometry::{AdaptiveZoneState, GeometryAnalyzer, GeometryReading};
use crate::smoothing::TemporalSmoother;
use crate::state_machine::{DwellPolicy, ScratchSession, StateMachine, Trigger};

/// Immutable engine parameters, built once from [`DetectionConfig`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub detection: DetectionConfig,
    pub analyzer: GeometryAnalyzer,
    pub policy: DwellPolicy,
}

impl EngineConfig {
    pub fn new(detection: DetectionConfig) -> Self {
        Self {
            analyzer: GeometryAnalyzer::from_config(&detection),
            policy: DwellPolicy::from(&detection),
            detection,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(DetectionConfig::default())
    }
}

/// Everything the engine mutates between frames.
#[derive(Debug, Clone)]
pub struct EngineState {
    pub smoother: TemporalSmoother,
    pub machine: StateMachine,
    pub zones: AdaptiveZoneState,
    pub fps: FpsMeter,
    pub frames: u64,
}

impl EngineState {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            smoother: TemporalSmoother::new(config.detection.smoothing_frames),
            machine: StateMachine::new(),
            zones: AdaptiveZoneState::seed(&config.detection),
            fps: FpsMeter::new(),
            frames: 0,
        }
    }

    /// Snapshot of the state after the most recent frame.
    pub fn snapshot(&self, distance: Option<f64>) -> StatsSnapshot {
        StatsSnapshot {
            state: self.machine.state(),
            distance,
            duration: self.machine.session().duration,
            trigger_count: self.machine.trigger_count(),
            fps: self.fps.fps(),
        }
    }
}

/// Result of processing one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutcome {
    /// Frame time this outcome belongs to.
    pub timestamp_secs: f64,
    pub snapshot: StatsSnapshot,
    /// Geometry for this frame, `None` when no person was usable.
    pub reading: Option<GeometryReading>,
    /// Zones in effect (the last measured ones when nobody is in view).
    pub zones: AdaptiveZoneState,
    pub transition: Option<StateTransition>,
    pub trigger: Option<Trigger>,
}

impl FrameOutcome {
    pub fn person_detected(&self) -> bool {
        self.reading.is_some()
    }

    pub fn state(&self) -> DetectorState {
        self.snapshot.state
    }
}

/// Advance `state` by one frame.
pub fn step(
    config: &EngineConfig,
    state: &mut EngineState,
    timestamp_secs: f64,
    landmarks: Option<&Landmarks>,
) -> FrameOutcome {
    state.frames += 1;
    state.fps.tick(timestamp_secs);

    let reading = landmarks.and_then(|l| config.analyzer.analyze(l));

    let (distance, result) = match &reading {
        Some(reading) => {
            state.zones = reading.zones;
            let smoothed = state.smoother.push(reading.signal);
            let result = state
                .machine
                .update(&config.policy, smoothed, timestamp_secs);
            (Some(smoothed), result)
        }
        None => {
            if landmarks.is_some() {
                tracing::debug!("Incomplete landmarks, treating frame as no detection");
            }
            state.smoother.clear();
            (None, state.machine.force_normal())
        }
    };

    if let Some(transition) = result.transition {
        tracing::debug!(from = %transition.from, to = %transition.to, "State changed");
    }

    FrameOutcome {
        timestamp_secs,
        snapshot: state.snapshot(distance),
        reading,
        zones: state.zones,
        transition: result.transition,
        trigger: result.trigger,
    }
}

/// Owns the engine config and state for one landmark stream.
///
/// Frames must be submitted in arrival order from a single writer.
#[derive(Debug, Clone)]
pub struct DetectionEngine {
    config: EngineConfig,
    state: EngineState,
}

impl DetectionEngine {
    pub fn new(config: EngineConfig) -> Self {
        let state = EngineState::new(&config);
        Self { config, state }
    }

    pub fn from_detection_config(detection: DetectionConfig) -> Self {
        Self::new(EngineConfig::new(detection))
    }

    /// Process one frame's landmarks (`None` when nobody is in view).
    pub fn process(&mut self, timestamp_secs: f64, landmarks: Option<&Landmarks>) -> FrameOutcome {
        step(&self.config, &mut self.state, timestamp_secs, landmarks)
    }

    /// Reset the trigger counter only.
    pub fn reset(&mut self) {
        self.state.machine.reset_counter();
        tracing::info!("Trigger counter reset");
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn detector_state(&self) -> DetectorState {
        self.state.machine.state()
    }

    pub fn session(&self) -> &ScratchSession {
        self.state.machine.session()
    }

    pub fn trigger_count(&self) -> u64 {
        self.state.machine.trigger_count()
    }

    /// Number of frames processed so far.
    pub fn frame_count(&self) -> u64 {
        self.state.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handsoff_pose_model::landmarks::{BodyPart, Keypoint};

    fn pose_with_hand(hand: Option<Keypoint>) -> Landmarks {
        let mut pose = Landmarks::from_parts(&[
            (BodyPart::Nose, Keypoint::new(0.5, 0.32)),
            (BodyPart::LeftEye, Keypoint::new(0.47, 0.29)),
            (BodyPart::RightEye, Keypoint::new(0.53, 0.29)),
            (BodyPart::LeftEar, Keypoint::new(0.42, 0.31)),
            (BodyPart::RightEar, Keypoint::new(0.58, 0.31)),
            (BodyPart::LeftShoulder, Keypoint::new(0.35, 0.5)),
            (BodyPart::RightShoulder, Keypoint::new(0.65, 0.5)),
            (BodyPart::LeftWrist, Keypoint::new(0.3, 0.9)),
            (BodyPart::RightWrist, Keypoint::new(0.7, 0.9)),
            (BodyPart::LeftIndex, Keypoint::new(0.3, 0.95)),
            (BodyPart::RightIndex, Keypoint::new(0.7, 0.95)),
        ]);
        if let Some(hand) = hand {
            pose.set(BodyPart::RightIndex, hand);
        }
        pose
    }

    #[test]
    fn no_person_mid_session_resets_everything() {
        let mut engine = DetectionEngine::new(EngineConfig::default());
        let scratching = pose_with_hand(Some(Keypoint::new(0.5, 0.15)));

        engine.process(0.0, Some(&scratching));
        engine.process(0.1, Some(&scratching));
        assert_eq!(engine.detector_state(), DetectorState::Warning);
        assert_eq!(engine.state().smoother.len(), 2);

        let outcome = engine.process(0.2, None);
        assert_eq!(outcome.state(), DetectorState::Normal);
        assert_eq!(outcome.snapshot.distance, None);
        assert!(!engine.session().is_active());
        assert!(engine.state().smoother.is_empty());

        // Re-appearance smooths from an empty window.
        let outcome = engine.process(0.3, Some(&scratching));
        assert_eq!(engine.state().smoother.len(), 1);
        assert!((outcome.snapshot.distance.unwrap() - 0.15).abs() < 1e-9);
    }

    #[test]
    fn incomplete_landmarks_count_as_no_person() {
        let mut engine = DetectionEngine::new(EngineConfig::default());
        let scratching = pose_with_hand(Some(Keypoint::new(0.5, 0.15)));
        engine.process(0.0, Some(&scratching));

        let mut broken = scratching.clone();
        broken.set(BodyPart::LeftShoulder, Keypoint::new(f64::NAN, 0.5));
        let outcome = engine.process(0.1, Some(&broken));
        assert!(!outcome.person_detected());
        assert_eq!(outcome.state(), DetectorState::Normal);
        assert!(engine.state().smoother.is_empty());
    }

    #[test]
    fn sustained_scratch_triggers_after_time_threshold() {
        let mut engine = DetectionEngine::new(EngineConfig::default());
        let scratching = pose_with_hand(Some(Keypoint::new(0.5, 0.15)));

        let mut triggers = Vec::new();
        for i in 0..=30 {
            let t = i as f64 * 0.1;
            let outcome = engine.process(t, Some(&scratching));
            if let Some(trigger) = outcome.trigger {
                triggers.push((t, trigger.count));
            }
        }
        // Default time threshold is 2 s, session starts at t=0.
        assert_eq!(triggers.len(), 1);
        assert!((triggers[0].0 - 2.0).abs() < 1e-9);
        assert_eq!(engine.trigger_count(), 1);
    }

    #[test]
    fn reset_touches_only_the_counter() {
        let mut engine = DetectionEngine::new(EngineConfig::default());
        let scratching = pose_with_hand(Some(Keypoint::new(0.5, 0.15)));
        for i in 0..25 {
            engine.process(i as f64 * 0.1, Some(&scratching));
        }
        let state = engine.detector_state();
        let session = *engine.session();
        let samples: Vec<f64> = engine.state().smoother.samples().collect();

        engine.reset();

        assert_eq!(engine.trigger_count(), 0);
        assert_eq!(engine.detector_state(), state);
        assert_eq!(*engine.session(), session);
        assert_eq!(engine.state().smoother.samples().collect::<Vec<_>>(), samples);
    }

    #[test]
    fn zones_hold_last_measurement_when_person_leaves() {
        let mut engine = DetectionEngine::new(EngineConfig::default());
        let seed = engine.state().zones;
        assert_eq!(seed.head_zone_radius, 0.35);

        let measured = engine.process(0.0, Some(&pose_with_hand(None))).zones;
        assert!((measured.head_zone_radius - 0.35).abs() < 1e-9);

        let absent = engine.process(0.1, None).zones;
        assert_eq!(absent, measured);
    }

    #[test]
    fn step_is_deterministic() {
        let config = EngineConfig::default();
        let frames: Vec<Option<Landmarks>> = (0..40)
            .map(|i| match i % 10 {
                0..=6 => Some(pose_with_hand(Some(Keypoint::new(0.5, 0.15)))),
                7 => None,
                _ => Some(pose_with_hand(None)),
            })
            .collect();

        let run = || {
            let mut state = EngineState::new(&config);
            frames
                .iter()
                .enumerate()
                .map(|(i, l)| step(&config, &mut state, i as f64 * 0.5, l.as_ref()))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
