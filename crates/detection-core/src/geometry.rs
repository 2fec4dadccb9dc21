//! Adaptive zone geometry: the hand-near-head proximity signal.
//!
//! # Algorithm
//!
//! 1. **Scale:** shoulder width is the proxy for subject size, so the zones
//!    shrink as the person moves away from the camera.
//! 2. **Zones:** the head zone radius is `shoulder_width * head_multiplier`
//!    clamped to its bounds. Unless set explicitly, each multiplier is the
//!    configured radius divided by the reference shoulder width. The face zone radius is computed the same way and
//!    then capped at `0.7 * head radius`, keeping it nested in the head zone.
//! 3. **Anchors:** the head center is the mean of both eyes and both ears; the
//!    face center is the nose.
//! 4. **Classify** each hand point (wrists and index tips):
//!    - inside the head zone but outside the face zone → scratch, value `d_head`
//!    - inside the face zone (inclusive) → face touch, value `d_face`
//!    - otherwise it does not count.
//! 5. **Signal:** the minimum qualifying value, or [`NO_HAND_SIGNAL`].

use handsoff_common::config::{DetectionConfig, ZoneBounds};
use handsoff_pose_model::landmarks::{BodyPart, Keypoint, Landmarks};
use serde::Serialize;

/// Signal value when no hand point is in either zone.
pub const NO_HAND_SIGNAL: f64 = 999.0;

/// Largest face radius as a fraction of the head radius.
pub const FACE_TO_HEAD_MAX_RATIO: f64 = 0.7;

/// Zone radii derived from one frame's body proportions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AdaptiveZoneState {
    pub shoulder_width: f64,
    pub head_zone_radius: f64,
    pub face_zone_radius: f64,
}

impl AdaptiveZoneState {
    /// Zones reported before any person has been measured.
    pub fn seed(config: &DetectionConfig) -> Self {
        let head = config.head_zone_radius;
        Self {
            shoulder_width: 0.0,
            head_zone_radius: head,
            face_zone_radius: config.face_exclude_radius.min(FACE_TO_HEAD_MAX_RATIO * head),
        }
    }
}

/// How a hand point qualified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandContact {
    /// Head, ear or crown contact away from the face center.
    Scratch,
    /// Eyes, nose or mouth contact.
    FaceTouch,
}

/// The qualifying hand point closest to its anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandHit {
    pub part: BodyPart,
    pub contact: HandContact,
    pub distance: f64,
}

/// Everything the geometry stage derives from one landmark set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryReading {
    pub zones: AdaptiveZoneState,
    pub head_center: Keypoint,
    pub face_center: Keypoint,
    /// Raw proximity signal; lower is closer.
    pub signal: f64,
    /// The hand point that produced `signal`, if any qualified.
    pub closest: Option<HandHit>,
}

/// Scaling rules for the adaptive zones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneParams {
    pub head_multiplier: f64,
    pub head_bounds: ZoneBounds,
    pub face_multiplier: f64,
    pub face_bounds: ZoneBounds,
}

impl From<&DetectionConfig> for ZoneParams {
    fn from(config: &DetectionConfig) -> Self {
        Self {
            head_multiplier: config.head_multiplier(),
            head_bounds: config.head_zone_bounds,
            face_multiplier: config.face_multiplier(),
            face_bounds: config.face_zone_bounds,
        }
    }
}

/// Converts landmarks into zones and a proximity signal.
#[derive(Debug, Clone)]
pub struct GeometryAnalyzer {
    params: ZoneParams,
}

impl GeometryAnalyzer {
    pub fn new(params: ZoneParams) -> Self {
        Self { params }
    }

    pub fn from_config(config: &DetectionConfig) -> Self {
        Self::new(ZoneParams::from(config))
    }

    pub fn params(&self) -> &ZoneParams {
        &self.params
    }

    /// Zone radii for a given shoulder width.
    pub fn zones_for(&self, shoulder_width: f64) -> AdaptiveZoneState {
        let head = self
            .params
            .head_bounds
            .clamp(shoulder_width * self.params.head_multiplier);
        let face = self
            .params
            .face_bounds
            .clamp(shoulder_width * self.params.face_multiplier)
            .min(FACE_TO_HEAD_MAX_RATIO * head);

        AdaptiveZoneState {
            shoulder_width,
            head_zone_radius: head,
            face_zone_radius: face,
        }
    }

    /// Analyze one landmark set.
    ///
    /// Returns `None` if any required keypoint is missing or undefined; the
    /// caller treats that frame as having no person.
    pub fn analyze(&self, landmarks: &Landmarks) -> Option<GeometryReading> {
        let left_shoulder = landmarks.get(BodyPart::LeftShoulder)?;
        let right_shoulder = landmarks.get(BodyPart::RightShoulder)?;
        let face_center = landmarks.get(BodyPart::Nose)?;

        let mut head_x = 0.0;
        let mut head_y = 0.0;
        for part in BodyPart::HEAD_ANCHORS {
            let point = landmarks.get(part)?;
            head_x += point.x;
            head_y += point.y;
        }
        let anchors = BodyPart::HEAD_ANCHORS.len() as f64;
        let head_center = Keypoint::new(head_x / anchors, head_y / anchors);

        let mut hands = [(BodyPart::LeftWrist, face_center); 4];
        for (slot, part) in hands.iter_mut().zip(BodyPart::HAND_POINTS) {
            *slot = (part, landmarks.get(part)?);
        }

        let zones = self.zones_for(left_shoulder.distance_to(&right_shoulder));

        let closest = hands
            .iter()
            .filter_map(|(part, hand)| {
                let d_head = hand.distance_to(&head_center);
                let d_face = hand.distance_to(&face_center);
                classify(d_head, d_face, &zones).map(|(contact, distance)| HandHit {
                    part: *part,
                    contact,
                    distance,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance));

        Some(GeometryReading {
            zones,
            head_center,
            face_center,
            signal: closest.map_or(NO_HAND_SIGNAL, |hit| hit.distance),
            closest,
        })
    }
}

/// Classify one hand point from its distances to the head and face centers.
///
/// The head-zone test is strict (`<`); the face-zone test is inclusive (`<=`).
pub fn classify(
    d_head: f64,
    d_face: f64,
    zones: &AdaptiveZoneState,
) -> Option<(HandContact, f64)> {
    if d_head < zones.head_zone_radius && d_face > zones.face_zone_radius {
        Some((HandContact::Scratch, d_head))
    } else if d_face <= zones.face_zone_radius {
        Some((HandContact::FaceTouch, d_face))
    } else {
        None
    }
}
