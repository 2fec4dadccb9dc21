//! Body landmark types.
//!
//! The pose model emits a fixed 33-point full-body schema per person. The
//! detector only reads the head, shoulder and hand points, but the whole
//! set is kept so overlays can draw the skeleton.

use serde::{Deserialize, Deserializer, Serialize};

/// Named body parts, in the index order of the upstream pose schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl BodyPart {
    /// Number of points in the full schema.
    pub const COUNT: usize = 33;

    /// Points averaged into the head anchor.
    pub const HEAD_ANCHORS: [BodyPart; 4] = [
        BodyPart::LeftEye,
        BodyPart::RightEye,
        BodyPart::LeftEar,
        BodyPart::RightEar,
    ];

    /// Points standing in for the hands.
    pub const HAND_POINTS: [BodyPart; 4] = [
        BodyPart::LeftWrist,
        BodyPart::RightWrist,
        BodyPart::LeftIndex,
        BodyPart::RightIndex,
    ];

    /// Upper-body bones drawn by the skeleton overlay.
    pub const UPPER_BODY_BONES: [(BodyPart, BodyPart); 12] = [
        (BodyPart::LeftEar, BodyPart::LeftEye),
        (BodyPart::LeftEye, BodyPart::Nose),
        (BodyPart::Nose, BodyPart::RightEye),
        (BodyPart::RightEye, BodyPart::RightEar),
        (BodyPart::MouthLeft, BodyPart::MouthRight),
        (BodyPart::LeftShoulder, BodyPart::RightShoulder),
        (BodyPart::LeftShoulder, BodyPart::LeftElbow),
        (BodyPart::LeftElbow, BodyPart::LeftWrist),
        (BodyPart::LeftWrist, BodyPart::LeftIndex),
        (BodyPart::RightShoulder, BodyPart::RightElbow),
        (BodyPart::RightElbow, BodyPart::RightWrist),
        (BodyPart::RightWrist, BodyPart::RightIndex),
    ];

    /// Position of this part in a landmark list.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// A single normalized keypoint.
///
/// Accepts `{"x":..,"y":..,"visibility":..}` objects as well as the compact
/// `[x, y]` / `[x, y, visibility]` array form used by landmark dumps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "KeypointRepr")]
pub struct Keypoint {
    /// Normalized X coordinate [0.0, 1.0].
    pub x: f64,
    /// Normalized Y coordinate [0.0, 1.0].
    pub y: f64,
    /// Model confidence that the point is visible, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f32>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum KeypointRepr {
    Full {
        x: f64,
        y: f64,
        #[serde(default)]
        visibility: Option<f32>,
    },
    WithVisibility(f64, f64, f32),
    Bare(f64, f64),
}

impl From<KeypointRepr> for Keypoint {
    fn from(repr: KeypointRepr) -> Self {
        match repr {
            KeypointRepr::Full { x, y, visibility } => Self { x, y, visibility },
            KeypointRepr::WithVisibility(x, y, v) => Self::with_visibility(x, y, v),
            KeypointRepr::Bare(x, y) => Self::new(x, y),
        }
    }
}

/// Coordinates further than this from the frame are treated as corrupt.
/// Occluded points may legitimately sit a little outside `[0, 1]`.
pub const MAX_COORDINATE: f64 = 2.0;

impl Keypoint {
    /// Placeholder for a point the model did not report.
    pub const MISSING: Keypoint = Keypoint {
        x: f64::NAN,
        y: f64::NAN,
        visibility: None,
    };

    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            visibility: None,
        }
    }

    pub fn with_visibility(x: f64, y: f64, visibility: f32) -> Self {
        Self {
            x,
            y,
            visibility: Some(visibility),
        }
    }

    /// Euclidean distance in normalized units.
    pub fn distance_to(&self, other: &Keypoint) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Whether the point can be used: plausible coordinates and a defined confidence.
    pub fn is_usable(&self) -> bool {
        self.x.abs() <= MAX_COORDINATE
            && self.y.abs() <= MAX_COORDINATE
            && !self.visibility.is_some_and(f32::is_nan)
    }

    /// Pixel position in a frame of the given size.
    pub fn to_pixel(&self, width: u32, height: u32) -> (f32, f32) {
        ((self.x * width as f64) as f32, (self.y * height as f64) as f32)
    }
}

/// One person's keypoints for one frame, indexed by [`BodyPart`].
///
/// Deserializes from a JSON array in which `null` marks a point the model
/// did not report.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(transparent)]
pub struct Landmarks {
    points: Vec<Keypoint>,
}

impl<'de> Deserialize<'de> for Landmarks {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let points = Vec::<Option<Keypoint>>::deserialize(deserializer)?;
        Ok(Self {
            points: points
                .into_iter()
                .map(|point| point.unwrap_or(Keypoint::MISSING))
                .collect(),
        })
    }
}

impl Landmarks {
    pub fn new(points: Vec<Keypoint>) -> Self {
        Self { points }
    }

    /// Build a full schema from a handful of named points.
    ///
    /// Unnamed parts are filled with non-finite placeholders so they read as missing.
    pub fn from_parts(parts: &[(BodyPart, Keypoint)]) -> Self {
        let mut points = vec![Keypoint::MISSING; BodyPart::COUNT];
        for (part, point) in parts {
            points[part.index()] = *point;
        }
        Self { points }
    }

    /// A usable keypoint for `part`, or `None` if absent or undefined.
    pub fn get(&self, part: BodyPart) -> Option<Keypoint> {
        self.points
            .get(part.index())
            .copied()
            .filter(Keypoint::is_usable)
    }

    /// Replace the keypoint for `part`, growing the list if needed.
    pub fn set(&mut self, part: BodyPart, point: Keypoint) {
        let idx = part.index();
        if self.points.len() <= idx {
            self.points.resize(idx + 1, Keypoint::MISSING);
        }
        self.points[idx] = point;
    }

    /// Mirror all points horizontally (`x -> 1 - x`).
    pub fn mirrored(&self) -> Self {
        Self {
            points: self
                .points
                .iter()
                .map(|p| Keypoint { x: 1.0 - p.x, ..*p })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Keypoint] {
        &self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_indices_match_pose_model() {
        assert_eq!(BodyPart::Nose.index(), 0);
        assert_eq!(BodyPart::LeftEye.index(), 2);
        assert_eq!(BodyPart::RightEye.index(), 5);
        assert_eq!(BodyPart::LeftEar.index(), 7);
        assert_eq!(BodyPart::RightEar.index(), 8);
        assert_eq!(BodyPart::LeftShoulder.index(), 11);
        assert_eq!(BodyPart::RightShoulder.index(), 12);
        assert_eq!(BodyPart::LeftWrist.index(), 15);
        assert_eq!(BodyPart::RightWrist.index(), 16);
        assert_eq!(BodyPart::LeftIndex.index(), 19);
        assert_eq!(BodyPart::RightIndex.index(), 20);
        assert_eq!(BodyPart::RightFootIndex.index(), BodyPart::COUNT - 1);
    }

    #[test]
    fn keypoint_accepts_compact_and_object_forms() {
        let points: Vec<Keypoint> =
            serde_json::from_str(r#"[[0.1, 0.2], [0.3, 0.4, 0.9], {"x": 0.5, "y": 0.6}]"#)
                .unwrap();
        assert_eq!(points[0], Keypoint::new(0.1, 0.2));
        assert_eq!(points[1], Keypoint::with_visibility(0.3, 0.4, 0.9));
        assert_eq!(points[2], Keypoint::new(0.5, 0.6));
    }

    #[test]
    fn get_rejects_missing_and_undefined_points() {
        let mut landmarks = Landmarks::new(vec![Keypoint::new(0.5, 0.5); 3]);
        assert!(landmarks.get(BodyPart::Nose).is_some());
        assert!(landmarks.get(BodyPart::LeftShoulder).is_none());

        landmarks.set(BodyPart::Nose, Keypoint::with_visibility(0.5, 0.5, f32::NAN));
        assert!(landmarks.get(BodyPart::Nose).is_none());

        landmarks.set(BodyPart::LeftEye, Keypoint::new(f64::INFINITY, 0.5));
        assert!(landmarks.get(BodyPart::LeftEye).is_none());

        landmarks.set(BodyPart::RightEye, Keypoint::new(1e12, 0.5));
        assert!(landmarks.get(BodyPart::RightEye).is_none());

        landmarks.set(BodyPart::LeftEar, Keypoint::new(-0.1, 1.3));
        assert!(landmarks.get(BodyPart::LeftEar).is_some());
    }

    #[test]
    fn null_entries_deserialize_as_missing() {
        let landmarks: Landmarks =
            serde_json::from_str(r#"[null, [0.3, 0.4, 0.9], {"x": 0.5, "y": 0.6}]"#).unwrap();
        assert_eq!(landmarks.len(), 3);
        assert!(landmarks.get(BodyPart::Nose).is_none());
        assert_eq!(
            landmarks.get(BodyPart::LeftEyeInner),
            Some(Keypoint::with_visibility(0.3, 0.4, 0.9))
        );
    }

    #[test]
    fn set_grows_list() {
        let mut landmarks = Landmarks::default();
        landmarks.set(BodyPart::RightIndex, Keypoint::new(0.2, 0.3));
        assert_eq!(landmarks.len(), 21);
        assert_eq!(landmarks.get(BodyPart::RightIndex), Some(Keypoint::new(0.2, 0.3)));
        assert!(landmarks.get(BodyPart::Nose).is_none());
    }

    #[test]
    fn mirrored_flips_x_only() {
        let landmarks = Landmarks::from_parts(&[(BodyPart::Nose, Keypoint::new(0.2, 0.7))]);
        let mirrored = landmarks.mirrored();
        let nose = mirrored.get(BodyPart::Nose).unwrap();
        assert!((nose.x - 0.8).abs() < 1e-12);
        assert_eq!(nose.y, 0.7);
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Keypoint::new(0.0, 0.0);
        let b = Keypoint::new(0.3, 0.4);
        assert!((a.distance_to(&b) - 0.5).abs() < 1e-12);
    }
}
