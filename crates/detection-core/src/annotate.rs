//! Overlay drawing for display and screenshots.
//!
//! Display-only: nothing here feeds back into detection. Zone radii are
//! normalized, so they are converted to pixels with the mean of the frame
//! width and height.

use handsoff_common::config::DisplayConfig;
use handsoff_pose_model::landmarks::{BodyPart, Keypoint, Landmarks};
use handsoff_pose_model::source::Frame;
use handsoff_pose_model::state::DetectorState;
use image::Rgb;
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_circle_mut, draw_line_segment_mut,
};
use imageproc::rect::Rect;

use crate::engine::FrameOutcome;

const BONE: Rgb<u8> = Rgb([220, 220, 220]);
const HEAD_POINT: Rgb<u8> = Rgb([230, 40, 40]);
const HAND_POINT: Rgb<u8> = Rgb([40, 90, 230]);
const SHOULDER_LINE: Rgb<u8> = Rgb([0, 230, 230]);
const HEAD_ZONE: Rgb<u8> = Rgb([40, 220, 40]);
const FACE_ZONE: Rgb<u8> = Rgb([230, 40, 40]);
const GAUGE_TRACK: Rgb<u8> = Rgb([70, 70, 70]);
const GAUGE_FAR: Rgb<u8> = Rgb([240, 240, 240]);
const THRESHOLD_MARK: Rgb<u8> = Rgb([255, 255, 255]);
const TRIGGER_TICK: Rgb<u8> = Rgb([230, 40, 40]);

const PANEL_X: u32 = 5;
const PANEL_Y: u32 = 5;
const PANEL_W: u32 = 150;
const PANEL_H: u32 = 62;
const GAUGE_W: u32 = 120;
const MAX_TICKS: u64 = 20;

/// Indicator color per state: green, yellow, red.
pub fn state_color(state: DetectorState) -> Rgb<u8> {
    match state {
        DetectorState::Normal => Rgb([40, 220, 40]),
        DetectorState::Warning => Rgb([240, 220, 30]),
        DetectorState::Detected => Rgb([230, 40, 40]),
    }
}

/// Draw the overlay for one processed frame in place.
pub fn annotate(
    frame: &mut Frame,
    landmarks: Option<&Landmarks>,
    outcome: &FrameOutcome,
    display: &DisplayConfig,
    distance_threshold: f64,
) {
    if display.show_skeleton {
        if let Some(landmarks) = landmarks {
            draw_skeleton(frame, landmarks);
            if outcome.reading.is_some() {
                draw_zones(frame, landmarks, outcome);
            }
        }
    }
    draw_panel(frame, outcome, display.show_distance, distance_threshold);
}

fn pixel(frame: &Frame, point: &Keypoint) -> (f32, f32) {
    point.to_pixel(frame.width(), frame.height())
}

fn draw_skeleton(frame: &mut Frame, landmarks: &Landmarks) {
    for (a, b) in BodyPart::UPPER_BODY_BONES {
        if let (Some(a), Some(b)) = (landmarks.get(a), landmarks.get(b)) {
            let (start, end) = (pixel(frame, &a), pixel(frame, &b));
            draw_line_segment_mut(frame, start, end, BONE);
        }
    }

    let heads = [BodyPart::Nose, BodyPart::LeftEar, BodyPart::RightEar];
    for (parts, color) in [
        (&heads[..], HEAD_POINT),
        (&BodyPart::HAND_POINTS[..], HAND_POINT),
    ] {
        for part in parts {
            if let Some(point) = landmarks.get(*part) {
                let (x, y) = pixel(frame, &point);
                draw_filled_circle_mut(frame, (x as i32, y as i32), 6, color);
            }
        }
    }
}

fn draw_zones(frame: &mut Frame, landmarks: &Landmarks, outcome: &FrameOutcome) {
    let Some(reading) = outcome.reading.as_ref() else {
        return;
    };
    let scale = (frame.width() + frame.height()) as f64 / 2.0;

    if let (Some(left), Some(right)) = (
        landmarks.get(BodyPart::LeftShoulder),
        landmarks.get(BodyPart::RightShoulder),
    ) {
        let (start, end) = (pixel(frame, &left), pixel(frame, &right));
        draw_line_segment_mut(frame, start, end, SHOULDER_LINE);
    }

    let (hx, hy) = pixel(frame, &reading.head_center);
    let head_radius = (reading.zones.head_zone_radius * scale) as i32;
    draw_hollow_circle_mut(frame, (hx as i32, hy as i32), head_radius, HEAD_ZONE);

    let (fx, fy) = pixel(frame, &reading.face_center);
    let face_radius = (reading.zones.face_zone_radius * scale) as i32;
    draw_hollow_circle_mut(frame, (fx as i32, fy as i32), face_radius, FACE_ZONE);
}

fn draw_panel(frame: &mut Frame, outcome: &FrameOutcome, show_distance: bool, threshold: f64) {
    darken(frame, PANEL_X, PANEL_Y, PANEL_W, PANEL_H);

    let state = outcome.snapshot.state;
    draw_filled_circle_mut(frame, (20, 20), 8, state_color(state));

    if show_distance {
        let gauge_x = 35;
        let gauge_y = 16;
        draw_filled_rect_mut(frame, Rect::at(gauge_x, gauge_y).of_size(GAUGE_W, 8), GAUGE_TRACK);

        // The threshold sits at the middle of the gauge.
        if let Some(distance) = outcome.snapshot.distance {
            let fraction = (distance / (2.0 * threshold)).clamp(0.0, 1.0);
            let filled = (fraction * GAUGE_W as f64).round() as u32;
            if filled > 0 {
                let color = if distance < threshold {
                    state_color(DetectorState::Warning)
                } else {
                    GAUGE_FAR
                };
                draw_filled_rect_mut(frame, Rect::at(gauge_x, gauge_y).of_size(filled, 8), color);
            }
        }
        let mark_x = (gauge_x + GAUGE_W as i32 / 2) as f32;
        draw_line_segment_mut(
            frame,
            (mark_x, gauge_y as f32 - 2.0),
            (mark_x, gauge_y as f32 + 10.0),
            THRESHOLD_MARK,
        );
    }

    let ticks = outcome.snapshot.trigger_count.min(MAX_TICKS) as i32;
    for i in 0..ticks {
        draw_filled_rect_mut(frame, Rect::at(12 + i * 6, 40).of_size(4, 4), TRIGGER_TICK);
    }

    // Dwell bar, 20 px per second.
    let duration = outcome.snapshot.duration;
    if duration > 0.0 {
        let width = ((duration * 20.0).round() as u32).clamp(1, PANEL_W - 14);
        draw_filled_rect_mut(frame, Rect::at(12, 52).of_size(width, 4), state_color(state));
    }
}

/// Halve the brightness of a rectangle, clipped to the frame.
fn darken(frame: &mut Frame, x: u32, y: u32, w: u32, h: u32) {
    let x_end = (x + w).min(frame.width());
    let y_end = (y + h).min(frame.height());
    for py in y.min(y_end)..y_end {
        for px in x.min(x_end)..x_end {
            let p = frame.get_pixel_mut(px, py);
            p.0 = p.0.map(|c| c / 2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{DetectionEngine, EngineConfig};

    fn scratching_pose() -> Landmarks {
        Landmarks::from_parts(&[
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
            (BodyPart::RightIndex, Keypoint::new(0.5, 0.15)),
        ])
    }

    #[test]
    fn overlay_marks_state_and_zones() {
        let pose = scratching_pose();
        let mut engine = DetectionEngine::new(EngineConfig::default());
        let outcome = engine.process(0.0, Some(&pose));

        let mut frame = Frame::from_pixel(320, 240, Rgb([0, 0, 0]));
        annotate(&mut frame, Some(&pose), &outcome, &DisplayConfig::default(), 0.22);

        assert_eq!(*frame.get_pixel(20, 20), state_color(DetectorState::Warning));
        // Nose marker.
        assert_eq!(*frame.get_pixel(160, 77), HEAD_POINT);
    }

    #[test]
    fn skeleton_toggle_hides_landmark_drawing() {
        let pose = scratching_pose();
        let mut engine = DetectionEngine::new(EngineConfig::default());
        let outcome = engine.process(0.0, Some(&pose));

        let display = DisplayConfig {
            show_skeleton: false,
            ..Default::default()
        };
        let mut frame = Frame::from_pixel(320, 240, Rgb([0, 0, 0]));
        annotate(&mut frame, Some(&pose), &outcome, &display, 0.22);
        assert_eq!(*frame.get_pixel(160, 77), Rgb([0, 0, 0]));
    }

    #[test]
    fn corrupt_coordinates_are_not_drawn() {
        let render = |wrist: Keypoint| {
            let mut pose = scratching_pose();
            pose.set(BodyPart::LeftElbow, Keypoint::new(0.3, 0.7));
            pose.set(BodyPart::LeftWrist, wrist);
            let mut engine = DetectionEngine::new(EngineConfig::default());
            let outcome = engine.process(0.0, Some(&pose));
            let mut frame = Frame::from_pixel(320, 240, Rgb([0, 0, 0]));
            annotate(&mut frame, Some(&pose), &outcome, &DisplayConfig::default(), 0.22);
            frame
        };

        assert_eq!(render(Keypoint::new(1e12, -1e12)), render(Keypoint::MISSING));
    }

    #[test]
    fn tiny_frames_do_not_panic() {
        let mut engine = DetectionEngine::new(EngineConfig::default());
        let outcome = engine.process(0.0, None);
        let mut frame = Frame::from_pixel(8, 8, Rgb([200, 200, 200]));
        annotate(&mut frame, None, &outcome, &DisplayConfig::default(), 0.22);
        assert_eq!(*frame.get_pixel(7, 7), Rgb([100, 100, 100]));
    }
}
