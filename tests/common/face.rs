use iris_pointer::frame::Frame;
use iris_pointer::gaze::ScreenPoint;
use iris_pointer::landmarks::{
    LandmarkSet, LEFT_EYE, LEFT_IRIS_CENTER, REQUIRED_LANDMARKS, RIGHT_EYE, RIGHT_IRIS_CENTER,
};

pub const IMAGE_WIDTH: f64 = 640.0;
pub const IMAGE_HEIGHT: f64 = 480.0;
pub const SCREEN_WIDTH: i32 = 1920;
pub const SCREEN_HEIGHT: i32 = 1080;

/// Normalized iris midpoint a synthetic user produces while looking at `target`.
///
/// Affine in the target, so eye space → screen space is an exact homography.
pub fn eye_for_target(target: ScreenPoint) -> [f64; 2] {
    [
        0.45 + 0.1 * f64::from(target.x) / f64::from(SCREEN_WIDTH),
        0.40 + 0.1 * f64::from(target.y) / f64::from(SCREEN_HEIGHT),
    ]
}

/// Full face-mesh landmark list with both eye contours and iris centers set.
pub fn face_landmarks(eye_center: [f64; 2], open: bool) -> Vec<[f64; 2]> {
    let mut raw = vec![[0.5, 0.5]; REQUIRED_LANDMARKS];
    let lid = if open { 0.02 } else { 0.001 };
    for (indices, cx) in [(LEFT_EYE, 0.6), (RIGHT_EYE, 0.4)] {
        let contour = [
            [cx - 0.03, 0.4],
            [cx - 0.01, 0.4 - lid],
            [cx + 0.01, 0.4 - lid],
            [cx + 0.03, 0.4],
            [cx + 0.01, 0.4 + lid],
            [cx - 0.01, 0.4 + lid],
        ];
        for (idx, p) in indices.iter().zip(contour) {
            raw[*idx] = p;
        }
    }
    raw[LEFT_IRIS_CENTER] = [eye_center[0] + 0.05, eye_center[1]];
    raw[RIGHT_IRIS_CENTER] = [eye_center[0] - 0.05, eye_center[1]];
    raw
}

pub fn face_frame(timestamp_ms: u64, eye_center: [f64; 2], open: bool) -> Frame {
    Frame {
        timestamp_ms,
        image_width: IMAGE_WIDTH,
        image_height: IMAGE_HEIGHT,
        landmarks: Some(LandmarkSet::from(face_landmarks(eye_center, open))),
        capture: false,
        restart: false,
    }
}

pub fn looking_at(timestamp_ms: u64, target: ScreenPoint) -> Frame {
    face_frame(timestamp_ms, eye_for_target(target), true)
}

pub fn capture_frame(timestamp_ms: u64, target: ScreenPoint) -> Frame {
    Frame {
        capture: true,
        ..looking_at(timestamp_ms, target)
    }
}

pub fn no_face_frame(timestamp_ms: u64) -> Frame {
    Frame {
        image_width: IMAGE_WIDTH,
        image_height: IMAGE_HEIGHT,
        ..Frame::empty(timestamp_ms)
    }
}
