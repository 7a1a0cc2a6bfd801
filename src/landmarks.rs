//! Face-mesh landmark access.
//!
//! The external detector supplies a normalized landmark set per frame. Eye
//! contour and iris indices follow the MediaPipe Face Mesh topology with
//! refined iris landmarks.

use crate::gaze::ear::{binocular_ear, eye_feature_point, iris_center_pixel, EyeContour};
use crate::gaze::{Image, Normalized, Point2};

/// Left eye contour: outer corner, upper lid ×2, inner corner, lower lid ×2.
pub const LEFT_EYE: [usize; 6] = [362, 385, 387, 263, 373, 380];
pub const RIGHT_EYE: [usize; 6] = [33, 160, 158, 133, 153, 144];
pub const LEFT_IRIS_CENTER: usize = 468;
pub const RIGHT_IRIS_CENTER: usize = 473;

/// Smallest landmark count that covers every index used above.
pub const REQUIRED_LANDMARKS: usize = RIGHT_IRIS_CENTER + 1;

#[derive(Debug, Clone, Default)]
pub struct LandmarkSet {
    points: Vec<Point2<Normalized>>,
}

/// Per-frame eye measurements derived from one landmark set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeObservation {
    /// Mean EAR of both eyes.
    pub ear: f64,
    pub left_iris: Point2<Image>,
    pub right_iris: Point2<Image>,
    /// Midpoint of both iris centers, the raw eye point.
    pub eye_point: Point2<Image>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Point2<Normalized>>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Point2<Normalized>> {
        self.points.get(index).copied()
    }

    pub fn eye_contour(&self, indices: &[usize; 6]) -> Option<EyeContour<Normalized>> {
        let mut points = [Point2::new(0.0, 0.0); 6];
        for (slot, &idx) in points.iter_mut().zip(indices) {
            *slot = self.get(idx)?;
        }
        Some(EyeContour::new(points))
    }

    /// Measure EAR and iris positions; `None` when the set lacks a required index.
    pub fn observe(&self, image_width: f64, image_height: f64) -> Option<EyeObservation> {
        let left = self.eye_contour(&LEFT_EYE)?;
        let right = self.eye_contour(&RIGHT_EYE)?;
        let left_iris = iris_center_pixel(self.get(LEFT_IRIS_CENTER)?, image_width, image_height);
        let right_iris = iris_center_pixel(self.get(RIGHT_IRIS_CENTER)?, image_width, image_height);

        Some(EyeObservation {
            ear: binocular_ear(&left, &right),
            left_iris,
            right_iris,
            eye_point: eye_feature_point(left_iris, right_iris),
        })
    }
}

impl From<Vec<[f64; 2]>> for LandmarkSet {
    fn from(raw: Vec<[f64; 2]>) -> Self {
        Self::new(raw.into_iter().map(Point2::from).collect())
    }
}
