//! Gaze-estimation core: eye metrics, blink clicks, calibration and smoothing.

pub mod blink;
pub mod calibration;
pub mod ear;
pub mod homography;
pub mod point;
pub mod smoother;

pub use point::{Image, Normalized, Point2, ScreenPoint, ScreenSize};
