//! 眼动指针控制库
//!
//! 将每帧的面部关键点转换为屏幕指针控制：EAR 眨眼点击、单应性标定映射、
//! 注视点平滑，以及串联三者的 CALIBRATING / TRACKING 状态机。

pub mod config;
pub mod constants;
pub mod frame;
pub mod gaze;
pub mod landmarks;
pub mod logging;
pub mod pointer;
pub mod tracker;

pub use gaze::blink::BlinkDetector;
pub use gaze::calibration::Calibration;
pub use gaze::smoother::GazeSmoother;
pub use tracker::Tracker;
