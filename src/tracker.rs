//! Per-frame orchestration: CALIBRATING / TRACKING state machine.
//!
//! Each frame runs to completion: eye metrics → blink check → mode-specific
//! calibration capture or gaze mapping/smoothing → pointer actuation.

use crate::constants::{
    DEFAULT_CAPTURE_DEBOUNCE_MS, DEFAULT_SCREEN_HEIGHT, DEFAULT_SCREEN_WIDTH,
    DEFAULT_SMOOTHING_WINDOW, DEFAULT_TARGET_MARGIN_PX,
};
use crate::frame::Frame;
use crate::gaze::blink::{BlinkConfig, BlinkDetector};
use crate::gaze::calibration::{Calibration, CalibrationError, FitReport};
use crate::gaze::homography::RansacConfig;
use crate::gaze::smoother::GazeSmoother;
use crate::gaze::{ScreenPoint, ScreenSize};
use crate::landmarks::EyeObservation;
use crate::pointer::{PointerDevice, PointerError};

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    pub screen: ScreenSize,
    pub blink: BlinkConfig,
    pub ransac: RansacConfig,
    pub smoothing_window: usize,
    /// Inset of the outer calibration targets from the screen edges.
    pub target_margin_px: i32,
    pub capture_debounce_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            screen: ScreenSize::new(DEFAULT_SCREEN_WIDTH, DEFAULT_SCREEN_HEIGHT),
            blink: BlinkConfig::default(),
            ransac: RansacConfig::default(),
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
            target_margin_px: DEFAULT_TARGET_MARGIN_PX,
            capture_debounce_ms: DEFAULT_CAPTURE_DEBOUNCE_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Calibrating {
        target_index: usize,
        /// Captures before this timestamp are ignored.
        cooldown_until_ms: u64,
    },
    Tracking,
}

impl Mode {
    fn calibrating_from_start() -> Self {
        Self::Calibrating {
            target_index: 0,
            cooldown_until_ms: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Calibrating { .. } => "calibrating",
            Self::Tracking => "tracking",
        }
    }
}

/// What a single frame did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutcome {
    /// `None` when no face was detected.
    pub ear: Option<f64>,
    pub clicked: bool,
    /// Index of the calibration target captured this frame.
    pub captured: Option<usize>,
    /// Result of the fit run after the last target was captured.
    pub fit: Option<Result<FitReport, CalibrationError>>,
    pub moved_to: Option<ScreenPoint>,
    pub restarted: bool,
}

/// 3×3 grid: corners, edge midpoints and center, inset by `margin`, row by row.
pub fn calibration_targets(screen: ScreenSize, margin: i32) -> Vec<ScreenPoint> {
    let xs = [margin, screen.width / 2, screen.width - margin];
    let ys = [margin, screen.height / 2, screen.height - margin];
    ys.iter()
        .flat_map(|&y| xs.iter().map(move |&x| ScreenPoint::new(x, y)))
        .collect()
}

pub struct Tracker {
    config: TrackerConfig,
    targets: Vec<ScreenPoint>,
    mode: Mode,
    blink: BlinkDetector,
    calibration: Calibration,
    smoother: GazeSmoother,
}

impl Tracker {
    pub fn new(config: TrackerConfig) -> Self {
        let targets = calibration_targets(config.screen, config.target_margin_px);
        Self {
            targets,
            mode: Mode::calibrating_from_start(),
            blink: BlinkDetector::new(config.blink),
            calibration: Calibration::new(config.ransac.clone()),
            smoother: GazeSmoother::new(config.smoothing_window),
            config,
        }
    }

    pub fn process_frame(&mut self, frame: &Frame, pointer: &mut dyn PointerDevice) -> FrameOutcome {
        let mut outcome = FrameOutcome::default();

        if frame.restart {
            self.restart();
            outcome.restarted = true;
        }

        let observation = frame
            .landmarks
            .as_ref()
            .and_then(|set| set.observe(frame.image_width, frame.image_height));
        let Some(obs) = observation else {
            if frame.capture {
                tracing::debug!("Capture requested without a detected face, ignored");
            }
            return outcome;
        };
        outcome.ear = Some(obs.ear);

        if self.blink.update(obs.ear).is_some() {
            outcome.clicked = true;
            report_pointer_error(pointer.click());
        }

        let mode = self.mode;
        match mode {
            Mode::Calibrating {
                target_index,
                cooldown_until_ms,
            } => {
                if frame.capture {
                    if frame.timestamp_ms < cooldown_until_ms {
                        tracing::debug!(
                            timestamp_ms = frame.timestamp_ms,
                            cooldown_until_ms,
                            "Capture debounced"
                        );
                    } else {
                        self.capture(target_index, &obs, frame.timestamp_ms, &mut outcome);
                    }
                }
            }
            Mode::Tracking => {
                let mapped = self.calibration.map(obs.eye_point);
                if let Some(p) = self.smoother.push_and_average(mapped) {
                    let p = p.clamp_to(self.config.screen);
                    report_pointer_error(pointer.move_to(p));
                    outcome.moved_to = Some(p);
                }
            }
        }

        tracing::debug!(
            ear = obs.ear,
            mode = self.mode.name(),
            calibration_target = ?self.current_target(),
            clicked = outcome.clicked,
            blinks = self.blink.total_blinks(),
            "Frame processed"
        );

        outcome
    }

    fn capture(
        &mut self,
        target_index: usize,
        obs: &EyeObservation,
        timestamp_ms: u64,
        outcome: &mut FrameOutcome,
    ) {
        let Some(&target) = self.targets.get(target_index) else {
            return;
        };
        self.calibration.add_sample(target, obs.eye_point);
        outcome.captured = Some(target_index);
        tracing::info!(
            index = target_index,
            total = self.targets.len(),
            screen_point = %target,
            eye_x = obs.eye_point.x,
            eye_y = obs.eye_point.y,
            "Captured calibration point"
        );

        let next = target_index + 1;
        let cooldown_until_ms = timestamp_ms.saturating_add(self.config.capture_debounce_ms);
        if next < self.targets.len() {
            self.mode = Mode::Calibrating {
                target_index: next,
                cooldown_until_ms,
            };
            return;
        }

        let result = self.calibration.fit();
        match &result {
            Ok(_) => {
                self.smoother.clear();
                self.mode = Mode::Tracking;
                tracing::info!("Calibration done, tracking");
            }
            Err(e) => {
                // Retry the whole grid from scratch.
                tracing::warn!(error = %e, "Calibration failed, restarting target sequence");
                self.calibration.reset();
                self.mode = Mode::Calibrating {
                    target_index: 0,
                    cooldown_until_ms,
                };
            }
        }
        outcome.fit = Some(result);
    }

    /// Back to CALIBRATING from any mode with a fresh sample set.
    pub fn restart(&mut self) {
        self.calibration.reset();
        self.smoother.clear();
        self.mode = Mode::calibrating_from_start();
        tracing::info!("Restarting calibration");
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_tracking(&self) -> bool {
        self.mode == Mode::Tracking
    }

    /// Target the operator should look at, while calibrating.
    pub fn current_target(&self) -> Option<ScreenPoint> {
        match self.mode {
            Mode::Calibrating { target_index, .. } => self.targets.get(target_index).copied(),
            Mode::Tracking => None,
        }
    }

    pub fn targets(&self) -> &[ScreenPoint] {
        &self.targets
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn blink(&self) -> &BlinkDetector {
        &self.blink
    }

    pub fn smoother(&self) -> &GazeSmoother {
        &self.smoother
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }
}

fn report_pointer_error(result: Result<(), PointerError>) {
    match result {
        Ok(()) => {}
        Err(PointerError::Failsafe(reason)) => {
            tracing::warn!(%reason, "Pointer failsafe suppressed");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Pointer command failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_form_inset_grid() {
        let targets = calibration_targets(ScreenSize::new(1920, 1080), 20);
        assert_eq!(targets.len(), 9);
        assert_eq!(targets[0], ScreenPoint::new(20, 20));
        assert_eq!(targets[1], ScreenPoint::new(960, 20));
        assert_eq!(targets[2], ScreenPoint::new(1900, 20));
        assert_eq!(targets[4], ScreenPoint::new(960, 540));
        assert_eq!(targets[8], ScreenPoint::new(1900, 1060));
    }

    #[test]
    fn starts_calibrating_at_first_target() {
        let tracker = Tracker::new(TrackerConfig::default());
        assert_eq!(
            tracker.mode(),
            Mode::Calibrating {
                target_index: 0,
                cooldown_until_ms: 0
            }
        );
        assert_eq!(tracker.current_target(), Some(ScreenPoint::new(20, 20)));
        assert!(!tracker.is_tracking());
    }

    #[test]
    fn restart_without_face_still_resets() {
        let mut tracker = Tracker::new(TrackerConfig::default());
        let mut pointer = crate::pointer::DryRunPointer::default();
        let mut frame = Frame::empty(10);
        frame.restart = true;
        let outcome = tracker.process_frame(&frame, &mut pointer);
        assert!(outcome.restarted);
        assert_eq!(outcome.ear, None);
        assert_eq!(tracker.current_target(), Some(ScreenPoint::new(20, 20)));
    }
}
