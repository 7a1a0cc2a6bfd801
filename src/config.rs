use std::env;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_CAPTURE_DEBOUNCE_MS, DEFAULT_CONSECUTIVE_FRAMES, DEFAULT_EAR_THRESHOLD,
    DEFAULT_INLIER_THRESHOLD_PX, DEFAULT_RANSAC_ITERATIONS, DEFAULT_SCREEN_HEIGHT,
    DEFAULT_SCREEN_WIDTH, DEFAULT_SMOOTHING_WINDOW, DEFAULT_TARGET_MARGIN_PX,
    MIN_CALIBRATION_SAMPLES,
};
use crate::gaze::blink::BlinkConfig;
use crate::gaze::homography::RansacConfig;
use crate::gaze::ScreenSize;
use crate::logging::LogConfig;
use crate::tracker::TrackerConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub screen: ScreenSize,
    pub blink: BlinkConfig,
    pub calibration: CalibrationEnvConfig,
    pub smoothing_window: usize,
    /// Log pointer commands instead of writing them to stdout.
    pub pointer_dry_run: bool,
}

#[derive(Debug, Clone)]
pub struct CalibrationEnvConfig {
    pub inlier_threshold_px: f64,
    pub ransac_iterations: usize,
    pub ransac_seed: u64,
    pub target_margin_px: i32,
    pub capture_debounce_ms: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            screen: ScreenSize::new(
                env_or_parse("SCREEN_WIDTH", DEFAULT_SCREEN_WIDTH),
                env_or_parse("SCREEN_HEIGHT", DEFAULT_SCREEN_HEIGHT),
            ),
            blink: BlinkConfig {
                ear_threshold: env_or_parse("EAR_THRESHOLD", DEFAULT_EAR_THRESHOLD),
                consecutive_frames: env_or_parse(
                    "BLINK_CONSECUTIVE_FRAMES",
                    DEFAULT_CONSECUTIVE_FRAMES,
                ),
            },
            calibration: CalibrationEnvConfig {
                inlier_threshold_px: env_or_parse(
                    "CALIBRATION_INLIER_THRESHOLD_PX",
                    DEFAULT_INLIER_THRESHOLD_PX,
                ),
                ransac_iterations: env_or_parse(
                    "CALIBRATION_RANSAC_ITERS",
                    DEFAULT_RANSAC_ITERATIONS,
                ),
                ransac_seed: env_or_parse("CALIBRATION_RANSAC_SEED", 0_u64),
                target_margin_px: env_or_parse(
                    "CALIBRATION_TARGET_MARGIN_PX",
                    DEFAULT_TARGET_MARGIN_PX,
                ),
                capture_debounce_ms: env_or_parse(
                    "CAPTURE_DEBOUNCE_MS",
                    DEFAULT_CAPTURE_DEBOUNCE_MS,
                ),
            },
            smoothing_window: env_or_parse("SMOOTHING_WINDOW", DEFAULT_SMOOTHING_WINDOW),
            pointer_dry_run: env_or_bool("POINTER_DRY_RUN", false),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.screen.width <= 0 || self.screen.height <= 0 {
            return Err(format!(
                "screen size must be positive, got {}x{}",
                self.screen.width, self.screen.height
            ));
        }
        if !self.blink.ear_threshold.is_finite() || self.blink.ear_threshold <= 0.0 {
            return Err(format!(
                "EAR_THRESHOLD must be a positive number, got {}",
                self.blink.ear_threshold
            ));
        }
        if self.blink.consecutive_frames == 0 {
            return Err("BLINK_CONSECUTIVE_FRAMES must be at least 1".to_string());
        }
        if self.smoothing_window == 0 {
            return Err("SMOOTHING_WINDOW must be at least 1".to_string());
        }
        let cal = &self.calibration;
        if !cal.inlier_threshold_px.is_finite() || cal.inlier_threshold_px <= 0.0 {
            return Err(format!(
                "CALIBRATION_INLIER_THRESHOLD_PX must be positive, got {}",
                cal.inlier_threshold_px
            ));
        }
        if cal.ransac_iterations == 0 {
            return Err("CALIBRATION_RANSAC_ITERS must be at least 1".to_string());
        }
        let margin = cal.target_margin_px;
        let shortest_side = self.screen.width.min(self.screen.height);
        if margin < 0 || margin.checked_mul(2).map_or(true, |m| m >= shortest_side) {
            return Err(format!(
                "CALIBRATION_TARGET_MARGIN_PX {margin} puts targets off a {}x{} screen",
                self.screen.width, self.screen.height
            ));
        }
        Ok(())
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            log_level: self.log_level.clone(),
            enable_file_logs: self.enable_file_logs,
            log_dir: self.log_dir.clone(),
        }
    }

    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            screen: self.screen,
            blink: self.blink,
            ransac: RansacConfig {
                max_iterations: self.calibration.ransac_iterations,
                inlier_threshold_px: self.calibration.inlier_threshold_px,
                min_inliers: MIN_CALIBRATION_SAMPLES,
                seed: self.calibration.ransac_seed,
            },
            smoothing_window: self.smoothing_window,
            target_margin_px: self.calibration.target_margin_px,
            capture_debounce_ms: self.calibration.capture_debounce_ms,
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                tracing::warn!(key, value = %raw, "Unrecognized boolean env var, using default");
                default
            }
        },
        Err(_) => default,
    }
}
