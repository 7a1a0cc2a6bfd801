//! 标定模块
//!
//! 收集 (屏幕点, 眼部特征点) 样本对，鲁棒拟合眼部空间到屏幕空间的单应性，
//! 并用它把实时眼部特征点映射到屏幕坐标。

use nalgebra::Matrix3;
use thiserror::Error;

use super::homography::{fit_homography_ransac, project, HomographyError, RansacConfig};
use super::point::{Image, Point2, ScreenPoint};
use crate::constants::MIN_CALIBRATION_SAMPLES;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    #[error("not enough calibration samples: need {needed}, got {got}")]
    TooFewSamples { needed: usize, got: usize },
    #[error("calibration samples are degenerate: {0}")]
    Degenerate(String),
    #[error("too few consistent samples: need {needed}, found {found}")]
    InsufficientInliers { needed: usize, found: usize },
}

impl From<HomographyError> for CalibrationError {
    fn from(e: HomographyError) -> Self {
        match e {
            HomographyError::TooFewPoints { needed, got } => Self::TooFewSamples { needed, got },
            HomographyError::InsufficientInliers { needed, found } => {
                Self::InsufficientInliers { needed, found }
            }
            HomographyError::Degenerate(msg) => Self::Degenerate(msg),
            e @ HomographyError::LengthMismatch { .. } => Self::Degenerate(e.to_string()),
        }
    }
}

/// 一个标定样本
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationSample {
    pub screen_point: ScreenPoint,
    pub eye_point: Point2<Image>,
}

/// 成功拟合的摘要
#[derive(Debug, Clone, PartialEq)]
pub struct FitReport {
    pub samples: usize,
    pub inliers: usize,
    /// 内点平均重投影误差（屏幕像素）
    pub mean_error_px: f64,
}

#[derive(Debug, Clone)]
pub struct Calibration {
    ransac: RansacConfig,
    samples: Vec<CalibrationSample>,
    homography: Option<Matrix3<f64>>,
}

impl Calibration {
    pub fn new(ransac: RansacConfig) -> Self {
        Self {
            ransac,
            samples: Vec::new(),
            homography: None,
        }
    }

    /// 追加样本，不校验重复或范围
    pub fn add_sample(&mut self, screen_point: ScreenPoint, eye_point: Point2<Image>) {
        self.samples.push(CalibrationSample {
            screen_point,
            eye_point,
        });
    }

    /// 用当前全部样本拟合单应性
    ///
    /// 失败时保留原有模型不变；成功时替换。样本不会被自动清空，
    /// 未调用 [`Calibration::reset`] 时再次采集的样本会与旧样本一起参与拟合。
    pub fn fit(&mut self) -> Result<FitReport, CalibrationError> {
        if self.samples.len() < MIN_CALIBRATION_SAMPLES {
            return Err(CalibrationError::TooFewSamples {
                needed: MIN_CALIBRATION_SAMPLES,
                got: self.samples.len(),
            });
        }

        let (src, dst): (Vec<[f64; 2]>, Vec<[f64; 2]>) = self
            .samples
            .iter()
            .map(|s| {
                (
                    s.eye_point.to_array(),
                    [f64::from(s.screen_point.x), f64::from(s.screen_point.y)],
                )
            })
            .unzip();

        let result = fit_homography_ransac(&src, &dst, &self.ransac)?;
        let report = FitReport {
            samples: self.samples.len(),
            inliers: result.n_inliers,
            mean_error_px: result.mean_inlier_error(),
        };
        self.homography = Some(result.h);

        tracing::info!(
            samples = report.samples,
            inliers = report.inliers,
            mean_error_px = report.mean_error_px,
            "Calibration fitted"
        );
        Ok(report)
    }

    /// 把眼部特征点映射到屏幕坐标
    ///
    /// 未标定，或点被映射到无穷远（w' = 0）时返回 `None`。
    pub fn map(&self, eye_point: Point2<Image>) -> Option<ScreenPoint> {
        let h = self.homography.as_ref()?;
        let [x, y] = project(h, eye_point.x, eye_point.y)?;
        Some(ScreenPoint::new(x.round() as i32, y.round() as i32))
    }

    /// 清空样本并作废模型
    pub fn reset(&mut self) {
        self.samples.clear();
        self.homography = None;
    }

    pub fn is_calibrated(&self) -> bool {
        self.homography.is_some()
    }

    pub fn samples(&self) -> &[CalibrationSample] {
        &self.samples
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn matrix(&self) -> Option<&Matrix3<f64>> {
        self.homography.as_ref()
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::new(RansacConfig::default())
    }
}
