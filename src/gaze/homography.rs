//! Eye-space to screen-space homography estimation.
//!
//! - Direct Linear Transform (DLT) with Hartley normalization from ≥4 correspondences.
//! - RANSAC wrapper that keeps the candidate with the most inliers and refits on them.
//! - Reprojection error helpers.

use nalgebra::{DMatrix, Matrix3, SymmetricEigen, Vector3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::constants::{
    DEFAULT_INLIER_THRESHOLD_PX, DEFAULT_RANSAC_ITERATIONS, MIN_CALIBRATION_SAMPLES,
};

/// Sine of the smallest angle at which three points still count as non-collinear.
const COLLINEAR_SIN_EPS: f64 = 1e-6;

/// |w'| below this is treated as a point at infinity.
const W_EPS: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HomographyError {
    #[error("too few correspondences: need {needed}, got {got}")]
    TooFewPoints { needed: usize, got: usize },
    #[error("source and destination lengths differ: {src} vs {dst}")]
    LengthMismatch { src: usize, dst: usize },
    #[error("degenerate correspondences: {0}")]
    Degenerate(String),
    #[error("insufficient inliers: need {needed}, found {found}")]
    InsufficientInliers { needed: usize, found: usize },
}

/// Apply `h` to `(x, y, 1)`; `None` when the point maps to infinity.
pub fn project(h: &Matrix3<f64>, x: f64, y: f64) -> Option<[f64; 2]> {
    let p = h * Vector3::new(x, y, 1.0);
    if p[2].abs() < W_EPS {
        return None;
    }
    let out = [p[0] / p[2], p[1] / p[2]];
    if out[0].is_finite() && out[1].is_finite() {
        Some(out)
    } else {
        None
    }
}

/// ||project(H, src) - dst||, infinite when `src` maps to infinity.
pub fn reprojection_error(h: &Matrix3<f64>, src: &[f64; 2], dst: &[f64; 2]) -> f64 {
    match project(h, src[0], src[1]) {
        Some(p) => (p[0] - dst[0]).hypot(p[1] - dst[1]),
        None => f64::INFINITY,
    }
}

/// Translate centroid to origin and scale mean distance to sqrt(2).
fn normalize_points(pts: &[[f64; 2]]) -> (Matrix3<f64>, Vec<[f64; 2]>) {
    let n = pts.len() as f64;
    let cx: f64 = pts.iter().map(|p| p[0]).sum::<f64>() / n;
    let cy: f64 = pts.iter().map(|p| p[1]).sum::<f64>() / n;

    let mean_dist: f64 = pts
        .iter()
        .map(|p| (p[0] - cx).hypot(p[1] - cy))
        .sum::<f64>()
        / n;

    let s = if mean_dist > 1e-15 {
        std::f64::consts::SQRT_2 / mean_dist
    } else {
        1.0
    };

    let t = Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0);
    let normalized = pts
        .iter()
        .map(|p| [s * (p[0] - cx), s * (p[1] - cy)])
        .collect();

    (t, normalized)
}

fn is_collinear(a: &[f64; 2], b: &[f64; 2], c: &[f64; 2]) -> bool {
    let ab = [b[0] - a[0], b[1] - a[1]];
    let ac = [c[0] - a[0], c[1] - a[1]];
    let len = ab[0].hypot(ab[1]) * ac[0].hypot(ac[1]);
    if len == 0.0 {
        return true;
    }
    let cross = ab[0] * ac[1] - ab[1] * ac[0];
    (cross / len).abs() < COLLINEAR_SIN_EPS
}

/// True when any three of the four points are collinear or coincide.
fn minimal_set_degenerate(pts: &[[f64; 2]; 4]) -> bool {
    const TRIPLES: [(usize, usize, usize); 4] = [(0, 1, 2), (0, 1, 3), (0, 2, 3), (1, 2, 3)];
    TRIPLES
        .iter()
        .any(|&(i, j, k)| is_collinear(&pts[i], &pts[j], &pts[k]))
}

/// True when no three points of the set span a triangle.
fn all_collinear(pts: &[[f64; 2]]) -> bool {
    let Some(a) = pts.first() else {
        return true;
    };
    let Some(b) = pts.iter().find(|p| p[0] != a[0] || p[1] != a[1]) else {
        return true;
    };
    pts.iter().all(|c| is_collinear(a, b, c) || c == a || c == b)
}

/// Estimate `H` with `dst ≈ project(H, src)` from ≥4 correspondences.
pub fn estimate_homography_dlt(
    src: &[[f64; 2]],
    dst: &[[f64; 2]],
) -> Result<Matrix3<f64>, HomographyError> {
    if src.len() != dst.len() {
        return Err(HomographyError::LengthMismatch {
            src: src.len(),
            dst: dst.len(),
        });
    }
    let n = src.len();
    if n < MIN_CALIBRATION_SAMPLES {
        return Err(HomographyError::TooFewPoints {
            needed: MIN_CALIBRATION_SAMPLES,
            got: n,
        });
    }
    if all_collinear(src) || all_collinear(dst) {
        return Err(HomographyError::Degenerate("points are collinear".into()));
    }

    let (t_src, src_n) = normalize_points(src);
    let (t_dst, dst_n) = normalize_points(dst);

    // 2n × 9 system A·h = 0
    let mut a = DMatrix::zeros(2 * n, 9);
    for i in 0..n {
        let (sx, sy) = (src_n[i][0], src_n[i][1]);
        let (dx, dy) = (dst_n[i][0], dst_n[i][1]);

        a[(2 * i, 3)] = -sx;
        a[(2 * i, 4)] = -sy;
        a[(2 * i, 5)] = -1.0;
        a[(2 * i, 6)] = dy * sx;
        a[(2 * i, 7)] = dy * sy;
        a[(2 * i, 8)] = dy;

        a[(2 * i + 1, 0)] = sx;
        a[(2 * i + 1, 1)] = sy;
        a[(2 * i + 1, 2)] = 1.0;
        a[(2 * i + 1, 6)] = -dx * sx;
        a[(2 * i + 1, 7)] = -dx * sy;
        a[(2 * i + 1, 8)] = -dx;
    }

    // h is the eigenvector of AᵀA with the smallest eigenvalue.
    let ata = a.transpose() * &a;
    let eig = SymmetricEigen::new(ata);
    let min_idx = eig
        .eigenvalues
        .iter()
        .enumerate()
        .min_by(|x, y| x.1.abs().total_cmp(&y.1.abs()))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let h = eig.eigenvectors.column(min_idx);
    let h_norm = Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], h[8]);

    // H = T_dst⁻¹ · H_norm · T_src
    let t_dst_inv = t_dst
        .try_inverse()
        .ok_or_else(|| HomographyError::Degenerate("T_dst not invertible".into()))?;
    let h = t_dst_inv * h_norm * t_src;

    if h.iter().any(|v| !v.is_finite()) {
        return Err(HomographyError::Degenerate("non-finite solution".into()));
    }
    let det = h.determinant();
    if !det.is_finite() || det.abs() < 1e-15 * h.norm().powi(3) {
        return Err(HomographyError::Degenerate("singular solution".into()));
    }

    let scale = h[(2, 2)];
    if scale.abs() < 1e-15 {
        Ok(h)
    } else {
        Ok(h / scale)
    }
}

/// RANSAC configuration for homography fitting.
#[derive(Debug, Clone, PartialEq)]
pub struct RansacConfig {
    /// Maximum number of random minimal samples drawn.
    pub max_iterations: usize,
    /// Reprojection error (destination pixels) below which a sample is an inlier.
    pub inlier_threshold_px: f64,
    /// Minimum inliers for a model to be accepted.
    pub min_inliers: usize,
    pub seed: u64,
}

impl Default for RansacConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_RANSAC_ITERATIONS,
            inlier_threshold_px: DEFAULT_INLIER_THRESHOLD_PX,
            min_inliers: MIN_CALIBRATION_SAMPLES,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RansacResult {
    pub h: Matrix3<f64>,
    pub inlier_mask: Vec<bool>,
    pub n_inliers: usize,
    /// Reprojection error per correspondence under `h`.
    pub errors: Vec<f64>,
}

impl RansacResult {
    pub fn mean_inlier_error(&self) -> f64 {
        let (sum, n) = self
            .errors
            .iter()
            .zip(&self.inlier_mask)
            .filter(|(_, inlier)| **inlier)
            .fold((0.0, 0usize), |(s, n), (e, _)| (s + e, n + 1));
        if n == 0 {
            f64::NAN
        } else {
            sum / n as f64
        }
    }
}

fn score(
    h: &Matrix3<f64>,
    src: &[[f64; 2]],
    dst: &[[f64; 2]],
    threshold: f64,
) -> (Vec<bool>, Vec<f64>, usize) {
    let errors: Vec<f64> = src
        .iter()
        .zip(dst)
        .map(|(s, d)| reprojection_error(h, s, d))
        .collect();
    let mask: Vec<bool> = errors.iter().map(|&e| e <= threshold).collect();
    let count = mask.iter().filter(|&&m| m).count();
    (mask, errors, count)
}

/// Outlier-robust homography fit.
pub fn fit_homography_ransac(
    src: &[[f64; 2]],
    dst: &[[f64; 2]],
    config: &RansacConfig,
) -> Result<RansacResult, HomographyError> {
    if src.len() != dst.len() {
        return Err(HomographyError::LengthMismatch {
            src: src.len(),
            dst: dst.len(),
        });
    }
    let n = src.len();
    if n < MIN_CALIBRATION_SAMPLES {
        return Err(HomographyError::TooFewPoints {
            needed: MIN_CALIBRATION_SAMPLES,
            got: n,
        });
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let min_inliers = config.min_inliers.max(MIN_CALIBRATION_SAMPLES);

    let mut best: Option<(Matrix3<f64>, usize)> = None;
    let mut best_mask = vec![false; n];

    for _ in 0..config.max_iterations.max(1) {
        let idx = rand::seq::index::sample(&mut rng, n, MIN_CALIBRATION_SAMPLES).into_vec();
        let s4 = [src[idx[0]], src[idx[1]], src[idx[2]], src[idx[3]]];
        let d4 = [dst[idx[0]], dst[idx[1]], dst[idx[2]], dst[idx[3]]];
        if minimal_set_degenerate(&s4) || minimal_set_degenerate(&d4) {
            continue;
        }

        let h = match estimate_homography_dlt(&s4, &d4) {
            Ok(h) => h,
            Err(_) => continue,
        };

        let (mask, _, count) = score(&h, src, dst, config.inlier_threshold_px);
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((h, count));
            best_mask = mask;
            if count == n {
                break;
            }
        }
    }

    let Some((best_h, best_count)) = best else {
        return Err(HomographyError::Degenerate(
            "no non-degenerate minimal sample".into(),
        ));
    };
    if best_count < min_inliers {
        return Err(HomographyError::InsufficientInliers {
            needed: min_inliers,
            found: best_count,
        });
    }

    let inlier_src: Vec<[f64; 2]> = src
        .iter()
        .zip(&best_mask)
        .filter(|(_, m)| **m)
        .map(|(p, _)| *p)
        .collect();
    let inlier_dst: Vec<[f64; 2]> = dst
        .iter()
        .zip(&best_mask)
        .filter(|(_, m)| **m)
        .map(|(p, _)| *p)
        .collect();

    // Keep the refit only if it does not lose inliers.
    let h = match estimate_homography_dlt(&inlier_src, &inlier_dst) {
        Ok(refit) if score(&refit, src, dst, config.inlier_threshold_px).2 >= best_count => refit,
        _ => best_h,
    };

    let (inlier_mask, errors, n_inliers) = score(&h, src, dst, config.inlier_threshold_px);

    Ok(RansacResult {
        h,
        inlier_mask,
        n_inliers,
        errors,
    })
}
