//! EAR (Eye Aspect Ratio) 与虹膜中心计算
//!
//! 纯几何计算，无状态。EAR 用于判断眼睛睁闭，虹膜中心用作标定与跟踪的
//! 原始眼部特征点。

use super::point::{Image, Normalized, Point2};

/// 单眼6点轮廓
///
/// 点序固定：外眼角、两个上眼睑点、内眼角、两个下眼睑点。
/// EAR 依赖位置语义（1/5 与 2/4 为垂直配对，0/3 为水平），不可重排。
pub struct EyeContour<S>(pub [Point2<S>; 6]);

impl<S> EyeContour<S> {
    pub fn new(points: [Point2<S>; 6]) -> Self {
        Self(points)
    }

    pub fn points(&self) -> &[Point2<S>; 6] {
        &self.0
    }

    /// 对所有点施加同一变换
    pub fn map(&self, f: impl Fn(Point2<S>) -> Point2<S>) -> Self {
        Self(self.0.map(f))
    }
}

impl<S> Clone for EyeContour<S> {
    fn clone(&self) -> Self {
        Self(self.0)
    }
}

impl<S> std::fmt::Debug for EyeContour<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("EyeContour").field(&self.0).finish()
    }
}

pub fn distance<S>(p1: &Point2<S>, p2: &Point2<S>) -> f64 {
    p1.distance(p2)
}

/// 标准6点 EAR
///
/// 公式: EAR = (|p1-p5| + |p2-p4|) / (2 * |p0-p3|)
///
/// 水平距离为 0（轮廓退化，如所有点重合）时返回 0，视为闭眼。
pub fn eye_aspect_ratio<S>(contour: &EyeContour<S>) -> f64 {
    let p = contour.points();

    let horizontal = distance(&p[0], &p[3]);
    if horizontal == 0.0 {
        return 0.0;
    }

    let vertical1 = distance(&p[1], &p[5]);
    let vertical2 = distance(&p[2], &p[4]);
    (vertical1 + vertical2) / (2.0 * horizontal)
}

/// 双眼 EAR 平均值，作为每帧送入眨眼检测器的信号
pub fn binocular_ear<S>(left: &EyeContour<S>, right: &EyeContour<S>) -> f64 {
    (eye_aspect_ratio(left) + eye_aspect_ratio(right)) / 2.0
}

/// 将归一化虹膜关键点反归一化为图像像素坐标
pub fn iris_center_pixel(
    landmark: Point2<Normalized>,
    image_width: f64,
    image_height: f64,
) -> Point2<Image> {
    landmark.to_image(image_width, image_height)
}

/// 左右虹膜中心的中点，即原始眼部特征点
pub fn eye_feature_point(left_iris: Point2<Image>, right_iris: Point2<Image>) -> Point2<Image> {
    left_iris.midpoint(&right_iris)
}
