//! 坐标点类型
//!
//! 关键点在不同阶段处于不同坐标空间：归一化 [0,1] 空间、相机图像像素空间、
//! 屏幕整数像素空间。空间由类型参数区分，混用在编译期即被拒绝。

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

/// 归一化关键点空间，坐标相对图像宽高位于 [0,1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Normalized;

/// 相机图像像素空间（亚像素精度），即标定使用的眼部特征空间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Image;

/// 带坐标空间标记的二维点
pub struct Point2<S> {
    pub x: f64,
    pub y: f64,
    _space: PhantomData<S>,
}

impl<S> Point2<S> {
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            _space: PhantomData,
        }
    }

    /// 欧氏距离
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn midpoint(&self, other: &Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn to_array(self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl Point2<Normalized> {
    /// 反归一化到图像像素空间
    pub fn to_image(self, image_width: f64, image_height: f64) -> Point2<Image> {
        Point2::new(self.x * image_width, self.y * image_height)
    }
}

// PhantomData<S> 不要求 S 实现这些 trait，手动实现以免 derive 引入多余约束
impl<S> Clone for Point2<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Point2<S> {}

impl<S> PartialEq for Point2<S> {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}

impl<S> fmt::Debug for Point2<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

impl<S> From<[f64; 2]> for Point2<S> {
    fn from(p: [f64; 2]) -> Self {
        Self::new(p[0], p[1])
    }
}

/// 屏幕像素坐标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// 限制在 `[0, size.width-1] × [0, size.height-1]` 内
    pub fn clamp_to(self, size: ScreenSize) -> Self {
        Self {
            x: self.x.clamp(0, (size.width - 1).max(0)),
            y: self.y.clamp(0, (size.height - 1).max(0)),
        }
    }
}

impl fmt::Display for ScreenPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// 屏幕尺寸（像素）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: i32,
    pub height: i32,
}

impl ScreenSize {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denormalizes_by_image_size() {
        let p = Point2::<Normalized>::new(0.25, 0.5);
        let px = p.to_image(640.0, 480.0);
        assert_eq!(px, Point2::<Image>::new(160.0, 240.0));
    }

    #[test]
    fn clamp_keeps_points_on_screen() {
        let size = ScreenSize::new(1920, 1080);
        assert_eq!(ScreenPoint::new(-5, 2000).clamp_to(size), ScreenPoint::new(0, 1079));
        assert_eq!(ScreenPoint::new(1920, 10).clamp_to(size), ScreenPoint::new(1919, 10));
        assert_eq!(ScreenPoint::new(100, 200).clamp_to(size), ScreenPoint::new(100, 200));
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Point2::<Image>::new(0.0, 0.0);
        let b = Point2::<Image>::new(3.0, 4.0);
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(a.midpoint(&b), Point2::new(1.5, 2.0));
    }
}
