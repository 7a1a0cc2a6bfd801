//! 注视点平滑
//!
//! 固定容量的 FIFO 历史上做移动平均，抑制映射后注视点的抖动。

use std::collections::VecDeque;

use super::point::ScreenPoint;
use crate::constants::DEFAULT_SMOOTHING_WINDOW;

#[derive(Debug, Clone)]
pub struct GazeSmoother {
    history: VecDeque<ScreenPoint>,
    capacity: usize,
}

impl GazeSmoother {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// 推入新点并返回窗口平均
    ///
    /// `None` 表示本帧无有效注视点：直接返回 `None`，历史不变。
    /// 预热阶段样本不足窗口大小时，对已有样本求平均。
    pub fn push_and_average(&mut self, point: Option<ScreenPoint>) -> Option<ScreenPoint> {
        let point = point?;

        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(point);

        let n = self.history.len() as f64;
        let (sum_x, sum_y) = self.history.iter().fold((0.0, 0.0), |(sx, sy), p| {
            (sx + f64::from(p.x), sy + f64::from(p.y))
        });
        Some(ScreenPoint::new(
            (sum_x / n).round() as i32,
            (sum_y / n).round() as i32,
        ))
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn history(&self) -> impl Iterator<Item = &ScreenPoint> {
        self.history.iter()
    }
}

impl Default for GazeSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING_WINDOW)
    }
}
