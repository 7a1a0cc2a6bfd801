//! 眨眼点击检测模块
//!
//! 基于连续低 EAR 帧计数的去抖状态机：
//! EAR 低于阈值时累加计数；眼睛重新睁开时，若此前连续闭眼帧数达到
//! `consecutive_frames`，则在睁开这一帧发出一次点击。
//!
//! 长时间闭眼只会在睁眼时触发一次点击，单帧噪声不会触发。

use crate::constants::{DEFAULT_CONSECUTIVE_FRAMES, DEFAULT_EAR_THRESHOLD};

/// 眨眼检测配置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlinkConfig {
    /// EAR 阈值，低于此值视为闭眼
    pub ear_threshold: f64,
    /// 计为一次眨眼所需的最少连续闭眼帧数
    pub consecutive_frames: u32,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            ear_threshold: DEFAULT_EAR_THRESHOLD,
            consecutive_frames: DEFAULT_CONSECUTIVE_FRAMES,
        }
    }
}

/// 检测器内部状态
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BlinkState {
    /// 当前连续闭眼帧数
    pub consecutive_low_frames: u32,
    /// 累计有效眨眼次数
    pub total_blinks: u64,
    /// 最近一次处理的 EAR，仅供显示调试
    pub last_ear: f64,
}

/// 一次眨眼触发的点击
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickEvent {
    /// 触发前的连续闭眼帧数
    pub closed_frames: u32,
    /// 触发后的累计眨眼次数
    pub total_blinks: u64,
}

/// 眨眼检测器
#[derive(Debug, Clone)]
pub struct BlinkDetector {
    config: BlinkConfig,
    state: BlinkState,
}

impl BlinkDetector {
    pub fn new(config: BlinkConfig) -> Self {
        Self {
            config: BlinkConfig {
                consecutive_frames: config.consecutive_frames.max(1),
                ..config
            },
            state: BlinkState::default(),
        }
    }

    /// 处理一帧 EAR，最多返回一次点击
    ///
    /// NaN 与阈值比较恒为 false，按睁眼处理，不会产生虚假眨眼。
    pub fn update(&mut self, ear: f64) -> Option<ClickEvent> {
        self.state.last_ear = ear;

        if ear < self.config.ear_threshold {
            self.state.consecutive_low_frames = self.state.consecutive_low_frames.saturating_add(1);
            return None;
        }

        let closed_frames = self.state.consecutive_low_frames;
        self.state.consecutive_low_frames = 0;

        if closed_frames >= self.config.consecutive_frames {
            self.state.total_blinks += 1;
            tracing::debug!(
                closed_frames,
                total_blinks = self.state.total_blinks,
                "Blink detected"
            );
            return Some(ClickEvent {
                closed_frames,
                total_blinks: self.state.total_blinks,
            });
        }

        None
    }

    pub fn state(&self) -> &BlinkState {
        &self.state
    }

    pub fn config(&self) -> &BlinkConfig {
        &self.config
    }

    pub fn last_ear(&self) -> f64 {
        self.state.last_ear
    }

    pub fn total_blinks(&self) -> u64 {
        self.state.total_blinks
    }

    /// 重置计数器状态
    pub fn reset(&mut self) {
        self.state = BlinkState::default();
    }
}

impl Default for BlinkDetector {
    fn default() -> Self {
        Self::new(BlinkConfig::default())
    }
}
