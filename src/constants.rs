/// EAR 闭眼阈值，低于此值视为闭眼
pub const DEFAULT_EAR_THRESHOLD: f64 = 0.2;

/// 判定一次眨眼所需的最少连续闭眼帧数
pub const DEFAULT_CONSECUTIVE_FRAMES: u32 = 2;

/// 注视点平滑窗口大小（帧）
pub const DEFAULT_SMOOTHING_WINDOW: usize = 10;

/// RANSAC 内点重投影误差阈值（屏幕像素）
pub const DEFAULT_INLIER_THRESHOLD_PX: f64 = 5.0;

/// RANSAC 最大迭代次数
pub const DEFAULT_RANSAC_ITERATIONS: usize = 2000;

/// 单应性拟合所需的最少样本数
pub const MIN_CALIBRATION_SAMPLES: usize = 4;

/// 标定目标点距屏幕边缘的内缩距离（像素）
pub const DEFAULT_TARGET_MARGIN_PX: i32 = 20;

/// 标定采集触发后的冷却时间（毫秒），避免一次按键重复采集
pub const DEFAULT_CAPTURE_DEBOUNCE_MS: u64 = 200;

pub const DEFAULT_SCREEN_WIDTH: i32 = 1920;
pub const DEFAULT_SCREEN_HEIGHT: i32 = 1080;
