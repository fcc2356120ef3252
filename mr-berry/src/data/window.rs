//! MR 强度灰度窗口.
//!
//! MR 强度没有 CT 值那样的绝对标尺, 窗口通常由切片或序列的动态范围现算.

/// MR 灰度窗口. 由窗位 `level` 和窗宽 `width` 组成,
/// 负责把任意强度值线性压缩到 8 位灰度上.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrayWindow {
    /// 窗位.
    level: f64,

    /// 窗宽. 必须为正.
    width: f64,
}

impl GrayWindow {
    /// 创建窗口. 当任一参数非有限, 或窗宽非正时, 返回 `None`.
    pub fn new(level: f64, width: f64) -> Option<Self> {
        (level.is_finite() && width.is_finite() && width > 0.0).then_some(Self { level, width })
    }

    /// 由闭区间 `[lo, hi]` 创建窗口.
    ///
    /// 当任一端点非有限或 `lo > hi` 时返回 `None`;
    /// 当 `lo == hi` (常数图像) 时取单位窗宽, 使该值落在灰度中部.
    pub fn from_range(lo: f64, hi: f64) -> Option<Self> {
        if !lo.is_finite() || !hi.is_finite() || lo > hi {
            return None;
        }
        if lo == hi {
            return Self::new(lo, 1.0);
        }
        Self::new((lo + hi) / 2.0, hi - lo)
    }

    /// 获取窗口下界.
    #[inline]
    pub fn lower_bound(&self) -> f64 {
        self.level - self.width / 2.0
    }

    /// 获取窗口上界.
    #[inline]
    pub fn upper_bound(&self) -> f64 {
        self.level + self.width / 2.0
    }

    /// 获取窗位.
    #[inline]
    pub fn level(&self) -> f64 {
        self.level
    }

    /// 获取窗宽.
    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// 计算强度值 `v` 在该窗口下的 8 位灰度.
    ///
    /// `v` 非有限时返回 `None`.
    pub fn eval(&self, v: f64) -> Option<u8> {
        if !v.is_finite() {
            return None;
        }
        let lb = self.lower_bound();
        if v <= lb {
            return Some(u8::MIN);
        }
        if v >= self.upper_bound() {
            return Some(u8::MAX);
        }
        // 255, not 256.
        Some(((v - lb) / self.width * f64::from(u8::MAX)) as u8)
    }

    /// 计算强度值 `v` 在该窗口下的灰度值, 以浮点数表示.
    ///
    /// `v` 非有限时返回 `None`.
    pub fn eval_f64(&self, v: f64) -> Option<f64> {
        if !v.is_finite() {
            return None;
        }
        let lb = self.lower_bound();
        if v <= lb {
            return Some(f64::from(u8::MIN));
        }
        if v >= self.upper_bound() {
            return Some(f64::from(u8::MAX));
        }
        Some((v - lb) / self.width * f64::from(u8::MAX))
    }
}
