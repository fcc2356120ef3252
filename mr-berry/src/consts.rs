//! 通用常量.

/// 单通道颜色.
pub mod gray {
    /// 脑 mask 中, 背景的像素值.
    pub const MASK_BACKGROUND: u8 = 0;

    /// 脑 mask 中, 脑组织的惯用像素值.
    ///
    /// 注意判定时以 "非零即脑" 为准, 见 [`is_brain`].
    pub const MASK_BRAIN: u8 = 1;

    /// 单通道黑色.
    pub const BLACK: u8 = 0b_0000_0000;

    /// 单通道暗灰色.
    pub const DARK_GRAY: u8 = 0b_0100_0000;

    /// 单通道灰色.
    pub const GRAY: u8 = 0b_1000_0000;

    /// 单通道亮灰色.
    pub const LIGHT_GRAY: u8 = 0b_1100_0000;

    /// 单通道白色.
    pub const WHITE: u8 = 0b_1111_1111;

    /// 像素是否是脑组织? mask 中任何非零值均视为脑组织.
    #[inline]
    pub const fn is_brain(p: u8) -> bool {
        p != MASK_BACKGROUND
    }

    /// 像素是否是背景?
    #[inline]
    pub const fn is_background(p: u8) -> bool {
        matches!(p, MASK_BACKGROUND)
    }
}

/// 熵族指标直方图的惯用 bin 个数.
pub const DEFAULT_BINS: usize = 100;

/// 裁剪 mask 包围盒时默认向外扩张的物理边距, 以毫米为单位.
pub const DEFAULT_CROP_MARGIN_MM: f64 = 15.0;
