//! 自产自销的头部仿体.
//!
//! 消融实验不读取任何真实受试者数据, 全部输入来自这里生成的确定性仿体:
//! 中心椭球充当脑实质, 外围一层高信号薄壳充当颅骨, 实质内叠加低频纹理
//! 以免各类指标在常数区域上退化.

use mr_berry::consts::gray::{MASK_BACKGROUND, MASK_BRAIN};
use mr_berry::{BrainMask, MriStack, StackPair};
use ndarray::Array3;

/// 仿体切片层数.
pub const DEPTH: usize = 12;

/// 仿体面内边长.
pub const SIDE: usize = 64;

/// 生成头部仿体 stack 及其脑 mask.
///
/// 任何两次调用产生完全相同的数据. 顶部和底部切片不含脑组织,
/// 以便上层逻辑覆盖 "全背景切片" 分支.
pub fn head_phantom() -> StackPair {
    let (cw, ch, cz) = (SIDE as f64 / 2.0, SIDE as f64 / 2.0, DEPTH as f64 / 2.0);
    let (rw, rh, rz) = (SIDE as f64 * 0.35, SIDE as f64 * 0.35, DEPTH as f64 * 0.4);

    // 体素中心到椭球面的归一化距离.
    let norm = |w: usize, h: usize, z: usize| -> f64 {
        let dw = (w as f64 + 0.5 - cw) / rw;
        let dh = (h as f64 + 0.5 - ch) / rh;
        let dz = (z as f64 + 0.5 - cz) / rz;
        (dw * dw + dh * dh + dz * dz).sqrt()
    };

    let stack = Array3::from_shape_fn((SIDE, SIDE, DEPTH), |(w, h, z)| {
        let r = norm(w, h, z);
        if r <= 1.0 {
            let texture =
                (w as f64 * 0.37).sin() * (h as f64 * 0.23).cos() + (z as f64 * 0.51).sin();
            600.0 + 400.0 * (1.0 - r) + 80.0 * texture
        } else if r <= 1.15 {
            // 颅骨薄壳.
            1000.0
        } else {
            0.0
        }
    });

    let mask = Array3::from_shape_fn((SIDE, SIDE, DEPTH), |(w, h, z)| {
        if norm(w, h, z) <= 1.0 {
            MASK_BRAIN
        } else {
            MASK_BACKGROUND
        }
    });

    let pix = [1.0, 1.0, 3.0];
    // 形状由构造保证一致.
    StackPair::from_pair(
        MriStack::from_parts(stack, pix),
        BrainMask::from_parts(mask, pix),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mr_berry::NiftiVolumeAttr;

    #[test]
    fn test_phantom_shape_and_resolution() {
        let pair = head_phantom();
        assert_eq!(pair.stack.shape(), (DEPTH, SIDE, SIDE));
        assert_eq!(pair.mask.shape(), (DEPTH, SIDE, SIDE));
        assert!(pair.stack.is_z_greater());
        assert_eq!(pair.stack.width_mm(), pair.stack.height_mm());
    }

    #[test]
    fn test_phantom_has_brain_and_blank_caps() {
        let pair = head_phantom();
        let [bg, brain] = pair.mask.numeric_statistics();
        assert!(brain > 0);
        assert!(bg > brain);

        // 顶层与底层全背景.
        assert!(pair.mask.slice_at(0).is_background());
        assert!(pair.mask.slice_at(DEPTH - 1).is_background());
        assert!(pair.mask.slice_at(DEPTH / 2).has_brain());
    }

    #[test]
    fn test_phantom_is_deterministic() {
        let a = head_phantom();
        let b = head_phantom();
        assert_eq!(a.stack.data(), b.stack.data());
        assert_eq!(a.mask.data(), b.mask.data());
    }
}
