//! 评估前的几何预处理: 包围盒, 裁剪与掩膜清零.

pub mod cache;

use crate::consts::gray::is_background;
use crate::consts::DEFAULT_CROP_MARGIN_MM;
use crate::{BrainMask, Idx3d, MriStack, NiftiVolumeAttr, StackPair};
use ndarray::{s, Zip};

impl BrainMask {
    /// 全部脑组织体素的最小包围盒, 以 (z, h, w) 闭端点对给出.
    /// mask 全空时返回 `None`.
    pub fn bounding_box(&self) -> Option<(Idx3d, Idx3d)> {
        let mut lo = (usize::MAX, usize::MAX, usize::MAX);
        let mut hi = (0, 0, 0);
        let mut any = false;
        for ((z, h, w), &pix) in self.data().indexed_iter() {
            if is_background(pix) {
                continue;
            }
            any = true;
            lo = (lo.0.min(z), lo.1.min(h), lo.2.min(w));
            hi = (hi.0.max(z), hi.1.max(h), hi.2.max(w));
        }
        any.then_some((lo, hi))
    }
}

impl StackPair {
    /// 以默认边距 [`DEFAULT_CROP_MARGIN_MM`] 裁剪, 见 [`StackPair::crop_to_mask`].
    #[inline]
    pub fn crop(&self) -> Option<Self> {
        self.crop_to_mask(DEFAULT_CROP_MARGIN_MM)
    }

    /// 裁剪出 mask 包围盒向外扩 `margin_mm` 毫米后的子体.
    ///
    /// 胎儿脑只占母体扫描的一小部分, 先裁剪能显著降低后续指标计算量.
    /// 每个轴的边距按该轴体素分辨率换算成体素数并四舍五入,
    /// 超出体积边界的部分向内收紧. mask 全空时返回 `None`.
    pub fn crop_to_mask(&self, margin_mm: f64) -> Option<Self> {
        let (lo, hi) = self.mask.bounding_box()?;
        let [z_mm, h_mm, w_mm] = self.stack.pix_dim();
        let margin = |mm: f64| (margin_mm / mm).round() as usize;
        let (mz, mh, mw) = (margin(z_mm), margin(h_mm), margin(w_mm));

        let (z_len, h_len, w_len) = self.stack.shape();
        let z0 = lo.0.saturating_sub(mz);
        let z1 = hi.0.saturating_add(mz).min(z_len - 1);
        let h0 = lo.1.saturating_sub(mh);
        let h1 = hi.1.saturating_add(mh).min(h_len - 1);
        let w0 = lo.2.saturating_sub(mw);
        let w1 = hi.2.saturating_add(mw).min(w_len - 1);

        let stack_data = self
            .stack
            .data()
            .slice(s![z0..=z1, h0..=h1, w0..=w1])
            .to_owned();
        let mask_data = self
            .mask
            .data()
            .slice(s![z0..=z1, h0..=h1, w0..=w1])
            .to_owned();

        Some(Self {
            stack: MriStack::with_header_zhw(self.stack.header(), stack_data),
            mask: BrainMask::with_header_zhw(self.mask.header(), mask_data),
        })
    }

    /// 将 mask 外 (背景) 的强度就地清零.
    pub fn apply_mask(&mut self) {
        Zip::from(self.stack.data_mut())
            .and(self.mask.data())
            .for_each(|v, &lab| {
                if is_background(lab) {
                    *v = 0.0;
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    /// 6 层 8x8 体积, 脑组织位于 z 2..=3, h 3..=4, w 2..=5.
    fn handmade_pair() -> StackPair {
        let stack = Array3::from_shape_fn((8, 8, 6), |(w, h, z)| (z * 100 + h * 10 + w) as f64);
        let mut labels = Array3::zeros((8, 8, 6));
        for z in 2..=3 {
            for h in 3..=4 {
                for w in 2..=5 {
                    labels[(w, h, z)] = 1u8;
                }
            }
        }
        StackPair::from_pair(
            MriStack::from_parts(stack, [1.0, 1.0, 2.0]),
            BrainMask::from_parts(labels, [1.0, 1.0, 2.0]),
        )
        .unwrap()
    }

    #[test]
    fn test_bounding_box() {
        let pair = handmade_pair();
        assert_eq!(pair.mask.bounding_box(), Some(((2, 3, 2), (3, 4, 5))));

        let blank = BrainMask::from_parts(Array3::zeros((4, 4, 4)), [1.0, 1.0, 1.0]);
        assert_eq!(blank.bounding_box(), None);
    }

    #[test]
    fn test_crop_margin_follows_resolution() {
        let pair = handmade_pair();
        // z 轴分辨率 2mm, 面内 1mm: 2mm 边距折合 (1, 2, 2) 体素.
        let cropped = pair.crop_to_mask(2.0).unwrap();
        assert_eq!(cropped.stack.shape(), (4, 6, 8));
        assert_eq!(cropped.mask.shape(), (4, 6, 8));

        // 裁剪原点为 (z 1, h 1, w 0).
        assert_eq!(cropped.stack[(0, 0, 0)], 110.0);
        assert_eq!(cropped.mask.bounding_box(), Some(((1, 2, 2), (2, 3, 5))));
        assert!(cropped.stack.is_synthetic());
    }

    #[test]
    fn test_crop_clamps_to_volume() {
        let pair = handmade_pair();
        let cropped = pair.crop_to_mask(1e6).unwrap();
        assert_eq!(cropped.stack.shape(), pair.stack.shape());
        assert_eq!(cropped.stack.data(), pair.stack.data());
    }

    #[test]
    fn test_crop_of_blank_mask() {
        let mut pair = handmade_pair();
        pair.mask.data_mut().fill(0);
        assert!(pair.crop_to_mask(2.0).is_none());
        assert!(pair.crop().is_none());
    }

    #[test]
    fn test_apply_mask_zeroes_background() {
        let mut pair = handmade_pair();
        pair.apply_mask();
        let nonzero = pair.stack.data().iter().filter(|v| **v != 0.0).count();
        // 2 * 2 * 4 个脑组织体素, 强度均非零.
        assert_eq!(nonzero, 16);
        assert!(pair
            .iter()
            .all(|(&v, &lab)| lab != 0 || v == 0.0));
    }
}
