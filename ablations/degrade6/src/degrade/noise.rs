//! 加性噪声.

use mr_berry::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 向整个 stack 叠加近似高斯的加性噪声.
///
/// 标准差取 `severity * 1000.0`, 与仿体的灰度量级同阶.
/// 噪声样本取 12 个均匀样本之和再减 6 (Irwin-Hall), 均值 0, 方差 1.
pub(crate) fn apply(stack: &mut MriStack, severity: f64) {
    let sigma = severity * 1000.0;
    let mut rng = SmallRng::seed_from_u64(super::SEED);
    for v in stack.data_mut().iter_mut() {
        let g = (0..12).map(|_| rng.gen::<f64>()).sum::<f64>() - 6.0;
        *v += sigma * g;
    }
}
