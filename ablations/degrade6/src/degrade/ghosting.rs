//! 相位编码方向的运动伪影.

use mr_berry::prelude::*;
use ndarray::Array2;

/// 把整层沿 H 方向循环平移后的副本混入原图.
///
/// 平移量与混合权重都随严重程度增大.
pub(crate) fn apply(stack: &mut MriStack, severity: f64) {
    let shift = (severity * 40.0).round() as usize + 1;

    for mut sli in stack.slice_iter_mut() {
        let (hh, _) = sli.shape();
        let src: Array2<f64> = sli.data().to_owned();

        let mut view = sli.data_mut();
        for ((h, w), v) in view.indexed_iter_mut() {
            *v = (1.0 - severity) * *v + severity * src[((h + shift) % hh, w)];
        }
    }
}
