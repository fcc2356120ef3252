//! 低频偏置场.

use mr_berry::prelude::*;
use std::f64::consts::PI;

/// 以平滑的正弦曲面调制整个 stack, 模拟接收场不均匀.
///
/// 调制因子落在 `[1 - severity, 1 + severity]` 内, 在面内缓慢变化.
pub(crate) fn apply(stack: &mut MriStack, severity: f64) {
    let (_, hh, ww) = stack.shape();
    let (hh, ww) = (hh as f64, ww as f64);

    let mut data = stack.data_mut();
    for ((_, h, w), v) in data.indexed_iter_mut() {
        let fh = h as f64 / hh;
        let fw = w as f64 / ww;
        *v *= 1.0 + severity * (PI * fh).sin() * (PI * fw).cos();
    }
}
