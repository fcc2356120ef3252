//! 全局 gamma 非线性.

use mr_berry::prelude::*;

/// 对整个 stack 施加单调的 gamma 变换, 保持取值范围不变.
///
/// 指数取 `1 + 2 * severity`; 数据为空或取值恒定时不做任何事.
pub(crate) fn apply(stack: &mut MriStack, severity: f64) {
    let Some((lo, hi)) = stack.min_max() else {
        return;
    };
    let span = hi - lo;
    if span == 0.0 {
        return;
    }

    let g = 1.0 + 2.0 * severity;
    for v in stack.data_mut().iter_mut() {
        let t = (*v - lo) / span;
        *v = lo + span * t.powf(g);
    }
}
