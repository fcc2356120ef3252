//! 面内 box 模糊.

use mr_berry::prelude::*;
use ndarray::Array2;

/// 对每个切片做一次边界截断的 box 均值模糊.
///
/// 核边长随严重程度取 3/5/7, 只在面内 (H, W) 方向作用,
/// 不跨越层间的大间距.
pub(crate) fn apply(stack: &mut MriStack, severity: f64) {
    let k = 2 * (severity * 5.0).round() as usize + 3;
    let half = (k / 2) as isize;

    for mut sli in stack.slice_iter_mut() {
        let (hh, ww) = sli.shape();
        let (hh, ww) = (hh as isize, ww as isize);
        let src: Array2<f64> = sli.data().to_owned();

        let mut view = sli.data_mut();
        for ((h, w), v) in view.indexed_iter_mut() {
            let (h, w) = (h as isize, w as isize);
            let mut acc = 0.0;
            let mut cnt = 0usize;
            for dh in -half..=half {
                for dw in -half..=half {
                    let (nh, nw) = (h + dh, w + dw);
                    if (0..hh).contains(&nh) && (0..ww).contains(&nw) {
                        acc += src[(nh as usize, nw as usize)];
                        cnt += 1;
                    }
                }
            }
            *v = acc / cnt as f64;
        }
    }
}
