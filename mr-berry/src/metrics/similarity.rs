//! 相似性指标: 归一化互相关与结构相似性.

use super::{check_same_shape, infer_datarange, MetricError, MetricResult};
use crate::consts::gray::is_brain;
use ndarray::{Array, ArrayView, Axis, Dimension, Slice, Zip};

/// SSIM 滑动窗口边长. 任一维度短于它的图像无法评估.
const WIN_SIDE: usize = 7;

/// SSIM 正则常数系数, 沿用常见取值.
const K1: f64 = 0.01;
const K2: f64 = 0.03;

/// 归一化互相关.
///
/// 标准差按无偏估计 (ddof = 1) 计算, 而分母又带因子 n,
/// 因此图像与自身的相关值为 `(n - 1) / n` 而非 1.
/// 任一输入方差为零 (常数图像) 时返回 `Ok(f64::NAN)`.
pub fn ncc<D: Dimension>(x: ArrayView<f64, D>, x_ref: ArrayView<f64, D>) -> MetricResult<f64> {
    check_same_shape(&x, &x_ref)?;
    let n = x.len() as f64;
    let x_mean = x.sum() / n;
    let ref_mean = x_ref.sum() / n;

    let mut cov = 0.0;
    let mut x_var = 0.0;
    let mut ref_var = 0.0;
    Zip::from(&x).and(&x_ref).for_each(|&a, &b| {
        let da = a - x_mean;
        let db = b - ref_mean;
        cov += da * db;
        x_var += da * da;
        ref_var += db * db;
    });

    let x_std = (x_var / (n - 1.0)).sqrt();
    let ref_std = (ref_var / (n - 1.0)).sqrt();
    Ok(cov / (n * x_std * ref_std))
}

/// 越界下标向图像内侧反射一次: (d c b a | a b c d | d c b a).
///
/// 调用方保证 `len` 不小于窗口半径, 使单次反射足够.
#[inline]
fn reflect(idx: isize, len: usize) -> usize {
    let len = len as isize;
    let r = if idx < 0 {
        -idx - 1
    } else if idx >= len {
        2 * len - 1 - idx
    } else {
        idx
    };
    debug_assert!((0..len).contains(&r));
    r as usize
}

/// 沿 `axis` 对每条 lane 做边长 `size` 的一维均值滤波, 就地写回.
fn axis_uniform<D: Dimension>(data: &mut Array<f64, D>, axis: Axis, size: usize) {
    let inv = 1.0 / size as f64;
    let half = (size / 2) as isize;
    let mut buf = Vec::new();
    for mut lane in data.lanes_mut(axis) {
        buf.clear();
        buf.extend(lane.iter().copied());
        let len = buf.len();
        for (i, v) in lane.iter_mut().enumerate() {
            let mut acc = 0.0;
            for d in -half..=half {
                acc += buf[reflect(i as isize + d, len)];
            }
            *v = acc * inv;
        }
    }
}

/// n 维均值滤波. 可分离为各轴独立的一维滤波.
fn uniform_filter<D: Dimension>(mut data: Array<f64, D>, size: usize) -> Array<f64, D> {
    for ax in 0..data.ndim() {
        axis_uniform(&mut data, Axis(ax), size);
    }
    data
}

/// 全图逐体素 SSIM 响应.
fn ssim_map<D: Dimension>(
    x: &ArrayView<f64, D>,
    x_ref: &ArrayView<f64, D>,
    datarange: f64,
) -> Array<f64, D> {
    let np = (WIN_SIDE as f64).powi(x.ndim() as i32);
    let cov_norm = np / (np - 1.0);
    let c1 = (K1 * datarange).powi(2);
    let c2 = (K2 * datarange).powi(2);

    let ux = uniform_filter(x.to_owned(), WIN_SIDE);
    let uy = uniform_filter(x_ref.to_owned(), WIN_SIDE);
    let uxx = uniform_filter(x * x, WIN_SIDE);
    let uyy = uniform_filter(x_ref * x_ref, WIN_SIDE);
    let uxy = uniform_filter(x * x_ref, WIN_SIDE);

    // 无偏窗口方差/协方差.
    let vx = (uxx - &ux * &ux) * cov_norm;
    let vy = (uyy - &uy * &uy) * cov_norm;
    let vxy = (uxy - &ux * &uy) * cov_norm;

    let a1 = &ux * &uy * 2.0 + c1;
    let a2 = vxy * 2.0 + c2;
    let b1 = &ux * &ux + &uy * &uy + c1;
    let b2 = vx + vy + c2;
    (a1 * a2) / (b1 * b2)
}

/// 结构相似性.
///
/// 1. `mask` 为 `None` 时返回去掉边界 (各轴两侧各半个窗口) 后响应图的均值;
/// 2. `mask` 存在时返回 **完整** 响应图上脑组织位置的均值, 全空 mask 得到
///    `Ok(f64::NAN)`;
/// 3. `datarange` 为 `None` 时按参考图像偏置的惯例现场推断;
/// 4. 任一维度短于滑动窗口时返回 [`MetricError::WindowTooLarge`].
pub fn ssim<D: Dimension>(
    x: ArrayView<f64, D>,
    x_ref: ArrayView<f64, D>,
    mask: Option<ArrayView<u8, D>>,
    datarange: Option<f64>,
) -> MetricResult<f64> {
    check_same_shape(&x, &x_ref)?;
    if let Some(m) = &mask {
        check_same_shape(&x, m)?;
    }
    let min_side = x.shape().iter().copied().min().unwrap_or(0);
    if min_side < WIN_SIDE {
        return Err(MetricError::WindowTooLarge(min_side, WIN_SIDE));
    }

    let datarange = datarange.unwrap_or_else(|| infer_datarange(&x, &x_ref));
    let map = ssim_map(&x, &x_ref, datarange);

    match mask {
        Some(mask) => {
            let mut sum = 0.0;
            let mut cnt = 0usize;
            Zip::from(&map).and(&mask).for_each(|&s, &m| {
                if is_brain(m) {
                    sum += s;
                    cnt += 1;
                }
            });
            // 全空 mask: 0 / 0.
            Ok(sum / cnt as f64)
        }
        None => {
            let pad = (WIN_SIDE - 1) / 2;
            let mut inner = map.view();
            for ax in 0..inner.ndim() {
                let len = inner.shape()[ax];
                inner.slice_axis_inplace(Axis(ax), Slice::from(pad..len - pad));
            }
            Ok(inner.sum() / inner.len() as f64)
        }
    }
}
