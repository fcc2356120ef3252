//! 保真度指标: 峰值信噪比与若干误差统计.

use super::{check_same_shape, infer_datarange, MetricResult};
use ndarray::{ArrayView, Dimension, Zip};

/// 两图逐体素绝对差的总和低于该值时, 视为同一张图.
const IDENTICAL_SUM_EPS: f64 = 1e-13;

/// 峰值信噪比, 以 dB 为单位.
///
/// `datarange` 为 `None` 时现场推断: 上界只看参考图像,
/// 下界取两图之较小者, 再向零截断.
/// 两图几乎完全一致时信噪比没有意义, 返回 `Ok(f64::NAN)`.
pub fn psnr<D: Dimension>(
    x: ArrayView<f64, D>,
    x_ref: ArrayView<f64, D>,
    datarange: Option<f64>,
) -> MetricResult<f64> {
    check_same_shape(&x, &x_ref)?;
    let datarange = datarange.unwrap_or_else(|| infer_datarange(&x, &x_ref));

    let n = x.len() as f64;
    let mut abs_sum = 0.0;
    let mut sq_sum = 0.0;
    Zip::from(&x).and(&x_ref).for_each(|&a, &b| {
        let d = a - b;
        abs_sum += d.abs();
        sq_sum += d * d;
    });
    if abs_sum < IDENTICAL_SUM_EPS {
        return Ok(f64::NAN);
    }
    Ok(10.0 * (datarange * datarange / (sq_sum / n)).log10())
}

/// 均方根误差.
pub fn rmse<D: Dimension>(x: ArrayView<f64, D>, x_ref: ArrayView<f64, D>) -> MetricResult<f64> {
    check_same_shape(&x, &x_ref)?;
    let n = x.len() as f64;
    let mut sq_sum = 0.0;
    Zip::from(&x).and(&x_ref).for_each(|&a, &b| {
        let d = a - b;
        sq_sum += d * d;
    });
    Ok((sq_sum / n).sqrt())
}

/// 归一化均方根误差.
///
/// 分母按欧几里得惯例取 **第一个输入** 的均方根强度.
pub fn nrmse<D: Dimension>(x: ArrayView<f64, D>, x_ref: ArrayView<f64, D>) -> MetricResult<f64> {
    check_same_shape(&x, &x_ref)?;
    let n = x.len() as f64;
    let mut sq_diff = 0.0;
    let mut sq_x = 0.0;
    Zip::from(&x).and(&x_ref).for_each(|&a, &b| {
        let d = a - b;
        sq_diff += d * d;
        sq_x += a * a;
    });
    Ok((sq_diff / n).sqrt() / (sq_x / n).sqrt())
}

/// 平均绝对误差.
pub fn mae<D: Dimension>(x: ArrayView<f64, D>, x_ref: ArrayView<f64, D>) -> MetricResult<f64> {
    check_same_shape(&x, &x_ref)?;
    let n = x.len() as f64;
    let mut abs_sum = 0.0;
    Zip::from(&x).and(&x_ref).for_each(|&a, &b| {
        abs_sum += (a - b).abs();
    });
    Ok(abs_sum / n)
}

/// 归一化平均绝对误差. 分母取 **参考图像** 的平均绝对强度.
pub fn nmae<D: Dimension>(x: ArrayView<f64, D>, x_ref: ArrayView<f64, D>) -> MetricResult<f64> {
    check_same_shape(&x, &x_ref)?;
    let n = x.len() as f64;
    let mut abs_diff = 0.0;
    let mut abs_ref = 0.0;
    Zip::from(&x).and(&x_ref).for_each(|&a, &b| {
        abs_diff += (a - b).abs();
        abs_ref += b.abs();
    });
    Ok((abs_diff / n) / (abs_ref / n))
}
