//! 等宽直方图底层构件.
//!
//! 区间惯例与 numpy 保持一致: bin 按数据自身的 \[最小值, 最大值\]
//! 闭区间等宽划分, 最大值本身并入最后一个 bin.

use ndarray::{ArrayView, Dimension};

/// 数据的取值闭区间.
///
/// 1. 空输入或含任何非有限值时返回 `None`;
/// 2. 常数数据时按 numpy 惯例把区间对称扩展半个单位.
pub(crate) fn value_range<D: Dimension>(data: &ArrayView<f64, D>) -> Option<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &v in data.iter() {
        if !v.is_finite() {
            return None;
        }
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if lo > hi {
        // 空输入.
        return None;
    }
    if lo == hi {
        return Some((lo - 0.5, hi + 0.5));
    }
    Some((lo, hi))
}

/// `v` 在 `[lo, hi]` 等宽 `bins` 划分下的 bin 下标.
///
/// 调用方保证 `lo <= v <= hi` 且 `lo < hi`.
#[inline]
pub(crate) fn bin_index(v: f64, lo: f64, hi: f64, bins: usize) -> usize {
    let idx = ((v - lo) / (hi - lo) * bins as f64) as usize;
    // 右端点并入最后一个 bin.
    idx.min(bins - 1)
}

/// 一维等宽直方图. 数据退化时返回 `None`.
///
/// 当 `bins` 为 0 时 panic.
pub(crate) fn hist1d<D: Dimension>(data: &ArrayView<f64, D>, bins: usize) -> Option<Vec<usize>> {
    assert_ne!(bins, 0, "直方图 bin 个数不能为 0");
    let (lo, hi) = value_range(data)?;
    let mut counts = vec![0usize; bins];
    for &v in data.iter() {
        counts[bin_index(v, lo, hi, bins)] += 1;
    }
    Some(counts)
}

/// 二维联合等宽直方图, 行优先存储, 两个轴各自按自身取值范围划分.
/// 任一输入退化时返回 `None`.
///
/// 当 `bins` 为 0 时 panic.
pub(crate) fn hist2d<D: Dimension>(
    x: &ArrayView<f64, D>,
    y: &ArrayView<f64, D>,
    bins: usize,
) -> Option<Vec<usize>> {
    assert_ne!(bins, 0, "直方图 bin 个数不能为 0");
    debug_assert_eq!(x.len(), y.len());
    let (x_lo, x_hi) = value_range(x)?;
    let (y_lo, y_hi) = value_range(y)?;
    let mut counts = vec![0usize; bins * bins];
    for (&a, &b) in x.iter().zip(y.iter()) {
        counts[bin_index(a, x_lo, x_hi, bins) * bins + bin_index(b, y_lo, y_hi, bins)] += 1;
    }
    Some(counts)
}

/// 频次表的香农熵, 以自然对数为底.
///
/// 总频次为 0 时返回 `f64::NAN`.
pub(crate) fn counts_entropy(counts: &[usize]) -> f64 {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return f64::NAN;
    }
    let total = total as f64;
    let mut h = 0.0;
    for &c in counts.iter().filter(|&&c| c != 0) {
        let p = c as f64 / total;
        h -= p * p.ln();
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    fn f64_eq(x: f64, y: f64) -> bool {
        (x - y).abs() < 1e-9
    }

    #[test]
    fn test_value_range_rules() {
        let v = array![3.0, 1.0, 2.0];
        assert_eq!(value_range(&v.view()), Some((1.0, 3.0)));

        let constant = array![5.0, 5.0];
        assert_eq!(value_range(&constant.view()), Some((4.5, 5.5)));

        let with_nan = array![1.0, f64::NAN];
        assert_eq!(value_range(&with_nan.view()), None);

        let empty = Array1::<f64>::zeros(0);
        assert_eq!(value_range(&empty.view()), None);
    }

    #[test]
    fn test_hist1d_uniform_bins() {
        let v = array![1.0, 2.0, 3.0, 4.0];
        assert_eq!(hist1d(&v.view(), 4), Some(vec![1, 1, 1, 1]));

        // 最大值并入最后一个 bin, 而非落到虚构的下一个 bin.
        assert_eq!(hist1d(&v.view(), 3), Some(vec![1, 1, 2]));
    }

    #[test]
    fn test_hist1d_constant_data() {
        let v = array![5.0, 5.0, 5.0, 5.0];
        assert_eq!(hist1d(&v.view(), 2), Some(vec![0, 4]));
    }

    #[test]
    #[should_panic(expected = "直方图 bin 个数不能为 0")]
    fn test_hist1d_zero_bins_panics() {
        let v = array![1.0, 2.0];
        let _ = hist1d(&v.view(), 0);
    }

    #[test]
    fn test_hist2d_diagonal() {
        let x = array![1.0, 2.0];
        let y = array![10.0, 20.0];
        assert_eq!(hist2d(&x.view(), &y.view(), 2), Some(vec![1, 0, 0, 1]));
    }

    #[test]
    fn test_counts_entropy() {
        assert!(f64_eq(counts_entropy(&[1, 1, 1, 1]), 4.0_f64.ln()));
        assert!(f64_eq(counts_entropy(&[4, 0, 0]), 0.0));
        assert!(counts_entropy(&[0, 0]).is_nan());
    }
}
