//! 信息论指标: 香农熵, 联合熵, 互信息与归一化互信息.

use super::hist::{counts_entropy, hist1d, hist2d};
use super::{check_same_shape, MetricResult};
use ndarray::{ArrayView, Dimension};

/// 强度直方图的香农熵, 以自然对数为底.
///
/// 直方图按数据自身取值范围等宽划分 `bins` 个 bin.
/// 数据为空或含非有限值时返回 `f64::NAN`; `bins` 为 0 时 panic.
pub fn shannon_entropy<D: Dimension>(x: ArrayView<f64, D>, bins: usize) -> f64 {
    match hist1d(&x, bins) {
        Some(counts) => counts_entropy(&counts),
        None => f64::NAN,
    }
}

/// 两图联合直方图的香农熵. 两个轴各自按自身取值范围等宽划分 `bins` 个 bin.
///
/// 数据退化时返回 `Ok(f64::NAN)`; `bins` 为 0 时 panic.
pub fn joint_entropy<D: Dimension>(
    x: ArrayView<f64, D>,
    x_ref: ArrayView<f64, D>,
    bins: usize,
) -> MetricResult<f64> {
    check_same_shape(&x, &x_ref)?;
    Ok(match hist2d(&x, &x_ref, bins) {
        Some(counts) => counts_entropy(&counts),
        None => f64::NAN,
    })
}

/// 互信息: `H(x) + H(x_ref) - H(x, x_ref)`.
///
/// 数据退化时返回 `Ok(f64::NAN)`; `bins` 为 0 时 panic.
pub fn mutual_information<D: Dimension>(
    x: ArrayView<f64, D>,
    x_ref: ArrayView<f64, D>,
    bins: usize,
) -> MetricResult<f64> {
    check_same_shape(&x, &x_ref)?;
    let hj = joint_entropy(x.view(), x_ref.view(), bins)?;
    Ok(shannon_entropy(x, bins) + shannon_entropy(x_ref, bins) - hj)
}

/// 归一化互信息: `(H(x) + H(x_ref)) / H(x, x_ref)`.
///
/// 注意该形式不落在 \[0, 1\] 区间上: 两图完全相关时取 2,
/// 完全独立时趋于 1. 数据退化 (含两张常数图, 其联合熵为 0) 时返回
/// `Ok(f64::NAN)`; `bins` 为 0 时 panic.
pub fn normalized_mutual_information<D: Dimension>(
    x: ArrayView<f64, D>,
    x_ref: ArrayView<f64, D>,
    bins: usize,
) -> MetricResult<f64> {
    check_same_shape(&x, &x_ref)?;
    let hj = joint_entropy(x.view(), x_ref.view(), bins)?;
    Ok((shannon_entropy(x, bins) + shannon_entropy(x_ref, bins)) / hj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricError;
    use ndarray::array;

    fn f64_eq(x: f64, y: f64) -> bool {
        (x - y).abs() < 1e-9
    }

    #[test]
    fn test_entropy_uniform_and_constant() {
        let uniform = array![1.0, 2.0, 3.0, 4.0];
        assert!(f64_eq(shannon_entropy(uniform.view(), 4), 4.0_f64.ln()));

        let constant = array![5.0, 5.0, 5.0, 5.0];
        assert!(f64_eq(shannon_entropy(constant.view(), 2), 0.0));

        let broken = array![1.0, f64::NAN];
        assert!(shannon_entropy(broken.view(), 2).is_nan());
    }

    #[test]
    fn test_mi_of_permuted_image() {
        let x = array![[1.0, 2.0], [3.0, 4.0]];
        let x_ref = array![[4.0, 3.0], [2.0, 1.0]];

        // 双射关系下互信息达到单图熵.
        let mi = mutual_information(x.view(), x_ref.view(), 4).unwrap();
        assert!(f64_eq(mi, 4.0_f64.ln()));

        let nmi = normalized_mutual_information(x.view(), x_ref.view(), 4).unwrap();
        assert!(f64_eq(nmi, 2.0));

        let hj = joint_entropy(x.view(), x_ref.view(), 4).unwrap();
        assert!(f64_eq(hj, 4.0_f64.ln()));
    }

    #[test]
    fn test_mi_is_symmetric() {
        let a = array![[0.5, 2.0, 1.0], [3.5, 2.5, 0.0]];
        let b = array![[1.1, 0.2, 2.2], [0.9, 3.3, 1.8]];
        let ab = mutual_information(a.view(), b.view(), 3).unwrap();
        let ba = mutual_information(b.view(), a.view(), 3).unwrap();
        assert!((ab - ba).abs() < 1e-12);
    }

    #[test]
    fn test_joint_entropy_shape_mismatch() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let b = array![[1.0], [2.0]];
        let err = joint_entropy(a.view(), b.view(), 4).unwrap_err();
        assert!(matches!(err, MetricError::ShapeMismatch(..)));
    }

    #[test]
    fn test_nmi_of_two_constant_images() {
        let a = array![2.0, 2.0, 2.0];
        let b = array![7.0, 7.0, 7.0];
        // 联合熵为 0, 比值无意义.
        assert!(normalized_mutual_information(a.view(), b.view(), 4)
            .unwrap()
            .is_nan());
    }
}
