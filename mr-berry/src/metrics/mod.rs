//! 参考图像质量评估指标.
//!
//! 所有指标都以同形状的一对 n 维数组视图为输入, 其中第一个参数是待评估图像,
//! 第二个参数是参考图像.
//!
//! # 注意
//!
//! 1. 违反调用约定 (如两图形状不一致) 会得到 `Err`;
//! 2. 数值退化 (如常数图像, 全空 mask, 非有限强度) 不视为错误,
//!    指标会以 `f64::NAN` 标记该结果, 以便批量调用方按缺失值统计.

use ndarray::{ArrayView, Dimension};

mod fidelity;
mod hist;
mod info;
mod similarity;

pub mod batch;

pub use fidelity::{mae, nmae, nrmse, psnr, rmse};
pub use info::{joint_entropy, mutual_information, normalized_mutual_information, shannon_entropy};
pub use similarity::{ncc, ssim};

/// 指标计算的运行时错误.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricError {
    /// 两个输入的形状不一致.
    ///
    /// 两个参数分别代表第一个和第二个输入的形状.
    ShapeMismatch(Vec<usize>, Vec<usize>),

    /// 输入图像的边长不足以容纳滑动窗口.
    ///
    /// 第一个参数代表目前的最短边长, 第二个参数代表窗口边长.
    WindowTooLarge(usize, usize),
}

/// 指标计算结果.
pub type MetricResult<T> = Result<T, MetricError>;

/// 检查两个输入视图形状是否一致.
pub(crate) fn check_same_shape<A, B, D: Dimension>(
    x: &ArrayView<A, D>,
    x_ref: &ArrayView<B, D>,
) -> MetricResult<()> {
    if x.shape() != x_ref.shape() {
        return Err(MetricError::ShapeMismatch(
            x.shape().to_vec(),
            x_ref.shape().to_vec(),
        ));
    }
    Ok(())
}

/// 有限强度的最小值. 全为非有限值时返回正无穷.
pub(crate) fn data_min<D: Dimension>(data: &ArrayView<f64, D>) -> f64 {
    data.iter()
        .filter(|v| v.is_finite())
        .fold(f64::INFINITY, |acc, &v| acc.min(v))
}

/// 有限强度的最大值. 全为非有限值时返回负无穷.
pub(crate) fn data_max<D: Dimension>(data: &ArrayView<f64, D>) -> f64 {
    data.iter()
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, |acc, &v| acc.max(v))
}

/// 当调用方未指定动态范围时, 用参考图像偏置的惯例推断:
/// 上界只看参考图像, 下界取两图之较小者, 最后向零截断.
pub(crate) fn infer_datarange<D: Dimension>(
    x: &ArrayView<f64, D>,
    x_ref: &ArrayView<f64, D>,
) -> f64 {
    (data_max(x_ref) - data_min(x).min(data_min(x_ref))).trunc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_check_same_shape() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let b = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        assert!(check_same_shape(&a.view(), &a.view()).is_ok());
        let err = check_same_shape(&a.view(), &b.view()).unwrap_err();
        assert_eq!(err, MetricError::ShapeMismatch(vec![2, 2], vec![2, 3]));
    }

    #[test]
    fn test_data_range_skips_non_finite() {
        let a = array![f64::NAN, -3.0, 7.5, f64::INFINITY];
        assert_eq!(data_min(&a.view()), -3.0);
        assert_eq!(data_max(&a.view()), 7.5);
    }

    #[test]
    fn test_infer_datarange_is_reference_biased() {
        let x = array![[-2.5, 0.0], [1.0, 3.0]];
        let x_ref = array![[0.0, 1.0], [2.0, 10.9]];
        // 10.9 - (-2.5) = 13.4, 向零截断.
        assert_eq!(infer_datarange(&x.view(), &x_ref.view()), 13.0);
        // 上界不看第一个输入.
        let hot = array![[100.0, 0.0], [0.0, 0.0]];
        assert_eq!(infer_datarange(&hot.view(), &x_ref.view()), 10.0);
    }
}
