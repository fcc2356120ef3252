//! 成对图像的全套指标与整个 stack 的逐层汇总.

use itertools::Itertools;
use ndarray::{ArrayView, Dimension};
use ordered_float::NotNan;

use super::{
    joint_entropy, mae, mutual_information, ncc, nmae, normalized_mutual_information, nrmse,
    psnr, rmse, ssim, MetricResult,
};
use crate::StackPair;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelIterator, ParallelIterator};
    }
}

/// 一对同形状图像的全套质量指标.
///
/// 字段顺序与 [`PairIqm::NAMES`] 一致. 计算失败的指标以 `f64::NAN` 占位.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PairIqm {
    /// 归一化互相关.
    pub ncc: f64,

    /// 联合熵.
    pub joint_entropy: f64,

    /// 互信息.
    pub mi: f64,

    /// 归一化互信息.
    pub nmi: f64,

    /// 峰值信噪比.
    pub psnr: f64,

    /// 归一化均方根误差.
    pub nrmse: f64,

    /// 均方根误差.
    pub rmse: f64,

    /// 平均绝对误差.
    pub mae: f64,

    /// 归一化平均绝对误差.
    pub nmae: f64,

    /// 结构相似性.
    pub ssim: f64,
}

impl PairIqm {
    /// 全部指标名, 与 [`PairIqm::values`] 顺序一致.
    pub const NAMES: [&'static str; 10] = [
        "ncc",
        "joint_entropy",
        "mi",
        "nmi",
        "psnr",
        "nrmse",
        "rmse",
        "mae",
        "nmae",
        "ssim",
    ];

    /// 指标名到 [`PairIqm::NAMES`] 下标的映射.
    pub fn metric_index(name: &str) -> Option<usize> {
        Self::NAMES.iter().position(|n| *n == name)
    }

    /// 按 [`PairIqm::NAMES`] 顺序导出指标值.
    pub fn values(&self) -> [f64; 10] {
        [
            self.ncc,
            self.joint_entropy,
            self.mi,
            self.nmi,
            self.psnr,
            self.nrmse,
            self.rmse,
            self.mae,
            self.nmae,
            self.ssim,
        ]
    }

    /// 按 [`PairIqm::NAMES`] 顺序装填指标值.
    pub fn from_values(values: [f64; 10]) -> Self {
        let [ncc, joint_entropy, mi, nmi, psnr, nrmse, rmse, mae, nmae, ssim] = values;
        Self {
            ncc,
            joint_entropy,
            mi,
            nmi,
            psnr,
            nrmse,
            rmse,
            mae,
            nmae,
            ssim,
        }
    }

    /// 获取能迭代 `(指标名, 指标值)` 的迭代器.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> {
        Self::NAMES.into_iter().zip(self.values())
    }
}

/// 对一对同形状图像计算全套指标.
///
/// 单项指标的 `Err` 不会中断整套计算, 而是以 `f64::NAN` 占位;
/// `mask` 只参与结构相似性的取值选择. `bins` 为 0 时 panic.
pub fn pair_iqm<D: Dimension>(
    x: ArrayView<f64, D>,
    x_ref: ArrayView<f64, D>,
    mask: Option<ArrayView<u8, D>>,
    bins: usize,
) -> PairIqm {
    fn nan_on_err(r: MetricResult<f64>) -> f64 {
        r.unwrap_or(f64::NAN)
    }

    PairIqm {
        ncc: nan_on_err(ncc(x.view(), x_ref.view())),
        joint_entropy: nan_on_err(joint_entropy(x.view(), x_ref.view(), bins)),
        mi: nan_on_err(mutual_information(x.view(), x_ref.view(), bins)),
        nmi: nan_on_err(normalized_mutual_information(x.view(), x_ref.view(), bins)),
        psnr: nan_on_err(psnr(x.view(), x_ref.view(), None)),
        nrmse: nan_on_err(nrmse(x.view(), x_ref.view())),
        rmse: nan_on_err(rmse(x.view(), x_ref.view())),
        mae: nan_on_err(mae(x.view(), x_ref.view())),
        nmae: nan_on_err(nmae(x.view(), x_ref.view())),
        ssim: nan_on_err(ssim(x.view(), x_ref.view(), mask, None)),
    }
}

/// 整个 stack 的逐层质量报告.
///
/// 每行是 `(z 下标, 该层与上一相邻层的全套指标)`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StackReport {
    rows: Vec<(usize, PairIqm)>,
}

impl StackReport {
    /// 由已计算的行直接构建.
    #[inline]
    pub fn from_rows(rows: Vec<(usize, PairIqm)>) -> Self {
        Self { rows }
    }

    /// 全部行.
    #[inline]
    pub fn rows(&self) -> &[(usize, PairIqm)] {
        &self.rows
    }

    /// 行数.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 报告是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 各指标在全部行上的均值, 按 [`PairIqm::NAMES`] 顺序排列.
    ///
    /// 非有限值按缺失处理; 某指标全部缺失时以 `f64::NAN` 占位.
    pub fn mean(&self) -> [f64; 10] {
        let mut ans = [f64::NAN; 10];
        for (idx, slot) in ans.iter_mut().enumerate() {
            let mut sum = 0.0;
            let mut cnt = 0usize;
            for (_, iqm) in self.rows.iter() {
                let v = iqm.values()[idx];
                if v.is_finite() {
                    sum += v;
                    cnt += 1;
                }
            }
            if cnt > 0 {
                *slot = sum / cnt as f64;
            }
        }
        ans
    }

    /// 各指标在全部行上的中位数, 按 [`PairIqm::NAMES`] 顺序排列.
    ///
    /// 非有限值按缺失处理; 某指标全部缺失时以 `f64::NAN` 占位.
    pub fn median(&self) -> [f64; 10] {
        let mut ans = [f64::NAN; 10];
        for (idx, slot) in ans.iter_mut().enumerate() {
            let sorted: Vec<f64> = self
                .rows
                .iter()
                .map(|(_, iqm)| iqm.values()[idx])
                .filter(|v| v.is_finite())
                .sorted_by(f64::total_cmp)
                .collect();
            let m = sorted.len();
            if m == 0 {
                continue;
            }
            *slot = if m % 2 == 1 {
                sorted[m / 2]
            } else {
                (sorted[m / 2 - 1] + sorted[m / 2]) / 2.0
            };
        }
        ans
    }

    /// 指标值最大的行. `metric` 是 [`PairIqm::NAMES`] 下标.
    ///
    /// `NaN` 行不参与比较; 无可比较行时返回 `None`.
    pub fn max_by_metric(&self, metric: usize) -> Option<&(usize, PairIqm)> {
        self.rows
            .iter()
            .filter_map(|row| NotNan::new(row.1.values()[metric]).ok().map(|v| (row, v)))
            .max_by_key(|(_, v)| *v)
            .map(|(row, _)| row)
    }

    /// 指标值最小的行. `metric` 是 [`PairIqm::NAMES`] 下标.
    ///
    /// `NaN` 行不参与比较; 无可比较行时返回 `None`.
    pub fn min_by_metric(&self, metric: usize) -> Option<&(usize, PairIqm)> {
        self.rows
            .iter()
            .filter_map(|row| NotNan::new(row.1.values()[metric]).ok().map(|v| (row, v)))
            .min_by_key(|(_, v)| *v)
            .map(|(row, _)| row)
    }
}

/// 第 `z` 层与第 `z + 1` 层的一行报告. 两层 mask 均为全背景时返回 `None`.
fn adjacent_row(pair: &StackPair, z: usize, bins: usize) -> Option<(usize, PairIqm)> {
    let (s0, m0) = pair.slice_at(z);
    let (s1, m1) = pair.slice_at(z + 1);
    if m0.is_background() && m1.is_background() {
        return None;
    }
    let union = m0.union(&m1);
    let union = union.as_immut();
    Some((
        z,
        pair_iqm(s0.data(), s1.data(), Some(union.array_view()), bins),
    ))
}

/// 对 stack 的每对相邻切片计算全套指标, 汇总成报告.
///
/// 约定以相邻层互为参考: 运动伪影会同时压低一段相邻层的相似性.
/// 两层 mask 均为全背景的切片对会被跳过; 结构相似性在两层 mask
/// 的并集上取值. `bins` 为 0 时 panic.
pub fn stack_report(pair: &StackPair, bins: usize) -> StackReport {
    let rows = (0..pair.len_z().saturating_sub(1))
        .filter_map(|z| adjacent_row(pair, z, bins))
        .collect();
    StackReport::from_rows(rows)
}

/// [`stack_report`] 的并行版本, 行序与串行版本一致.
#[cfg(feature = "rayon")]
pub fn par_stack_report(pair: &StackPair, bins: usize) -> StackReport {
    let rows = (0..pair.len_z().saturating_sub(1))
        .into_par_iter()
        .filter_map(|z| adjacent_row(pair, z, bins))
        .collect();
    StackReport::from_rows(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::DEFAULT_BINS;
    use crate::{BrainMask, MriStack};
    use ndarray::Array3;

    fn f64_eq(x: f64, y: f64) -> bool {
        (x - y).abs() < 1e-9
    }

    /// 三层完全相同的 stack, mask 全脑.
    fn identical_pair() -> StackPair {
        let data = Array3::from_shape_fn((8, 8, 3), |(w, h, _)| (h * 8 + w) as f64);
        let stack = MriStack::from_parts(data, [1.0, 1.0, 3.0]);
        let mask = BrainMask::from_parts(Array3::ones((8, 8, 3)), [1.0, 1.0, 3.0]);
        StackPair::from_pair(stack, mask).unwrap()
    }

    #[test]
    fn test_report_on_identical_slices() {
        let report = stack_report(&identical_pair(), DEFAULT_BINS);
        assert_eq!(report.len(), 2);

        let ncc_i = PairIqm::metric_index("ncc").unwrap();
        let psnr_i = PairIqm::metric_index("psnr").unwrap();
        let nmi_i = PairIqm::metric_index("nmi").unwrap();
        let ssim_i = PairIqm::metric_index("ssim").unwrap();

        let mean = report.mean();
        assert!(f64_eq(mean[ncc_i], 63.0 / 64.0));
        assert!(f64_eq(mean[nmi_i], 2.0));
        assert!(f64_eq(mean[ssim_i], 1.0));

        // 相同切片对的信噪比没有意义.
        assert!(mean[psnr_i].is_nan());
        assert!(report.max_by_metric(psnr_i).is_none());
        assert!(report.max_by_metric(ncc_i).is_some());
    }

    #[test]
    fn test_report_skips_empty_mask_pairs() {
        let data = Array3::from_shape_fn((8, 8, 3), |(w, h, z)| (z * 64 + h * 8 + w) as f64);
        let stack = MriStack::from_parts(data, [1.0, 1.0, 3.0]);
        let mut labels = Array3::zeros((8, 8, 3));
        // 只有最顶层有脑组织.
        for w in 2..6 {
            for h in 2..6 {
                labels[(w, h, 2)] = 1u8;
            }
        }
        let mask = BrainMask::from_parts(labels, [1.0, 1.0, 3.0]);
        let pair = StackPair::from_pair(stack, mask).unwrap();

        let report = stack_report(&pair, DEFAULT_BINS);
        assert_eq!(report.len(), 1);
        assert_eq!(report.rows()[0].0, 1);
    }

    #[test]
    fn test_mean_median_and_extremes() {
        let row = |v: f64| PairIqm::from_values([v; 10]);
        let mut middle = row(2.0);
        middle.psnr = f64::NAN;
        let report =
            StackReport::from_rows(vec![(0, row(1.0)), (1, middle), (2, row(3.0))]);

        let ncc_i = PairIqm::metric_index("ncc").unwrap();
        let psnr_i = PairIqm::metric_index("psnr").unwrap();

        assert!(f64_eq(report.mean()[ncc_i], 2.0));
        assert!(f64_eq(report.median()[ncc_i], 2.0));
        // psnr 缺失一行, 剩两行取均值.
        assert!(f64_eq(report.mean()[psnr_i], 2.0));
        assert!(f64_eq(report.median()[psnr_i], 2.0));

        assert_eq!(report.max_by_metric(psnr_i).unwrap().0, 2);
        assert_eq!(report.min_by_metric(ncc_i).unwrap().0, 0);
    }

    #[test]
    fn test_empty_report() {
        let report = StackReport::from_rows(Vec::new());
        assert!(report.is_empty());
        assert!(report.mean().iter().all(|v| v.is_nan()));
        assert!(report.median().iter().all(|v| v.is_nan()));
        assert!(report.min_by_metric(0).is_none());
    }

    #[test]
    fn test_pair_iqm_swallows_errors() {
        let a = Array3::from_shape_fn((8, 8, 1), |(w, h, _)| (h * 8 + w) as f64);
        let b = Array3::from_shape_fn((8, 9, 1), |(w, h, _)| (h * 8 + w) as f64);
        let iqm = pair_iqm(a.view(), b.view(), None, DEFAULT_BINS);
        assert!(iqm.values().iter().all(|v| v.is_nan()));
    }
}

#[cfg(all(test, feature = "rayon"))]
mod par_tests {
    use super::*;
    use crate::consts::DEFAULT_BINS;
    use crate::{BrainMask, MriStack};
    use ndarray::Array3;

    #[test]
    fn test_par_report_matches_serial() {
        let data = Array3::from_shape_fn((9, 9, 5), |(w, h, z)| {
            (z as f64) * 3.0 + (h * 9 + w) as f64
        });
        let stack = MriStack::from_parts(data, [1.0, 1.0, 3.0]);
        let mask = BrainMask::from_parts(Array3::ones((9, 9, 5)), [1.0, 1.0, 3.0]);
        let pair = StackPair::from_pair(stack, mask).unwrap();

        let serial = stack_report(&pair, DEFAULT_BINS);
        let par = par_stack_report(&pair, DEFAULT_BINS);
        assert_eq!(serial.len(), par.len());
        for ((z0, a), (z1, b)) in serial.rows().iter().zip(par.rows().iter()) {
            assert_eq!(z0, z1);
            assert_eq!(a.values(), b.values());
        }
    }
}
