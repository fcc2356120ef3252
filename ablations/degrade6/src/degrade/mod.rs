//! 六类退化操作及其评估骨架.
//!
//! 每个子模块实现一类对 3D stack 的就地退化, 本模块负责把退化结果
//! 与干净仿体逐层对比并按严重程度档位汇总.

mod bias;
mod blur;
mod gamma;
mod ghosting;
mod noise;
mod stripes;

use mr_berry::prelude::*;
use std::time::{Duration, Instant};

/// 每类退化共用的严重程度档位.
pub(crate) const SEVERITIES: [f64; 3] = [0.05, 0.15, 0.4];

/// 随机性退化共用的种子, 保证两次运行结果一致.
pub(crate) const SEED: u64 = 0x00c0_ffee;

/// 单类退化在全部严重程度档位上的评估结果.
pub struct DegradeProfile {
    /// (严重程度, 全部有脑切片上 degraded/clean 指标的均值).
    levels: Vec<(f64, PairIqm)>,

    /// 本类退化从开始到结束的自然时间.
    wall: Duration,
}

impl DegradeProfile {
    /// 全部档位结果.
    #[inline]
    pub fn levels(&self) -> &[(f64, PairIqm)] {
        &self.levels
    }

    /// 以毫秒为单位获得本类退化的总自然时间.
    #[inline]
    pub fn wall_ms(&self) -> u64 {
        self.wall.as_millis() as u64
    }
}

/// 对干净仿体的副本逐档位实施 `op`, 并把退化结果与干净版本逐层对比.
fn profile_op<F: Fn(&mut MriStack, f64)>(clean: &StackPair, op: F) -> DegradeProfile {
    let begin = Instant::now();
    let levels = SEVERITIES
        .iter()
        .map(|&severity| {
            let mut degraded = clean.stack.clone();
            op(&mut degraded, severity);
            (severity, mean_iqm(&degraded, clean))
        })
        .collect();
    DegradeProfile {
        levels,
        wall: begin.elapsed(),
    }
}

/// 逐层对比 degraded 与 clean, 返回全部有脑切片上的指标均值.
fn mean_iqm(degraded: &MriStack, clean: &StackPair) -> PairIqm {
    let rows = (0..clean.len_z())
        .filter_map(|z| {
            let mask = clean.mask.slice_at(z);
            if mask.is_background() {
                return None;
            }
            let iqm = pair_iqm(
                degraded.slice_at(z).data(),
                clean.stack.slice_at(z).data(),
                Some(mask.array_view()),
                DEFAULT_BINS,
            );
            Some((z, iqm))
        })
        .collect();
    PairIqm::from_values(StackReport::from_rows(rows).mean())
}

/// 加性噪声.
pub fn noise(clean: &StackPair) -> DegradeProfile {
    println!("noise: degrading...");
    profile_op(clean, noise::apply)
}

/// 面内 box 模糊.
pub fn blur(clean: &StackPair) -> DegradeProfile {
    println!("blur: degrading...");
    profile_op(clean, blur::apply)
}

/// 低频偏置场.
pub fn bias_field(clean: &StackPair) -> DegradeProfile {
    println!("bias-field: degrading...");
    profile_op(clean, bias::apply)
}

/// 相位编码方向的运动伪影.
pub fn ghosting(clean: &StackPair) -> DegradeProfile {
    println!("ghosting: degrading...");
    profile_op(clean, ghosting::apply)
}

/// 全局 gamma 非线性.
pub fn gamma_shift(clean: &StackPair) -> DegradeProfile {
    println!("gamma: degrading...");
    profile_op(clean, gamma::apply)
}

/// 随机行信号衰减.
pub fn stripes(clean: &StackPair) -> DegradeProfile {
    println!("stripes: degrading...");
    profile_op(clean, stripes::apply)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_psnr_decreases_with_severity() {
        let clean = utils::phantom::head_phantom();
        let profile = profile_op(&clean, noise::apply);
        let psnr_i = PairIqm::metric_index("psnr").unwrap();

        let psnrs: Vec<f64> = profile
            .levels()
            .iter()
            .map(|(_, iqm)| iqm.values()[psnr_i])
            .collect();
        assert_eq!(psnrs.len(), SEVERITIES.len());
        assert!(psnrs.iter().all(|p| p.is_finite()));
        assert!(psnrs[0] > psnrs[1] && psnrs[1] > psnrs[2]);
    }

    #[test]
    fn test_every_op_touches_the_volume() {
        let clean = utils::phantom::head_phantom();
        let ops = [
            noise::apply,
            blur::apply,
            bias::apply,
            ghosting::apply,
            gamma::apply,
            stripes::apply,
        ];
        for op in ops {
            let mut degraded = clean.stack.clone();
            op(&mut degraded, 0.4);
            assert_ne!(degraded.data(), clean.stack.data());
            assert_eq!(degraded.shape(), clean.stack.shape());
        }
    }

    #[test]
    fn test_random_ops_are_deterministic() {
        let clean = utils::phantom::head_phantom();
        for op in [noise::apply, stripes::apply] {
            let mut a = clean.stack.clone();
            let mut b = clean.stack.clone();
            op(&mut a, 0.15);
            op(&mut b, 0.15);
            assert_eq!(a.data(), b.data());
        }
    }

    #[test]
    fn test_mean_iqm_of_untouched_copy() {
        let clean = utils::phantom::head_phantom();
        let iqm = mean_iqm(&clean.stack.clone(), &clean);
        // 同一份数据: 相关性拉满, 信噪比全 NaN 被均值忽略后保持 NaN.
        assert!(iqm.ncc > 0.99);
        assert!(iqm.psnr.is_nan());
        assert!((iqm.ssim - 1.0).abs() < 1e-9);
    }
}
