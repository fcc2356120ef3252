//! 随机行信号衰减.

use mr_berry::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 在每个切片上随机挑选若干行并压低其信号.
pub(crate) fn apply(stack: &mut MriStack, severity: f64) {
    let mut rng = SmallRng::seed_from_u64(super::SEED);

    for mut sli in stack.slice_iter_mut() {
        let (hh, _) = sli.shape();
        let hits = ((hh as f64 * severity * 2.0).round() as usize).max(1);

        let mut view = sli.data_mut();
        for _ in 0..hits {
            let row = rng.gen_range(0..hh);
            view.row_mut(row).mapv_inplace(|v| v * (1.0 - severity));
        }
    }
}
