//! 程序运行函数.

use crate::result::AblationResult;
use std::thread;

/// 实际运行.
pub fn run() -> AblationResult {
    let clean = utils::phantom::head_phantom();

    println!(
        "Running degradation studies ({} cores available)...",
        utils::cpus()
    );
    thread::scope(|s| {
        use super::degrade::*;

        let clean = &clean;
        let handles = [noise, blur, bias_field, ghosting, gamma_shift, stripes]
            .map(|t| s.spawn(move || t(clean)));

        AblationResult::from_iter(
            ["noise", "blur", "bias-field", "ghosting", "gamma", "stripes"]
                .into_iter()
                .zip(
                    handles
                        .into_iter()
                        .map(|th| th.join().expect("Thread joining error")),
                ),
        )
    })
}
