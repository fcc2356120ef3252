//! 六类经典 MR 退化对全套质量指标影响的消融实验.
//!
//! 每类退化各占一个线程, 在同一个确定性仿体上按三档严重程度运行,
//! 结束后统一汇报每档的逐层指标均值.

mod degrade;
mod result;
mod runner;

fn main() {
    runner::run().analyze();
}
