#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 提供胎儿脑部 3D MR stack (及其脑 mask) 文件的结构化信息和质量评估算法.
//!
//! 该 crate 目前仅提供 `safe` 接口. 将来可能为部分高性能场景关键路径提供 `unsafe` 接口.
//!
//! # 注意
//!
//! 1. 指标族函数把两个输入形状不一致视为调用错误并返回 `Err`;
//!   数值上的退化输入 (方差为零, 动态范围无意义等) 不报错,
//!   而是以 NaN/Inf 哨兵值体现在返回值中.
//! 2. 在违反调用契约的情况下 (如直方图 bin 个数为 0), 程序会直接 panic,
//!   而不会导致内存错误. As what Rust promises.
//!
//! # 开发计划
//!
//! ### 参考型图像质量指标 (IQM) 库 ✅
//!
//! NCC, Shannon 熵, 联合熵, MI, NMI, PSNR, NRMSE, RMSE, MAE, NMAE, SSIM
//! 共 11 个纯函数, 任意维度输入.
//!
//! 实现位于 `mr-berry/src/metrics`.
//!
//! ### 直方图核心例程 ✅
//!
//! 等宽 1-D/2-D 直方图, 区间取数据自身动态范围, 退化区间按 ±0.5 扩张.
//! 熵族指标共享该语义.
//!
//! 实现位于 `mr-berry/src/metrics/hist.rs`.
//!
//! ### 带 mask 的 SSIM 选择策略 ✅
//!
//! 无 mask 时返回裁剪边界后的整图均值; 有 mask 时返回完整逐像素图在
//! mask 非零处的均值.
//!
//! 实现位于 `mr-berry/src/metrics/similarity.rs`.
//!
//! ### 逐相邻切片的批量 IQM 汇总 ✅
//!
//! 相邻切片对的全指标行, NaN 感知的均值/中位数/极值聚合.
//!
//! 实现位于 `mr-berry/src/metrics/batch.rs`.
//!
//! ### mask 包围盒裁剪与 mask 应用 ✅
//!
//! 以毫米边距扩张包围盒后裁剪 stack 与 mask; 将 mask 外强度置零.
//!
//! 实现位于 `mr-berry/src/preproc`.
//!
//! ### 预处理结果的 npz 缓存 ✅
//!
//! 实现位于 `mr-berry/src/preproc/cache.rs`.
//!
//! ### 灰度窗口视图 ✅
//!
//! MR 强度没有绝对标度, 窗口直接来自数据动态范围.
//!
//! 实现位于 `mr-berry/src/data/window.rs`.
//!
//! ### 切片视图与持久化 ✅
//!
//! stack/mask 的借用/可变/owned 切片, zlib 压缩存储, PNG 导出.
//!
//! 实现位于 `mr-berry/src/data/slice`.
//!
//! ### 并行支持 ✅
//!
//! `rayon` feature 下的逐切片并行与并行批量汇总.
//!
//! ### 完善代码文档 ✅
//!
//! 给每个 public API 提供文档, 并视情况给 private
//! API 提供文档.

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

type Predicate = fn(u8) -> bool;

/// 3D MR nii 文件基础数据结构.
mod data;

pub use data::{
    BrainMask, CompactMaskSlice, GrayWindow, ImgWriteRaw, ImgWriteVis, MaskSlice, MaskSliceMut,
    MriStack, NiftiVolumeAttr, OpenPairError, OwnedMaskSlice, OwnedStackSlice, StackPair,
    StackSlice, StackSliceMut,
};

pub mod consts;

pub mod metrics;
pub mod preproc;
pub mod prelude;
