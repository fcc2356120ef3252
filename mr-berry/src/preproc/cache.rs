//! 预处理结果的本地 npz 缓存.
//!
//! 裁剪/清零是整条评估流水线中最慢的读盘环节之一, 把结果缓存成
//! npz 归档可以让重复评估跳过原始 nifti. 归档内含三个条目:
//! `stack.npy`, `mask.npy` 与 `pixdim.npy`.
//!
//! # 注意
//!
//! 归档不保存完整 nifti header, 因此重新加载的 [`StackPair`]
//! 是合成结构 (见 [`crate::MriStack::is_synthetic`]).

use std::fs::File;
use std::path::Path;

use ndarray::{arr1, Ix1, Ix3, OwnedRepr};
use ndarray_npy::{NpzReader, NpzWriter, ReadNpzError, WriteNpzError};

use crate::{BrainMask, MriStack, NiftiVolumeAttr, OpenPairError, StackPair};

/// 缓存读写错误.
#[derive(Debug)]
pub enum CacheError {
    /// 底层 I/O 错误.
    IoError(std::io::Error),

    /// 写 npz 文件错误.
    WriteNpzError(WriteNpzError),

    /// 读 npz 文件错误.
    ReadNpzError(ReadNpzError),

    /// 归档内容无法重建成合法的 [`StackPair`].
    OpenPairError(OpenPairError),
}

/// 把整个 [`StackPair`] 连同体素分辨率写入 `path` 处的 npz 归档.
pub fn save_pair<P: AsRef<Path>>(pair: &StackPair, path: P) -> Result<(), CacheError> {
    let file = File::create(path.as_ref()).map_err(CacheError::IoError)?;
    let mut npz = NpzWriter::new(file);
    npz.add_array("stack", &pair.stack.data())
        .map_err(CacheError::WriteNpzError)?;
    npz.add_array("mask", &pair.mask.data())
        .map_err(CacheError::WriteNpzError)?;
    npz.add_array("pixdim", &arr1(&pair.stack.pix_dim()))
        .map_err(CacheError::WriteNpzError)?;
    npz.finish().map_err(CacheError::WriteNpzError)?;
    Ok(())
}

/// 从 `path` 处的 npz 归档重建 [`StackPair`].
pub fn load_pair<P: AsRef<Path>>(path: P) -> Result<StackPair, CacheError> {
    let file = File::open(path.as_ref()).map_err(CacheError::IoError)?;
    let mut npz = NpzReader::new(file).map_err(CacheError::ReadNpzError)?;

    let stack = npz
        .by_name::<OwnedRepr<f64>, Ix3>("stack.npy")
        .map_err(CacheError::ReadNpzError)?;
    let mask = npz
        .by_name::<OwnedRepr<u8>, Ix3>("mask.npy")
        .map_err(CacheError::ReadNpzError)?;
    let pixdim = npz
        .by_name::<OwnedRepr<f64>, Ix1>("pixdim.npy")
        .map_err(CacheError::ReadNpzError)?;
    assert_eq!(pixdim.len(), 3, "pixdim 条目长度必须为 3");

    // 归档按 (z, H, W) 存储, 构造入口按 nifti 惯例吃 [w, h, z].
    let pix = [pixdim[2] as f32, pixdim[1] as f32, pixdim[0] as f32];
    let stack = MriStack::from_parts(stack.permuted_axes([2, 1, 0]), pix);
    let mask = BrainMask::from_parts(mask.permuted_axes([2, 1, 0]), pix);
    StackPair::from_pair(stack, mask).map_err(CacheError::OpenPairError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;
    use std::env::temp_dir;

    #[test]
    fn test_cache_round_trip() {
        simple_logger::SimpleLogger::new().init().ok();

        let data = Array3::from_shape_fn((5, 6, 4), |(w, h, z)| (z * 100 + h * 10 + w) as f64);
        let mut labels = Array3::zeros((5, 6, 4));
        labels[(2, 3, 1)] = 1u8;
        let pair = StackPair::from_pair(
            MriStack::from_parts(data, [0.8, 0.8, 3.0]),
            BrainMask::from_parts(labels, [0.8, 0.8, 3.0]),
        )
        .unwrap();

        let path = temp_dir().join("mr_berry_pair_cache.npz");
        save_pair(&pair, &path).unwrap();
        let restored = load_pair(&path).unwrap();

        assert_eq!(restored.stack.data(), pair.stack.data());
        assert_eq!(restored.mask.data(), pair.mask.data());
        assert_eq!(restored.stack.pix_dim(), pair.stack.pix_dim());
        assert!(restored.stack.is_synthetic());
    }

    #[test]
    fn test_load_of_missing_file() {
        let path = temp_dir().join("mr_berry_no_such_cache.npz");
        assert!(matches!(
            load_pair(&path),
            Err(CacheError::IoError(_))
        ));
    }
}
