use std::ops::{Index, IndexMut};
use std::path::Path;

use ndarray::{Array3, ArrayView, ArrayViewMut, Axis, Ix3};
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};

use crate::consts::gray::*;
use crate::{Idx2d, Idx3d, Predicate};

pub mod slice;
pub mod window;

pub use slice::{
    CompactMaskSlice, ImgWriteRaw, ImgWriteVis, MaskSlice, MaskSliceMut, OwnedMaskSlice,
    OwnedStackSlice, StackSlice, StackSliceMut,
};

pub use window::GrayWindow;

/// `NiftiHeader` 是栈上大对象, 移动该对象的开销很可观.
/// 因此我们将其分配到堆上.
type BoxedHeader = Box<NiftiHeader>;

/// nii 格式 3D MR stack, 包括 header 和强度数据. 强度值以 `f64` 保存.
#[derive(Debug, Clone)]
pub struct MriStack {
    header: BoxedHeader,
    data: Array3<f64>,
}

/// 将 (W, H, z) 转换成 (z, H, W). 以后均按照该模式访问.
#[inline]
fn get_shape_from_header(h: &NiftiHeader) -> Idx3d {
    // [W, H, z]. 体素个数数组.
    let [_, w, h, z, ..] = h.dim;
    (z as usize, h as usize, w as usize)
}

/// 以合成数据填充一个最小可用的 header.
///
/// `pix_dim` 和 `dim` 按照 nifti 惯例以 \[w, h, z\] 给出.
fn synthetic_header(pix_dim: [f32; 3], dim: [u16; 3]) -> BoxedHeader {
    let mut header = Box::<NiftiHeader>::default();
    let [_, pw, ph, pz, ..] = &mut header.pixdim;
    let [w, h, z] = &pix_dim;
    (*pw, *ph, *pz) = (*w, *h, *z);
    header.dim = [3, dim[0], dim[1], dim[2], 1, 1, 1, 1];
    header.intent_name[..4].copy_from_slice(b"synt");
    header
}

/// 把 header 的体素个数字段改写为数据的实际形状.
fn rewrite_header_dim(header: &mut NiftiHeader, (z, h, w): Idx3d) {
    header.dim = [3, w as u16, h as u16, z as u16, 1, 1, 1, 1];
}

/// 3D MR nii 文件 header 的共用属性和部分通用操作.
pub trait NiftiVolumeAttr {
    /// 获取 header 部分.
    fn header(&self) -> &NiftiHeader;

    /// 获取数据形状大小.
    #[inline]
    fn shape(&self) -> Idx3d {
        get_shape_from_header(self.header())
    }

    /// 获取数据水平切片形状大小.
    #[inline]
    fn slice_shape(&self) -> Idx2d {
        let (_, h, w) = self.shape();
        (h, w)
    }

    /// 获取水平切片个数.
    #[inline]
    fn len_z(&self) -> usize {
        self.shape().0
    }

    /// 获取数据体素个数.
    #[inline]
    fn size(&self) -> usize {
        let (z, h, w) = self.shape();
        z * h * w
    }

    /// 检查索引是否合法.
    #[inline]
    fn check(&self, (z0, h0, w0): &Idx3d) -> bool {
        let (z, h, w) = self.shape();
        *z0 < z && *h0 < h && *w0 < w
    }

    /// 获取单个体素分辨率. 该分辨率以毫米为单位, 分别代表空间 (相邻切片方向),
    /// 高 (自然图像的垂直方向), 宽 (自然图像的水平方向).
    ///
    /// 该值也可以通过 `self.{z_mm, height_mm, width_mm}` 分别获取.
    #[inline]
    fn pix_dim(&self) -> [f64; 3] {
        let [_, w, h, z, ..] = self.header().pixdim;
        [z as f64, h as f64, w as f64]
    }

    /// 获取 width 方向 (自然 2D 图像的水平方向) 体素分辨率, 以毫米为单位.
    #[inline]
    fn width_mm(&self) -> f64 {
        self.header().pixdim[1] as f64
    }

    /// 获取 height 方向 (自然 2D 图像的垂直方向) 体素分辨率, 以毫米为单位.
    #[inline]
    fn height_mm(&self) -> f64 {
        self.header().pixdim[2] as f64
    }

    /// 获取空间方向 (相邻 2D 切片的方向) 体素分辨率, 以毫米为单位.
    #[inline]
    fn z_mm(&self) -> f64 {
        self.header().pixdim[3] as f64
    }

    /// 体素在侧视图上看是否是 "矮胖" 的?
    #[inline]
    fn is_height_greater(&self) -> bool {
        self.height_mm() > self.z_mm()
    }

    /// 体素在侧视图上看是否是 "瘦高" 的? 胎儿序列的厚层采集通常如此.
    #[inline]
    fn is_z_greater(&self) -> bool {
        self.z_mm() > self.height_mm()
    }

    /// 体素分辨率在三个维度上是否是各向同的?
    #[inline]
    fn is_isotropic(&self) -> bool {
        let [z, h, w] = self.pix_dim();
        z == h && z == w
    }

    /// 获取体素的实际体积值, 以立方毫米为单位.
    #[inline]
    fn voxel(&self) -> f64 {
        self.pix_dim().iter().product()
    }

    /// 获取水平切片方向的像素实际面积值, 以平方毫米为单位.
    #[inline]
    fn slice_pixel(&self) -> f64 {
        self.pix_dim().iter().skip(1).product()
    }
}

impl NiftiVolumeAttr for MriStack {
    #[inline]
    fn header(&self) -> &NiftiHeader {
        &self.header
    }
}

impl Index<Idx3d> for MriStack {
    type Output = f64;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl IndexMut<Idx3d> for MriStack {
    #[inline]
    fn index_mut(&mut self, index: Idx3d) -> &mut Self::Output {
        &mut self.data[index]
    }
}

impl MriStack {
    /// 打开 nii 文件格式的 3D MR stack. `path` 为 nii 文件的本地路径.
    /// 如果打开成功, 则返回 `Ok(Self)`, 否则返回 `Err`.
    pub fn open<P: AsRef<Path>>(path: P) -> nifti::Result<Self> {
        let obj = ReaderOptions::new().read_file(path.as_ref())?;
        let header = Box::new(obj.header().clone());

        // [W, H, z] -> [z, H, W].
        // hint: 原第一维向下增长, 原第二维向右增长.
        let data = obj
            .into_volume()
            .into_ndarray::<f64>()?
            .permuted_axes([2, 1, 0].as_slice());

        // The nature of nifti data field layout.
        debug_assert!(data.is_standard_layout());

        // 该操作不会生成 `Err`, 可直接 unwrap.
        let data =
            Array3::<f64>::from_shape_vec(get_shape_from_header(&header), data.into_raw_vec())
                .unwrap();

        Ok(Self { header, data })
    }

    /// 根据裸强度数据和体素分辨率直接创建 `MriStack` 实体.
    ///
    /// # 参数
    ///
    /// 1. `data` 按照 nifti 惯用标准以 \[w, h, z\] 格式存储.
    /// 2. `pix_dim` 按照 \[w, h, z\] 格式存储, 以毫米为单位.
    ///
    /// # 注意
    ///
    /// 该方法创建的 header 仅含形状与分辨率信息, 因此你应仅将其用于
    /// 实验和缓存重建目的.
    pub fn from_parts(data: Array3<f64>, pix_dim: [f32; 3]) -> Self {
        let data = data.permuted_axes([2, 1, 0]);
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().to_owned()
        };
        debug_assert!(data.is_standard_layout());

        let (z, h, w) = data.dim();
        let header = synthetic_header(pix_dim, [w as u16, h as u16, z as u16]);
        Self { header, data }
    }

    /// 判断该结构是否是由 `from_parts` 一类方法手动拼接的.
    pub fn is_synthetic(&self) -> bool {
        self.header.intent_name.starts_with(b"synt")
    }

    /// 以 `header` 为模板, 用 (z, H, W) 格式的 `data` 创建实体.
    /// header 中的体素个数字段会被改写为数据的实际形状.
    pub(crate) fn with_header_zhw(header: &NiftiHeader, data: Array3<f64>) -> Self {
        debug_assert!(data.is_standard_layout());
        let mut header = Box::new(header.clone());
        rewrite_header_dim(&mut header, data.dim());
        Self { header, data }
    }

    /// 全部体素强度的最小值和最大值. 数据为空或全为非有限值时返回 `None`.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for &v in self.data.iter() {
            if !v.is_finite() {
                continue;
            }
            if v < lo {
                lo = v;
            }
            if v > hi {
                hi = v;
            }
        }
        (lo <= hi).then_some((lo, hi))
    }

    /// 获取 3D stack z 空间的第 `z_index` 层切片视图.
    ///
    /// 当 `z_index` 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z_index: usize) -> StackSlice<'_> {
        StackSlice::new(self.data.index_axis(Axis(0), z_index))
    }

    /// 获取 3D stack z 空间的第 `z_index` 层可变切片视图.
    ///
    /// 当 `z_index` 越界时 panic.
    #[inline]
    pub fn slice_at_mut(&mut self, z_index: usize) -> StackSliceMut<'_> {
        StackSliceMut::new(self.data.index_axis_mut(Axis(0), z_index))
    }

    /// 获取能按升序迭代 3D stack 水平不可变切片的迭代器.
    #[inline]
    pub fn slice_iter(&self) -> impl ExactSizeIterator<Item = StackSlice> {
        self.data.axis_iter(Axis(0)).map(StackSlice::new)
    }

    /// 获取能按升序迭代 3D stack 水平可变切片的迭代器.
    #[inline]
    pub fn slice_iter_mut(&mut self) -> impl ExactSizeIterator<Item = StackSliceMut> {
        self.data.axis_iter_mut(Axis(0)).map(StackSliceMut::new)
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, f64, Ix3> {
        self.data.view()
    }

    /// 获得数据的一份可变 shallow copy.
    #[inline]
    pub fn data_mut(&mut self) -> ArrayViewMut<'_, f64, Ix3> {
        self.data.view_mut()
    }
}

/// nii 格式 3D 脑 mask, 包括 header 和标签数据. 标签值以 `u8` 保存,
/// 非零值一律视为脑组织.
#[derive(Debug, Clone)]
pub struct BrainMask {
    header: BoxedHeader,
    data: Array3<u8>,
}

impl NiftiVolumeAttr for BrainMask {
    #[inline]
    fn header(&self) -> &NiftiHeader {
        &self.header
    }
}

impl Index<Idx3d> for BrainMask {
    type Output = u8;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl IndexMut<Idx3d> for BrainMask {
    #[inline]
    fn index_mut(&mut self, index: Idx3d) -> &mut Self::Output {
        &mut self.data[index]
    }
}

impl BrainMask {
    /// 打开 nii 文件格式的 3D 脑 mask. `path` 为 nii 文件的本地路径. 如果打开成功,
    /// 则返回 `Ok(Self)`, 否则返回 `Err`.
    pub fn open<P: AsRef<Path>>(path: P) -> nifti::Result<Self> {
        let obj = ReaderOptions::new().read_file(path.as_ref())?;
        let header = Box::new(obj.header().clone());

        // [W, H, z] -> [z, H, W]
        // hint: 原第一维向下增长, 原第二维向右增长.
        let data = obj
            .into_volume()
            .into_ndarray::<u8>()?
            .permuted_axes([2, 1, 0].as_slice());

        // The nature of nifti data field layout.
        debug_assert!(data.is_standard_layout());

        // 该操作不会生成 `Err`, 可直接 unwrap.
        let data =
            Array3::<u8>::from_shape_vec(get_shape_from_header(&header), data.into_raw_vec())
                .unwrap();

        Ok(Self { header, data })
    }

    /// 根据裸标签数据和体素分辨率直接创建 `BrainMask` 实体.
    ///
    /// # 参数
    ///
    /// 1. `data` 按照 nifti 惯用标准以 \[w, h, z\] 格式存储, 非零值视为脑组织.
    /// 2. `pix_dim` 按照 \[w, h, z\] 格式存储, 以毫米为单位.
    ///
    /// # 注意
    ///
    /// 该方法创建的 header 仅含形状与分辨率信息, 因此你应仅将其用于
    /// 实验和缓存重建目的.
    pub fn from_parts(data: Array3<u8>, pix_dim: [f32; 3]) -> Self {
        let data = data.permuted_axes([2, 1, 0]);
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().to_owned()
        };
        debug_assert!(data.is_standard_layout());

        let (z, h, w) = data.dim();
        let header = synthetic_header(pix_dim, [w as u16, h as u16, z as u16]);
        Self { header, data }
    }

    /// 判断该结构是否是由 `from_parts` 一类方法手动拼接的.
    pub fn is_synthetic(&self) -> bool {
        self.header.intent_name.starts_with(b"synt")
    }

    /// 以 `header` 为模板, 用 (z, H, W) 格式的 `data` 创建实体.
    /// header 中的体素个数字段会被改写为数据的实际形状.
    pub(crate) fn with_header_zhw(header: &NiftiHeader, data: Array3<u8>) -> Self {
        debug_assert!(data.is_standard_layout());
        let mut header = Box::new(header.clone());
        rewrite_header_dim(&mut header, data.dim());
        Self { header, data }
    }

    /// 获取 3D mask z 空间的第 `z_index` 层不可变切片.
    ///
    /// 当 `z_index` 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z_index: usize) -> MaskSlice {
        MaskSlice::new(self.data.index_axis(Axis(0), z_index))
    }

    /// 获取 3D mask z 空间的第 `z_index` 层可变切片.
    ///
    /// 当 `z_index` 越界时 panic.
    #[inline]
    pub fn slice_at_mut(&mut self, z_index: usize) -> MaskSliceMut {
        MaskSliceMut::new(self.data.index_axis_mut(Axis(0), z_index))
    }

    /// 获取能按升序迭代 3D mask 水平不可变切片的迭代器.
    #[inline]
    pub fn slice_iter(&self) -> impl ExactSizeIterator<Item = MaskSlice> {
        self.data.axis_iter(Axis(0)).map(MaskSlice::new)
    }

    /// 获取能按升序迭代 3D mask 水平可变切片的迭代器.
    #[inline]
    pub fn slice_iter_mut(&mut self) -> impl ExactSizeIterator<Item = MaskSliceMut> {
        self.data.axis_iter_mut(Axis(0)).map(MaskSliceMut::new)
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, u8, Ix3> {
        self.data.view()
    }

    /// 获得数据的一份可变 shallow copy.
    #[inline]
    pub fn data_mut(&mut self) -> ArrayViewMut<'_, u8, Ix3> {
        self.data.view_mut()
    }

    /// 获取 3D mask 中值为 `label` 的体素个数.
    #[inline]
    pub fn count(&self, label: u8) -> usize {
        self.data.iter().filter(|p| **p == label).count()
    }

    /// 获取脑 mask 的基本统计信息.
    ///
    /// 统计信息格式为: \[背景体素数, 脑组织体素数\].
    pub fn numeric_statistics(&self) -> [usize; 2] {
        let mut ans = [0; 2];
        for pixel in self.data.iter() {
            ans[usize::from(is_brain(*pixel))] += 1;
        }
        ans
    }

    /// 收集满足谓词 `pred` 的所有体素对应的下标, 结果按行优先存储.
    pub fn filter_pos(&self, pred: Predicate) -> Vec<Idx3d> {
        self.data
            .indexed_iter()
            .filter_map(|(ref pos, pixel)| pred(*pixel).then_some(*pos))
            .collect()
    }

    /// 收集所有脑组织体素对应的下标. 结果按行优先存储.
    #[inline]
    pub fn brain_pos(&self) -> Vec<Idx3d> {
        self.filter_pos(is_brain)
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};
    }
}

/// 并发操作部分
#[cfg(feature = "rayon")]
impl MriStack {
    /// 借助 `rayon`, 并行地对 3D stack 每个水平可变切片实施 `op` 操作.
    pub fn par_for_each_slice_mut<F>(&mut self, op: F)
    where
        F: Fn(StackSliceMut) + Sync + Send,
    {
        self.data_mut()
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .for_each(|v| {
                op(StackSliceMut::new(v));
            });
    }

    /// 借助 `rayon`, 并行地对 3D stack 每个水平不可变切片实施 `op` 操作.
    pub fn par_for_each_slice<F>(&self, op: F)
    where
        F: Fn(StackSlice) + Sync + Send,
    {
        self.data()
            .axis_iter(Axis(0))
            .into_par_iter()
            .for_each(|v| {
                op(StackSlice::new(v));
            });
    }

    /// 借助 `rayon`, 并行地对 3D stack 每个水平可变切片实施 `op` 操作.
    /// 该操作会同时携带 z 方向索引信息.
    pub fn par_for_each_indexed_slice_mut<F>(&mut self, op: F)
    where
        F: Fn(usize, StackSliceMut) + Sync + Send,
    {
        self.data_mut()
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(i, v)| {
                op(i, StackSliceMut::new(v));
            });
    }
}

/// nii 格式的 3D MR stack 与对应的脑 mask.
///
/// 该结构完全透明, 仅包含两个公开的 `stack` 和 `mask` 子结构,
/// 用户可以直接使用它们来实现相关上层功能.
///
/// # 注意
///
/// 构造入口会检查两个子结构的形状一致性; 此后的数据一致性由用户保证.
#[derive(Debug, Clone)]
pub struct StackPair {
    /// 3D MR stack.
    pub stack: MriStack,

    /// 3D 脑 mask.
    pub mask: BrainMask,
}

/// 打开或构建 [`StackPair`] 的错误.
#[derive(Debug)]
pub enum OpenPairError {
    /// 底层 nifti 文件读取错误.
    Nifti(nifti::NiftiError),

    /// stack 与 mask 的数据形状不一致.
    ///
    /// 两个参数分别是 stack 和 mask 的形状.
    ShapeMismatch(Idx3d, Idx3d),
}

impl StackPair {
    /// 分别打开 nii 文件格式的 3D MR stack 和对应脑 mask.
    /// 任一文件打开失败或两者形状不一致时返回 `Err`,
    /// 以便批量调用方记录并跳过该受试者.
    pub fn open(
        stack_path: impl AsRef<Path>,
        mask_path: impl AsRef<Path>,
    ) -> Result<Self, OpenPairError> {
        let stack = MriStack::open(stack_path.as_ref()).map_err(OpenPairError::Nifti)?;
        let mask = BrainMask::open(mask_path.as_ref()).map_err(OpenPairError::Nifti)?;
        Self::from_pair(stack, mask)
    }

    /// 由已打开的两部分构建, 检查形状一致性.
    pub fn from_pair(stack: MriStack, mask: BrainMask) -> Result<Self, OpenPairError> {
        if stack.shape() != mask.shape() {
            return Err(OpenPairError::ShapeMismatch(stack.shape(), mask.shape()));
        }
        Ok(Self { stack, mask })
    }

    /// 获取水平切片个数.
    #[inline]
    pub fn len_z(&self) -> usize {
        self.mask.len_z()
    }

    /// 依次获取 3D stack 和 3D mask z 空间的第 `z_index` 层不可变切片.
    ///
    /// 当 `z_index` 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z_index: usize) -> (StackSlice<'_>, MaskSlice<'_>) {
        (self.stack.slice_at(z_index), self.mask.slice_at(z_index))
    }

    /// 依次获取 3D stack 和 3D mask z 空间的第 `z_index` 层可变切片.
    ///
    /// 当 `z_index` 越界时 panic.
    #[inline]
    pub fn slice_at_mut(&mut self, z_index: usize) -> (StackSliceMut<'_>, MaskSliceMut<'_>) {
        (
            self.stack.slice_at_mut(z_index),
            self.mask.slice_at_mut(z_index),
        )
    }

    /// 获取能按升序迭代 3D 水平 (stack, mask) 不可变切片的迭代器.
    #[inline]
    pub fn slice_iter(&self) -> impl ExactSizeIterator<Item = (StackSlice, MaskSlice)> {
        self.stack.slice_iter().zip(self.mask.slice_iter())
    }

    /// 获取能按升序迭代 3D 水平 (stack, mask) 可变切片的迭代器.
    pub fn slice_iter_mut(
        &mut self,
    ) -> impl ExactSizeIterator<Item = (StackSliceMut, MaskSliceMut)> {
        self.stack.slice_iter_mut().zip(self.mask.slice_iter_mut())
    }

    /// 获取能按行优先序迭代 3D (强度, 标签) 体素的迭代器.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&f64, &u8)> {
        self.stack.data.iter().zip(self.mask.data.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn ramp_stack() -> MriStack {
        // [w, h, z] = (4, 3, 2).
        let data = Array3::from_shape_fn((4, 3, 2), |(w, h, z)| (z * 100 + h * 10 + w) as f64);
        MriStack::from_parts(data, [1.0, 1.0, 3.0])
    }

    #[test]
    fn test_from_parts_shape_and_header() {
        let stack = ramp_stack();
        assert!(stack.is_synthetic());
        // (z, H, W).
        assert_eq!(stack.shape(), (2, 3, 4));
        assert_eq!(stack.slice_shape(), (3, 4));
        assert_eq!(stack.size(), 24);
        assert_eq!(stack.pix_dim(), [3.0, 1.0, 1.0]);
        assert!(stack.is_z_greater());
        assert!(!stack.is_height_greater());
        assert!(!stack.is_isotropic());
        assert_eq!(stack.voxel(), 3.0);
        assert_eq!(stack.slice_pixel(), 1.0);
    }

    #[test]
    fn test_stack_layout_round_trip() {
        let stack = ramp_stack();
        // (z, h, w) 访问与 [w, h, z] 构造数据一致.
        assert_eq!(stack[(0, 0, 0)], 0.0);
        assert_eq!(stack[(1, 2, 3)], 123.0);
        assert_eq!(stack.slice_at(1)[(0, 2)], 102.0);
        assert!(stack.check(&(1, 2, 3)));
        assert!(!stack.check(&(2, 0, 0)));
        assert_eq!(stack.min_max(), Some((0.0, 123.0)));
    }

    #[test]
    fn test_mask_statistics() {
        let mut data = Array3::zeros((4, 4, 2));
        data[(0, 0, 0)] = 1u8;
        data[(1, 2, 1)] = 7u8; // 非零一律视为脑组织
        let mask = BrainMask::from_parts(data, [0.8, 0.8, 4.0]);
        assert!(mask.is_synthetic());
        assert_eq!(mask.numeric_statistics(), [30, 2]);
        assert_eq!(mask.count(7), 1);
        assert_eq!(mask.brain_pos(), vec![(0, 0, 0), (1, 2, 1)]);
    }

    #[test]
    fn test_pair_shape_mismatch() {
        let stack = ramp_stack();
        let mask = BrainMask::from_parts(Array3::zeros((4, 3, 3)), [1.0, 1.0, 3.0]);
        let err = StackPair::from_pair(stack, mask).unwrap_err();
        match err {
            OpenPairError::ShapeMismatch(s, m) => {
                assert_eq!(s, (2, 3, 4));
                assert_eq!(m, (3, 3, 4));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_pair_iterators() {
        let stack = ramp_stack();
        let mask = BrainMask::from_parts(Array3::ones((4, 3, 2)), [1.0, 1.0, 3.0]);
        let pair = StackPair::from_pair(stack, mask).unwrap();
        assert_eq!(pair.len_z(), 2);
        assert_eq!(pair.slice_iter().count(), 2);
        assert_eq!(pair.iter().count(), 24);
    }
}

#[cfg(all(test, feature = "rayon"))]
mod par_tests {
    use super::*;
    use ndarray::Array3;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_par_slice_ops_match_serial() {
        let data = Array3::from_shape_fn((8, 8, 6), |(w, h, z)| (z * 64 + h * 8 + w) as f64);
        let mut par = MriStack::from_parts(data.clone(), [1.0, 1.0, 3.0]);
        let mut serial = MriStack::from_parts(data, [1.0, 1.0, 3.0]);

        par.par_for_each_slice_mut(|mut s| {
            s.iter_mut().for_each(|v| *v *= 2.0);
        });
        for mut s in serial.slice_iter_mut() {
            s.iter_mut().for_each(|v| *v *= 2.0);
        }
        assert_eq!(par.data(), serial.data());

        let nonzero = AtomicUsize::new(0);
        par.par_for_each_slice(|s| {
            let local = s.iter().filter(|v| **v != 0.0).count();
            nonzero.fetch_add(local, Ordering::Relaxed);
        });
        assert_eq!(nonzero.load(Ordering::Relaxed), 8 * 8 * 6 - 1);

        par.par_for_each_indexed_slice_mut(|i, mut s| {
            s.iter_mut().for_each(|v| *v += i as f64);
        });
        assert_eq!(par.slice_at(5)[(0, 0)], serial.slice_at(5)[(0, 0)] + 5.0);
    }
}
