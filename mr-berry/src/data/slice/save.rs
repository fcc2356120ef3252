//! 图像的持久化存储.

use crate::{GrayWindow, MaskSlice, MaskSliceMut, StackSlice, StackSliceMut};
use image::ImageResult;
use std::path::Path;

/// 表明一个可以通过 **可视化友好** 模式持久化存储的图像对象.
///
/// `ImgWriteVis` trait 的意图是, 图像将以 "可视化友好"
/// 的方式保存, 而不是 "as is" 的方式. 这意味着, 对于 `MaskSlice`, `MaskSliceMut`
/// 这类二值图像, 在保存时会映射到肉眼较易区分的黑白形式;
/// 对于 `StackSlice`, `StackSliceMut` 这类以任意 MR 强度存储的切片,
/// 在保存时会用切片自身的动态范围规范化.
pub trait ImgWriteVis {
    /// 按照一定的可视化规则将图片保存到 `path` 路径.
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

/// 表明一个可以通过 **按原样** 模式持久化存储的图像对象.
///
/// `ImgWriteRaw` trait 的额外意图是, 图像将按原样保存. 这意味着,
/// 对于 `MaskSlice`, `MaskSliceMut` 这类图像可以直接逐字节存储,
/// 但面对 `StackSlice`, `StackSliceMut` 这类以浮点强度存储的切片无能为力.
pub trait ImgWriteRaw {
    /// 按原样将图片保存到 `path` 路径.
    fn save_raw<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

/// 使像素更有利于单通道可视化.
#[inline]
pub(crate) fn pretty(label: u8) -> u8 {
    use crate::consts::gray::*;
    if is_brain(label) {
        // 脑组织为白色
        WHITE
    } else {
        // 背景为黑色
        BLACK
    }
}

macro_rules! impl_mask_vis {
    ($($slice: ty),+) => {
        $(
            /// 会将背景/脑组织像素分别映射为黑色/白色.
            impl ImgWriteVis for $slice {
                fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
                    let (height, width) = self.shape();
                    let mut buf = image::GrayImage::new(width as u32, height as u32);
                    for ((h, w), &pix) in self.indexed_iter() {
                        buf.put_pixel(w as u32, h as u32, image::Luma([pretty(pix)]));
                    }
                    buf.save(path)
                }
            }
        )+
    };
}

macro_rules! impl_mask_raw {
    ($($slice: ty),+) => {
        $(
            /// 按原样存储.
            impl ImgWriteRaw for $slice {
                fn save_raw<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
                    let (height, width) = self.shape();
                    let mut buf = image::GrayImage::new(width as u32, height as u32);
                    for ((h, w), &pix) in self.indexed_iter() {
                        buf.put_pixel(w as u32, h as u32, image::Luma([pix]));
                    }
                    buf.save(path)
                }
            }
        )+
    };
}

macro_rules! impl_stack_vis {
    ($($stack: ty),+) => {
        $(
            /// 以切片自身的动态范围开窗. 非有限强度映射为黑色.
            impl ImgWriteVis for $stack {
                fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
                    use crate::consts::gray::BLACK;
                    let (height, width) = self.shape();
                    let mut buf = image::GrayImage::new(width as u32, height as u32);
                    let window = self.min_max().and_then(|(lo, hi)| GrayWindow::from_range(lo, hi));
                    for ((h, w), &v) in self.indexed_iter() {
                        let gray = window.and_then(|win| win.eval(v)).unwrap_or(BLACK);
                        buf.put_pixel(w as u32, h as u32, image::Luma([gray]));
                    }
                    buf.save(path)
                }
            }
        )+
    };
}

impl_mask_vis!(MaskSlice<'_>, MaskSliceMut<'_>);
impl_stack_vis!(StackSlice<'_>, StackSliceMut<'_>);
impl_mask_raw!(MaskSlice<'_>, MaskSliceMut<'_>);
