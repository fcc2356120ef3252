//! MR stack/mask 切片对象的操作.

mod core;
mod save;

pub use core::{
    CompactMaskSlice, MaskSlice, MaskSliceMut, OwnedMaskSlice, OwnedStackSlice, StackSlice,
    StackSliceMut,
};

pub use save::{ImgWriteRaw, ImgWriteVis};
