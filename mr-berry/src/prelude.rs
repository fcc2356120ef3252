//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx3d};

pub use crate::data::slice::{
    ImgWriteRaw, ImgWriteVis, MaskSlice, MaskSliceMut, OwnedMaskSlice, OwnedStackSlice,
    StackSlice, StackSliceMut,
};
pub use crate::data::window::GrayWindow;
pub use crate::data::{BrainMask, MriStack, NiftiVolumeAttr, OpenPairError, StackPair};

pub use crate::consts::gray::{MASK_BACKGROUND, MASK_BRAIN};
pub use crate::consts::{DEFAULT_BINS, DEFAULT_CROP_MARGIN_MM};

pub use crate::preproc::cache::{self, load_pair, save_pair};

pub use crate::metrics::batch::{pair_iqm, stack_report, PairIqm, StackReport};
pub use crate::metrics::{
    joint_entropy, mae, mutual_information, ncc, nmae, normalized_mutual_information, nrmse,
    psnr, rmse, shannon_entropy, ssim, MetricError, MetricResult,
};

#[cfg(feature = "rayon")]
pub use crate::metrics::batch::par_stack_report;
