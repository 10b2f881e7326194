//! Additional operations for the Burn deep learning framework
//!
//! This crate provides small tensor and layer utilities that are commonly used in
//! convolutional segmentation networks but are not available in the core Burn
//! framework.

use burn::prelude::*;

mod layout;
mod padding;

// Convenient re-exports
pub use layout::{nchw_to_nhwc, nhwc_to_nchw};
pub use padding::{conv_output_size, same_padding, same_padding_2d, strided_same_padding};

/// Additional operations for Burn tensors
pub trait TensorExtraOps<B: Backend> {
    /// Reinterpret an NHWC tensor as NCHW.
    fn to_nchw(self) -> Self;

    /// Reinterpret an NCHW tensor as NHWC.
    fn to_nhwc(self) -> Self;
}

impl<B: Backend> TensorExtraOps<B> for Tensor<B, 4> {
    fn to_nchw(self) -> Self {
        nhwc_to_nchw(self)
    }

    fn to_nhwc(self) -> Self {
        nchw_to_nhwc(self)
    }
}
