//! # Upsampling Block
//!
//! A learned stride-2 transposed convolution that doubles the spatial
//! resolution, followed by batch normalization and ReLU.

use burn::{
    nn::{
        conv::{ConvTranspose2d, ConvTranspose2dConfig},
        BatchNorm, BatchNormConfig, Relu,
    },
    prelude::*,
};

use super::utils::{check_channels, validate_channels};
use crate::error::EsNetResult;

/// Configuration for the [`UpsamplingBlock`] module.
#[derive(Config, Debug)]
pub struct UpsamplingBlockConfig {
    /// Number of channels in the input tensor.
    pub input_channels: usize,
    /// Number of channels in the output tensor.
    pub output_channels: usize,
}

impl UpsamplingBlockConfig {
    /// Initializes a new `UpsamplingBlock` module.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if either channel count is zero.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> EsNetResult<UpsamplingBlock<B>> {
        validate_channels("input_channels", self.input_channels)?;
        validate_channels("output_channels", self.output_channels)?;

        // 3x3, stride 2, no padding: output extent is 2n + 1, cropped in forward
        let deconv =
            ConvTranspose2dConfig::new([self.input_channels, self.output_channels], [3, 3])
                .with_stride([2, 2])
                .with_padding([0, 0])
                .with_padding_out([0, 0])
                .with_bias(true)
                .init(device);
        let bn = BatchNormConfig::new(self.output_channels).init(device);

        tracing::debug!(
            input_channels = self.input_channels,
            output_channels = self.output_channels,
            "initialized upsampling block"
        );

        Ok(UpsamplingBlock {
            deconv,
            bn,
            relu: Relu::new(),
            input_channels: self.input_channels,
        })
    }
}

/// Transposed convolution upsampling block.
#[derive(Module, Debug)]
pub struct UpsamplingBlock<B: Backend> {
    deconv: ConvTranspose2d<B>,
    bn: BatchNorm<B, 2>,
    relu: Relu,
    input_channels: usize,
}

impl<B: Backend> UpsamplingBlock<B> {
    /// # Shapes
    /// - input: `[batch, input_channels, height, width]`
    /// - output: `[batch, output_channels, height * 2, width * 2]`
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if the channel count differs from the configured
    /// `input_channels`.
    pub fn forward(&self, x: Tensor<B, 4>) -> EsNetResult<Tensor<B, 4>> {
        check_channels("UpsamplingBlock", &x, self.input_channels)?;

        let x = self.upsample(x);
        let x = self.bn.forward(x);

        Ok(self.relu.forward(x))
    }

    /// Transposed convolution, keeping the leading `2h x 2w` window so the
    /// trailing row and column are dropped.
    fn upsample(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let [batch, _, height, width] = x.dims();
        let x = self.deconv.forward(x);
        let channels = x.dims()[1];

        x.slice([0..batch, 0..channels, 0..height * 2, 0..width * 2])
    }
}
