//! # Downsampling Block
//!
//! Halves the spatial resolution while widening the feature map. A strided 3×3
//! convolution learns the new channels and a 2×2 max-pool carries the input
//! channels through unchanged; the two are concatenated, normalized and
//! rectified.

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
        BatchNorm, BatchNormConfig, PaddingConfig2d, Relu,
    },
    prelude::*,
};

use burn_extra_ops::{conv_output_size, strided_same_padding};

use super::utils::{check_channels, validate_channels};
use crate::error::{EsNetError, EsNetResult};

const KERNEL: usize = 3;
const POOL: usize = 2;
const STRIDE: usize = 2;

/// Configuration for the [`DownsamplingBlock`] module.
#[derive(Config, Debug)]
pub struct DownsamplingBlockConfig {
    /// Number of channels in the input tensor.
    pub input_channels: usize,
    /// Number of channels in the output tensor. Must exceed `input_channels`.
    pub output_channels: usize,
}

impl DownsamplingBlockConfig {
    /// Initializes a new `DownsamplingBlock` module.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` unless `0 < input_channels < output_channels`.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> EsNetResult<DownsamplingBlock<B>> {
        validate_channels("input_channels", self.input_channels)?;
        validate_channels("output_channels", self.output_channels)?;
        if self.output_channels <= self.input_channels {
            return Err(EsNetError::invalid_config(format!(
                "output_channels ({}) must be greater than input_channels ({})",
                self.output_channels, self.input_channels
            )));
        }

        // "Same" padding is applied in forward, since it is asymmetric
        let conv = Conv2dConfig::new(
            [self.input_channels, self.output_channels - self.input_channels],
            [KERNEL, KERNEL],
        )
        .with_stride([STRIDE, STRIDE])
        .with_padding(PaddingConfig2d::Valid)
        .with_bias(true)
        .init(device);

        let pool = MaxPool2dConfig::new([POOL, POOL])
            .with_strides([STRIDE, STRIDE])
            .init();
        let bn = BatchNormConfig::new(self.output_channels).init(device);

        tracing::debug!(
            input_channels = self.input_channels,
            output_channels = self.output_channels,
            "initialized downsampling block"
        );

        Ok(DownsamplingBlock {
            conv,
            pool,
            bn,
            relu: Relu::new(),
            input_channels: self.input_channels,
        })
    }
}

/// Strided convolution and max-pool in parallel, concatenated on channels.
#[derive(Module, Debug)]
pub struct DownsamplingBlock<B: Backend> {
    conv: Conv2d<B>,
    pool: MaxPool2d,
    bn: BatchNorm<B, 2>,
    relu: Relu,
    input_channels: usize,
}

impl<B: Backend> DownsamplingBlock<B> {
    const NAME: &'static str = "DownsamplingBlock";

    /// # Shapes
    /// - input: `[batch, input_channels, height, width]`
    /// - output: `[batch, output_channels, height / 2, width / 2]`
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if the channel count differs from the configured
    /// `input_channels`, or if the two branches disagree on the output extent.
    /// The convolution branch rounds up and the pooling branch rounds down, so
    /// height and width must be even.
    pub fn forward(&self, x: Tensor<B, 4>) -> EsNetResult<Tensor<B, 4>> {
        check_channels(Self::NAME, &x, self.input_channels)?;
        let dims = x.dims();
        let mismatch = || EsNetError::ShapeMismatch {
            block: Self::NAME,
            expected: "even height and width".to_string(),
            actual: format!("{dims:?}"),
        };

        let [_, _, height, width] = dims;
        let (Some((top, bottom)), Some((left, right))) = (
            strided_same_padding(height, KERNEL, STRIDE),
            strided_same_padding(width, KERNEL, STRIDE),
        ) else {
            return Err(mismatch());
        };
        let learned_size = [height + top + bottom, width + left + right]
            .map(|n| conv_output_size(n, KERNEL, STRIDE, 0, 1));
        let pooled_size = [height, width].map(|n| conv_output_size(n, POOL, STRIDE, 0, 1));
        if learned_size.contains(&None) || learned_size != pooled_size {
            return Err(mismatch());
        }

        let learned = self.learned(x.clone().pad((left, right, top, bottom), 0.0));
        let pooled = self.pool.forward(x);
        let x = Tensor::cat(vec![learned, pooled], 1);
        let x = self.bn.forward(x);

        Ok(self.relu.forward(x))
    }

    /// Strided convolution over an input that is already padded.
    fn learned(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.conv.forward(x)
    }
}
