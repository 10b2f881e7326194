//! # Factorized Convolution
//!
//! A K×K convolution approximated by a K×1 convolution followed by a 1×K
//! convolution. The pair costs `2K` weights per channel pair instead of `K²`.
//! Both convolutions share the dilation rate and keep the spatial extent.

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        BatchNorm, BatchNormConfig, Relu,
    },
    prelude::*,
};
use burn_extra_ops::same_padding_2d;

use super::utils::validate_channels;
use crate::error::{EsNetError, EsNetResult};

/// Configuration for the [`FactorizedConv`] module.
#[derive(Config, Debug)]
pub struct FactorizedConvConfig {
    /// Number of input and output channels.
    pub channels: usize,
    /// Kernel extent `K`. Must be odd.
    #[config(default = "3")]
    pub kernel_size: usize,
    /// Dilation rate applied to both convolutions.
    #[config(default = "1")]
    pub dilation: usize,
}

impl FactorizedConvConfig {
    /// Initializes a new `FactorizedConv` module.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for zero channels, an even kernel extent
    /// or a zero dilation.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> EsNetResult<FactorizedConv<B>> {
        validate_channels("channels", self.channels)?;
        if self.dilation == 0 {
            return Err(EsNetError::invalid_config("dilation must be at least 1"));
        }

        let k = self.kernel_size;
        let d = self.dilation;
        let odd_kernel = || {
            EsNetError::invalid_config(format!("kernel size must be odd and >= 1, got {k}"))
        };
        let padding_v = same_padding_2d([k, 1], [d, d]).ok_or_else(odd_kernel)?;
        let padding_h = same_padding_2d([1, k], [d, d]).ok_or_else(odd_kernel)?;

        let conv_v = Conv2dConfig::new([self.channels, self.channels], [k, 1])
            .with_dilation([d, d])
            .with_padding(padding_v)
            .with_bias(true)
            .init(device);
        let conv_h = Conv2dConfig::new([self.channels, self.channels], [1, k])
            .with_dilation([d, d])
            .with_padding(padding_h)
            .with_bias(true)
            .init(device);
        let bn = BatchNormConfig::new(self.channels).init(device);

        Ok(FactorizedConv {
            conv_v,
            relu: Relu::new(),
            conv_h,
            bn,
        })
    }
}

/// K×1 conv → ReLU → 1×K conv → BatchNorm.
///
/// No activation follows the normalization; callers decide whether the pair
/// ends in a ReLU or feeds a residual sum.
#[derive(Module, Debug)]
pub struct FactorizedConv<B: Backend> {
    pub(super) conv_v: Conv2d<B>,
    relu: Relu,
    pub(super) conv_h: Conv2d<B>,
    bn: BatchNorm<B, 2>,
}

impl<B: Backend> FactorizedConv<B> {
    /// # Shapes
    /// - input: `[batch, channels, height, width]`
    /// - output: `[batch, channels, height, width]`
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.conv_v.forward(x);
        let x = self.relu.forward(x);
        let x = self.conv_h.forward(x);
        self.bn.forward(x)
    }
}

#[cfg(test)]
impl<B: Backend> FactorizedConv<B> {
    /// Zeroes the normalization scale and shift, so `forward` returns zeros.
    pub(crate) fn silence(mut self) -> Self {
        let device = self.bn.gamma.device();
        let [channels] = self.bn.gamma.dims();
        let zeros = || burn::module::Param::from_tensor(Tensor::zeros([channels], &device));
        self.bn.gamma = zeros();
        self.bn.beta = zeros();
        self
    }
}
