//! # Parallel Factorized Convolution Unit (PFCU)
//!
//! A shared factorized stem feeds three dilated factorized branches in parallel.
//! The branch outputs are summed with the unit input, regularized with dropout
//! and rectified. Multiple dilation rates aggregate context at several scales
//! without reducing resolution.

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        BatchNorm, BatchNormConfig, Dropout, DropoutConfig, PaddingConfig2d, Relu,
    },
    prelude::*,
};

use super::{
    utils::{check_channels, validate_channels, validate_dropout},
    FactorizedConv, FactorizedConvConfig,
};
use crate::error::{EsNetError, EsNetResult};

/// Configuration for the [`ParallelFactorizedConvUnit`] module.
#[derive(Config, Debug)]
pub struct ParallelFactorizedConvUnitConfig {
    /// Number of input and output channels.
    pub channels: usize,
    /// Dilation rates of the three parallel branches.
    #[config(default = "[2, 5, 9]")]
    pub dilations: [usize; 3],
    /// Dropout probability applied after the four-way sum.
    #[config(default = "0.3")]
    pub dropout: f64,
}

impl ParallelFactorizedConvUnitConfig {
    /// Initializes a new `ParallelFactorizedConvUnit` module.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for zero channels, a zero dilation rate or a
    /// dropout probability outside `[0, 1)`.
    pub fn init<B: Backend>(
        &self,
        device: &Device<B>,
    ) -> EsNetResult<ParallelFactorizedConvUnit<B>> {
        validate_channels("channels", self.channels)?;
        validate_dropout(self.dropout)?;
        if self.dilations.contains(&0) {
            return Err(EsNetError::invalid_config(format!(
                "dilation rates must be at least 1, got {:?}",
                self.dilations
            )));
        }

        let channels = [self.channels, self.channels];
        let stem_v = Conv2dConfig::new(channels, [3, 1])
            .with_padding(PaddingConfig2d::Explicit(1, 0))
            .with_bias(true)
            .init(device);
        let stem_h = Conv2dConfig::new(channels, [1, 3])
            .with_padding(PaddingConfig2d::Explicit(0, 1))
            .with_bias(true)
            .init(device);
        let stem_bn = BatchNormConfig::new(self.channels).init(device);

        let branches = self
            .dilations
            .iter()
            .map(|&dilation| {
                FactorizedConvConfig::new(self.channels)
                    .with_kernel_size(3)
                    .with_dilation(dilation)
                    .init(device)
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            channels = self.channels,
            dilations = ?self.dilations,
            dropout = self.dropout,
            "initialized parallel factorized convolution unit"
        );

        Ok(ParallelFactorizedConvUnit {
            stem_v,
            stem_h,
            stem_bn,
            branches,
            dropout: DropoutConfig::new(self.dropout).init(),
            relu: Relu::new(),
            channels: self.channels,
        })
    }
}

/// Parallel Factorized Convolution Unit.
#[derive(Module, Debug)]
pub struct ParallelFactorizedConvUnit<B: Backend> {
    stem_v: Conv2d<B>,
    stem_h: Conv2d<B>,
    stem_bn: BatchNorm<B, 2>,
    branches: Vec<FactorizedConv<B>>,
    dropout: Dropout,
    relu: Relu,
    channels: usize,
}

impl<B: Backend> ParallelFactorizedConvUnit<B> {
    /// # Shapes
    /// - input: `[batch, channels, height, width]`
    /// - output: `[batch, channels, height, width]`
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if the channel count differs from the configured
    /// `channels`, since the four-way sum would add unequal shapes.
    pub fn forward(&self, input: Tensor<B, 4>) -> EsNetResult<Tensor<B, 4>> {
        check_channels("ParallelFactorizedConvUnit", &input, self.channels)?;

        // The 3x1 stem reads the unit input and its result is dropped: the 1x3
        // stem also reads the unit input, not the 3x1 output.
        let _ = self.relu.forward(self.stem_v.forward(input.clone()));
        let x = self.stem_h.forward(input.clone());
        let x = self.stem_bn.forward(x);
        let x = self.relu.forward(x);

        let sum = self
            .branches
            .iter()
            .fold(input, |acc, branch| acc + branch.forward(x.clone()));

        Ok(self.regularize(sum))
    }

    /// Dropout followed by the closing ReLU.
    fn regularize(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.dropout.forward(x);
        self.relu.forward(x)
    }
}
