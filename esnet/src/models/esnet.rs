//! # ESNet Model Implementation
//!
//! This module assembles the building blocks into the symmetric encoder-decoder
//! network.
//!
//! ## Layout
//!
//! | stage    | blocks                             | channels | scale |
//! |----------|------------------------------------|----------|-------|
//! | encoder1 | downsampling, 3 × FCU (K = 3)      | 16       | 1/2   |
//! | encoder2 | downsampling, 2 × FCU (K = 5)      | 64       | 1/4   |
//! | encoder3 | downsampling, 3 × PFCU             | 128      | 1/8   |
//! | decoder1 | upsampling, 2 × FCU (K = 5)        | 64       | 1/4   |
//! | decoder2 | upsampling, 2 × FCU (K = 3)        | 16       | 1/2   |
//! | head     | 2×2 transposed convolution         | classes  | 1/1   |

use burn::{
    nn::conv::{ConvTranspose2d, ConvTranspose2dConfig},
    prelude::*,
};

use super::modules::{
    DownsamplingBlock, DownsamplingBlockConfig, FactorizedConvUnit, FactorizedConvUnitConfig,
    ParallelFactorizedConvUnit, ParallelFactorizedConvUnitConfig, UpsamplingBlock,
    UpsamplingBlockConfig,
};
use crate::{
    config::{EsNetConfig, DECODER_UNITS, ENCODER_UNITS, OUTPUT_STRIDE, STAGE_CHANNELS},
    error::{EsNetError, EsNetResult},
};

/// Kernel extents of the factorized units at the 1/2 and 1/4 scales.
const FCU_KERNELS: [usize; 2] = [3, 5];

impl EsNetConfig {
    /// Initializes an `EsNet` model with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `device` - The device to create the model on.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> EsNetResult<EsNet<B>> {
        self.validate()?;

        let [c1, c2, c3] = STAGE_CHANNELS;
        let fcu_stack = |channels: usize, kernel_size: usize, count: usize| {
            (0..count)
                .map(|_| {
                    FactorizedConvUnitConfig::new(channels)
                        .with_kernel_size(kernel_size)
                        .with_dropout(self.fcu_dropout)
                        .init(device)
                })
                .collect::<EsNetResult<Vec<_>>>()
        };

        let down1 = DownsamplingBlockConfig::new(self.in_channels, c1).init(device)?;
        let encoder1 = fcu_stack(c1, FCU_KERNELS[0], ENCODER_UNITS[0])?;

        let down2 = DownsamplingBlockConfig::new(c1, c2).init(device)?;
        let encoder2 = fcu_stack(c2, FCU_KERNELS[1], ENCODER_UNITS[1])?;

        let down3 = DownsamplingBlockConfig::new(c2, c3).init(device)?;
        let encoder3 = (0..ENCODER_UNITS[2])
            .map(|_| {
                ParallelFactorizedConvUnitConfig::new(c3)
                    .with_dilations(self.pfcu_dilations)
                    .with_dropout(self.pfcu_dropout)
                    .init(device)
            })
            .collect::<EsNetResult<Vec<_>>>()?;

        let up1 = UpsamplingBlockConfig::new(c3, c2).init(device)?;
        let decoder1 = fcu_stack(c2, FCU_KERNELS[1], DECODER_UNITS[0])?;

        let up2 = UpsamplingBlockConfig::new(c2, c1).init(device)?;
        let decoder2 = fcu_stack(c1, FCU_KERNELS[0], DECODER_UNITS[1])?;

        let head = ConvTranspose2dConfig::new([c1, self.num_classes], [2, 2])
            .with_stride([2, 2])
            .with_bias(true)
            .init(device);

        let model = EsNet {
            down1,
            encoder1,
            down2,
            encoder2,
            down3,
            encoder3,
            up1,
            decoder1,
            up2,
            decoder2,
            head,
        };

        tracing::info!(
            in_channels = self.in_channels,
            num_classes = self.num_classes,
            params = model.num_params(),
            "initialized ESNet"
        );

        Ok(model)
    }
}

/// Intermediate feature maps of a forward pass.
#[derive(Debug, Clone)]
pub struct EsNetOutput<B: Backend> {
    /// Encoder output at 1/2 scale.
    pub encoder1: Tensor<B, 4>,
    /// Encoder output at 1/4 scale.
    pub encoder2: Tensor<B, 4>,
    /// Bottleneck output at 1/8 scale.
    pub encoder3: Tensor<B, 4>,
    /// Decoder output at 1/4 scale.
    pub decoder1: Tensor<B, 4>,
    /// Decoder output at 1/2 scale.
    pub decoder2: Tensor<B, 4>,
    /// Per-pixel class logits at input resolution.
    pub logits: Tensor<B, 4>,
}

/// ESNet: efficient symmetric network for real-time semantic segmentation.
#[derive(Module, Debug)]
pub struct EsNet<B: Backend> {
    down1: DownsamplingBlock<B>,
    encoder1: Vec<FactorizedConvUnit<B>>,
    down2: DownsamplingBlock<B>,
    encoder2: Vec<FactorizedConvUnit<B>>,
    down3: DownsamplingBlock<B>,
    encoder3: Vec<ParallelFactorizedConvUnit<B>>,
    up1: UpsamplingBlock<B>,
    decoder1: Vec<FactorizedConvUnit<B>>,
    up2: UpsamplingBlock<B>,
    decoder2: Vec<FactorizedConvUnit<B>>,
    head: ConvTranspose2d<B>,
}

impl<B: Backend> EsNet<B> {
    /// Computes class logits.
    ///
    /// # Shapes
    /// - input: `[batch, in_channels, height, width]`
    /// - output: `[batch, num_classes, height, width]`
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if the input channel count is wrong or the spatial
    /// extents are not multiples of the output stride.
    pub fn forward(&self, x: Tensor<B, 4>) -> EsNetResult<Tensor<B, 4>> {
        Ok(self.forward_features(x)?.logits)
    }

    /// Runs the network and keeps every stage output.
    ///
    /// # Errors
    ///
    /// See [`EsNet::forward`].
    pub fn forward_features(&self, x: Tensor<B, 4>) -> EsNetResult<EsNetOutput<B>> {
        let [batch, channels, height, width] = x.dims();
        if height % OUTPUT_STRIDE != 0 || width % OUTPUT_STRIDE != 0 {
            return Err(EsNetError::ShapeMismatch {
                block: "EsNet",
                expected: format!("height and width divisible by {OUTPUT_STRIDE}"),
                actual: format!("{:?}", [batch, channels, height, width]),
            });
        }

        let x = self.down1.forward(x)?;
        let encoder1 = fcu_chain(&self.encoder1, x)?;

        let x = self.down2.forward(encoder1.clone())?;
        let encoder2 = fcu_chain(&self.encoder2, x)?;

        let x = self.down3.forward(encoder2.clone())?;
        let encoder3 = self
            .encoder3
            .iter()
            .try_fold(x, |x, unit| unit.forward(x))?;

        let x = self.up1.forward(encoder3.clone())?;
        let decoder1 = fcu_chain(&self.decoder1, x)?;

        let x = self.up2.forward(decoder1.clone())?;
        let decoder2 = fcu_chain(&self.decoder2, x)?;

        let logits = self.head.forward(decoder2.clone());

        Ok(EsNetOutput {
            encoder1,
            encoder2,
            encoder3,
            decoder1,
            decoder2,
            logits,
        })
    }
}

fn fcu_chain<B: Backend>(
    units: &[FactorizedConvUnit<B>],
    x: Tensor<B, 4>,
) -> EsNetResult<Tensor<B, 4>> {
    units.iter().try_fold(x, |x, unit| unit.forward(x))
}
