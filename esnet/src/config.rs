//! Configuration for the full ESNet encoder-decoder.
//!
//! Block-level configs live next to their modules; this struct gathers the
//! network-wide hyperparameters and checks that they fit together before any
//! parameter is allocated.

use burn::prelude::*;

use crate::error::{EsNetError, EsNetResult};

/// Channel width of the three encoder stages (1/2, 1/4 and 1/8 scale).
pub const STAGE_CHANNELS: [usize; 3] = [16, 64, 128];

/// Number of factorized units after each downsampling block.
pub const ENCODER_UNITS: [usize; 3] = [3, 2, 3];

/// Number of factorized units after each upsampling block.
pub const DECODER_UNITS: [usize; 2] = [2, 2];

/// Total downsampling factor of the encoder.
pub const OUTPUT_STRIDE: usize = 8;

/// Main configuration for the ESNet model.
#[derive(Config, Debug)]
pub struct EsNetConfig {
    /// Number of channels of the input image.
    #[config(default = "3")]
    pub in_channels: usize,
    /// Number of segmentation classes (Cityscapes has 19).
    #[config(default = "19")]
    pub num_classes: usize,
    /// Dropout probability of every factorized convolution unit.
    #[config(default = "0.03")]
    pub fcu_dropout: f64,
    /// Dropout probability of every parallel factorized convolution unit.
    #[config(default = "0.3")]
    pub pfcu_dropout: f64,
    /// Dilation rates of the parallel branches in the bottleneck.
    #[config(default = "[2, 5, 9]")]
    pub pfcu_dilations: [usize; 3],
}

impl EsNetConfig {
    /// Validate the configuration and return appropriate errors for invalid settings.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if:
    /// - `in_channels` is zero or not narrower than the first stage, which the
    ///   first downsampling block needs to learn the remaining channels
    /// - `num_classes` is zero
    /// - a dropout probability lies outside `[0, 1)`
    /// - a dilation rate is zero
    pub fn validate(&self) -> EsNetResult<()> {
        if self.in_channels == 0 {
            return Err(EsNetError::invalid_config("in_channels must be greater than 0"));
        }
        if self.in_channels >= STAGE_CHANNELS[0] {
            return Err(EsNetError::invalid_config(format!(
                "in_channels must be less than {}, got {}",
                STAGE_CHANNELS[0], self.in_channels
            )));
        }
        if self.num_classes == 0 {
            return Err(EsNetError::invalid_config("num_classes must be greater than 0"));
        }
        for (name, prob) in [
            ("fcu_dropout", self.fcu_dropout),
            ("pfcu_dropout", self.pfcu_dropout),
        ] {
            if !(0.0..1.0).contains(&prob) {
                return Err(EsNetError::invalid_config(format!(
                    "{name} must be in [0, 1), got {prob}"
                )));
            }
        }
        if self.pfcu_dilations.contains(&0) {
            return Err(EsNetError::invalid_config(format!(
                "pfcu_dilations must be at least 1, got {:?}",
                self.pfcu_dilations
            )));
        }

        Ok(())
    }
}
