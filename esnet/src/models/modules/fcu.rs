//! # Factorized Convolution Unit (FCU)
//!
//! Two factorized K×K passes wrapped in an identity skip connection, followed by
//! dropout and a final ReLU. Spatial extent and channel count are preserved.

use burn::{
    nn::{Dropout, DropoutConfig, Relu},
    prelude::*,
};

use super::{
    utils::{check_channels, validate_dropout},
    FactorizedConv, FactorizedConvConfig,
};
use crate::error::EsNetResult;

/// Configuration for the [`FactorizedConvUnit`] module.
#[derive(Config, Debug)]
pub struct FactorizedConvUnitConfig {
    /// Number of input and output channels.
    pub channels: usize,
    /// Kernel extent `K` of the factorized K×1 / 1×K convolutions. Must be odd.
    #[config(default = "3")]
    pub kernel_size: usize,
    /// Dropout probability applied after the residual add.
    #[config(default = "0.03")]
    pub dropout: f64,
}

impl FactorizedConvUnitConfig {
    /// Initializes a new `FactorizedConvUnit` module.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for zero channels, an even kernel extent or
    /// a dropout probability outside `[0, 1)`.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> EsNetResult<FactorizedConvUnit<B>> {
        validate_dropout(self.dropout)?;

        let pass = FactorizedConvConfig::new(self.channels).with_kernel_size(self.kernel_size);
        let pass1 = pass.init(device)?;
        let pass2 = pass.init(device)?;

        tracing::debug!(
            channels = self.channels,
            kernel_size = self.kernel_size,
            dropout = self.dropout,
            "initialized factorized convolution unit"
        );

        Ok(FactorizedConvUnit {
            pass1,
            pass2,
            dropout: DropoutConfig::new(self.dropout).init(),
            relu: Relu::new(),
            channels: self.channels,
        })
    }
}

/// Factorized Convolution Unit.
#[derive(Module, Debug)]
pub struct FactorizedConvUnit<B: Backend> {
    pass1: FactorizedConv<B>,
    pass2: FactorizedConv<B>,
    dropout: Dropout,
    relu: Relu,
    channels: usize,
}

impl<B: Backend> FactorizedConvUnit<B> {
    /// # Shapes
    /// - input: `[batch, channels, height, width]`
    /// - output: `[batch, channels, height, width]`
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if the channel count differs from the configured
    /// `channels`, since the identity skip would add unequal shapes.
    pub fn forward(&self, input: Tensor<B, 4>) -> EsNetResult<Tensor<B, 4>> {
        check_channels("FactorizedConvUnit", &input, self.channels)?;

        let x = self.pass1.forward(input.clone());
        let x = self.relu.forward(x);
        let x = self.pass2.forward(x);

        Ok(self.regularize(input + x))
    }

    /// Dropout followed by the closing ReLU.
    ///
    /// Dropout only fires on autodiff backends; on inference backends this is a
    /// plain ReLU.
    fn regularize(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.dropout.forward(x);
        self.relu.forward(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EsNetError;
    use burn::{
        backend::{Autodiff, NdArray},
        tensor::Distribution,
    };
    use burn_extra_ops::TensorExtraOps;

    type TestBackend = NdArray<f32>;
    type TrainBackend = Autodiff<NdArray<f32>>;

    #[test]
    fn test_fcu_nhwc_scenario() {
        let device = Default::default();
        let unit = FactorizedConvUnitConfig::new(32)
            .init::<TestBackend>(&device)
            .unwrap();
        let input = Tensor::<TestBackend, 4>::random(
            [1, 32, 32, 32],
            Distribution::Normal(0.0, 1.0),
            &device,
        );

        let output = unit.forward(input.clone().to_nchw()).unwrap().to_nhwc();

        assert_eq!(output.dims(), [1, 32, 32, 32]);
        let diff = (output - input).abs().sum().into_scalar();
        assert!(diff > 0.0, "FCU should not act as the identity");
    }

    #[test]
    fn test_fcu_preserves_shape_for_odd_kernels() {
        let device = Default::default();
        for kernel_size in [1, 3, 5, 7] {
            let unit = FactorizedConvUnitConfig::new(8)
                .with_kernel_size(kernel_size)
                .init::<TestBackend>(&device)
                .unwrap();
            let input = Tensor::<TestBackend, 4>::random(
                [2, 8, 10, 14],
                Distribution::Normal(0.0, 1.0),
                &device,
            );

            assert_eq!(
                unit.forward(input).unwrap().dims(),
                [2, 8, 10, 14],
                "kernel {kernel_size}"
            );
        }
    }

    #[test]
    fn test_fcu_default_hyperparameters() {
        let config = FactorizedConvUnitConfig::new(16);
        assert_eq!(config.kernel_size, 3);
        assert_eq!(config.dropout, 0.03);
    }

    #[test]
    fn test_fcu_is_deterministic_at_inference() {
        let device = Default::default();
        let unit = FactorizedConvUnitConfig::new(8)
            .with_dropout(0.5)
            .init::<TestBackend>(&device)
            .unwrap();
        let input = Tensor::<TestBackend, 4>::random(
            [1, 8, 8, 8],
            Distribution::Normal(0.0, 1.0),
            &device,
        );

        let a = unit.forward(input.clone()).unwrap();
        let b = unit.forward(input).unwrap();

        assert_eq!(
            (a - b).abs().sum().into_scalar(),
            0.0,
            "dropout must be disabled on an inference backend"
        );
    }

    #[test]
    fn test_fcu_dropout_inactive_at_inference() {
        let device = Default::default();
        let unit = FactorizedConvUnitConfig::new(4)
            .with_dropout(0.5)
            .init::<TestBackend>(&device)
            .unwrap();
        let x = Tensor::<TestBackend, 4>::ones([1, 4, 32, 32], &device);

        let output = unit.regularize(x.clone());

        assert_eq!((output - x).abs().sum().into_scalar(), 0.0);
    }

    #[test]
    fn test_fcu_dropout_rate_in_training() {
        let device = Default::default();
        let unit = FactorizedConvUnitConfig::new(4)
            .init::<TrainBackend>(&device)
            .unwrap();
        let x = Tensor::<TrainBackend, 4>::ones([4, 4, 64, 64], &device);

        let output = unit.regularize(x);
        let total = output.dims().iter().product::<usize>() as f64;
        let zeros = output.equal_elem(0.0).int().sum().into_scalar() as f64;
        let rate = zeros / total;

        assert!(
            (rate - 0.03).abs() < 0.01,
            "Actual drop rate {rate} deviates significantly from expected 0.03"
        );
    }

    #[test]
    fn test_fcu_rejects_channel_mismatch() {
        let device = Default::default();
        let unit = FactorizedConvUnitConfig::new(32)
            .init::<TestBackend>(&device)
            .unwrap();
        let input = Tensor::<TestBackend, 4>::zeros([1, 16, 8, 8], &device);

        match unit.forward(input) {
            Err(EsNetError::ShapeMismatch { block, .. }) => {
                assert_eq!(block, "FactorizedConvUnit");
            }
            _ => panic!("Expected ShapeMismatch error"),
        }
    }

    #[test]
    fn test_fcu_rejects_invalid_config() {
        let device = Default::default();
        let even_kernel = FactorizedConvUnitConfig::new(8)
            .with_kernel_size(2)
            .init::<TestBackend>(&device);
        let bad_dropout = FactorizedConvUnitConfig::new(8)
            .with_dropout(1.5)
            .init::<TestBackend>(&device);

        assert!(matches!(
            even_kernel,
            Err(EsNetError::InvalidConfiguration { .. })
        ));
        assert!(matches!(
            bad_dropout,
            Err(EsNetError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_fcu_adds_identity_skip() {
        let device = Default::default();
        let mut unit = FactorizedConvUnitConfig::new(8)
            .init::<TestBackend>(&device)
            .unwrap();
        unit.pass2 = unit.pass2.clone().silence();
        let input = Tensor::<TestBackend, 4>::random(
            [2, 8, 10, 10],
            Distribution::Normal(0.0, 1.0),
            &device,
        );

        // With the residual path zeroed, only the skip connection remains.
        let output = unit.forward(input.clone()).unwrap();
        let expected = Relu::new().forward(input);

        assert_eq!((output - expected).abs().sum().into_scalar(), 0.0);
    }
}
