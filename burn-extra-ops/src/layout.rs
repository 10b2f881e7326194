//! # Memory Layout Conversion
//!
//! Burn convolution and pooling modules expect `[batch, channels, height, width]`
//! (NCHW). Image pipelines and models exported from other frameworks frequently
//! hand over `[batch, height, width, channels]` (NHWC) instead. These helpers make
//! the crossing explicit at the boundary of a network.

use burn::prelude::*;

/// Permutes an NHWC tensor into NCHW.
///
/// # Shapes
/// - input: `[batch, height, width, channels]`
/// - output: `[batch, channels, height, width]`
pub fn nhwc_to_nchw<B: Backend>(x: Tensor<B, 4>) -> Tensor<B, 4> {
    x.permute([0, 3, 1, 2])
}

/// Permutes an NCHW tensor into NHWC.
///
/// # Shapes
/// - input: `[batch, channels, height, width]`
/// - output: `[batch, height, width, channels]`
pub fn nchw_to_nhwc<B: Backend>(x: Tensor<B, 4>) -> Tensor<B, 4> {
    x.permute([0, 2, 3, 1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::{
        backend::{ndarray::NdArrayDevice, NdArray},
        tensor::{Distribution, TensorData},
    };

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_nhwc_to_nchw_shape() {
        let device = NdArrayDevice::default();
        let x = Tensor::<TestBackend, 4>::zeros([2, 8, 6, 3], &device);

        assert_eq!(nhwc_to_nchw(x).dims(), [2, 3, 8, 6]);
    }

    #[test]
    fn test_channel_values_follow_permutation() {
        let device = NdArrayDevice::default();
        // One pixel, three channels: [1, 1, 1, 3] in NHWC.
        let x = Tensor::<TestBackend, 4>::from_data(
            TensorData::new(vec![1.0f32, 2.0, 3.0], [1, 1, 1, 3]),
            &device,
        );

        let nchw = nhwc_to_nchw(x);
        assert_eq!(nchw.dims(), [1, 3, 1, 1]);

        let values = nchw.into_data().to_vec::<f32>().unwrap();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_layout_conversion_is_lossless() {
        let device = NdArrayDevice::default();
        let x = Tensor::<TestBackend, 4>::random(
            [1, 5, 7, 4],
            Distribution::Normal(0.0, 1.0),
            &device,
        );

        let back = nchw_to_nhwc(nhwc_to_nchw(x.clone()));

        assert_eq!(back.dims(), x.dims());
        let diff = (back - x).abs().sum();
        assert_eq!(diff.into_scalar(), 0.0);
    }
}
