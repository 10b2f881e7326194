//! # "Same" Padding
//!
//! `PaddingConfig2d::Same` in Burn assumes unit stride and no dilation. The
//! factorized and dilated convolutions used by efficient segmentation networks
//! need the general form, so the padding is computed explicitly here and passed
//! in as `PaddingConfig2d::Explicit`, or applied with `Tensor::pad` when it is
//! asymmetric.

use burn::nn::PaddingConfig2d;

/// Padding that keeps a stride-1 convolution axis at its input extent.
///
/// Returns `None` for even kernels, which cannot be padded symmetrically.
pub const fn same_padding(kernel_size: usize, dilation: usize) -> Option<usize> {
    if kernel_size == 0 || kernel_size % 2 == 0 {
        return None;
    }
    Some(dilation * (kernel_size - 1) / 2)
}

/// Builds a [`PaddingConfig2d`] for a `[kernel_h, kernel_w]` kernel at the given
/// `[dilation_h, dilation_w]`.
///
/// Returns `None` if either kernel extent is even.
pub fn same_padding_2d(kernel_size: [usize; 2], dilation: [usize; 2]) -> Option<PaddingConfig2d> {
    let pad_h = same_padding(kernel_size[0], dilation[0])?;
    let pad_w = same_padding(kernel_size[1], dilation[1])?;
    Some(PaddingConfig2d::Explicit(pad_h, pad_w))
}

/// `(before, after)` padding of a strided "same" convolution axis.
///
/// The output extent is `ceil(size_in / stride)`. When the total padding is odd
/// the extra element goes after the data, so the first window starts at the
/// first input element.
///
/// Returns `None` for a zero kernel or stride.
pub fn strided_same_padding(
    size_in: usize,
    kernel_size: usize,
    stride: usize,
) -> Option<(usize, usize)> {
    if kernel_size == 0 || stride == 0 {
        return None;
    }
    let size_out = size_in.div_ceil(stride);
    let total = ((size_out.max(1) - 1) * stride + kernel_size).saturating_sub(size_in);
    Some((total / 2, total - total / 2))
}

/// Output extent of a convolution or pooling axis.
///
/// Mirrors the formula Burn uses internally, so callers can validate shapes
/// before running a kernel. Returns `None` when the padded input is smaller
/// than the dilated kernel, or for a zero kernel or stride.
pub fn conv_output_size(
    size_in: usize,
    kernel_size: usize,
    stride: usize,
    padding: usize,
    dilation: usize,
) -> Option<usize> {
    if kernel_size == 0 || stride == 0 {
        return None;
    }
    let effective = dilation.checked_mul(kernel_size - 1)? + 1;
    let padded = size_in + 2 * padding;
    Some(padded.checked_sub(effective)? / stride + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_padding_odd_kernels() {
        assert_eq!(same_padding(1, 1), Some(0));
        assert_eq!(same_padding(3, 1), Some(1));
        assert_eq!(same_padding(5, 1), Some(2));
        assert_eq!(same_padding(3, 2), Some(2));
        assert_eq!(same_padding(3, 9), Some(9));
    }

    #[test]
    fn test_same_padding_rejects_even_kernels() {
        assert_eq!(same_padding(0, 1), None);
        assert_eq!(same_padding(2, 1), None);
        assert!(same_padding_2d([3, 4], [1, 1]).is_none());
    }

    #[test]
    fn test_same_padding_keeps_extent() {
        for kernel in [1, 3, 5, 7] {
            for dilation in [1, 2, 5, 9] {
                let pad = same_padding(kernel, dilation).unwrap();
                assert_eq!(conv_output_size(32, kernel, 1, pad, dilation), Some(32));
            }
        }
    }

    #[test]
    fn test_same_padding_2d_factorized() {
        assert_eq!(
            same_padding_2d([3, 1], [5, 5]),
            Some(PaddingConfig2d::Explicit(5, 0))
        );
        assert_eq!(
            same_padding_2d([1, 3], [5, 5]),
            Some(PaddingConfig2d::Explicit(0, 5))
        );
    }

    #[test]
    fn test_strided_same_padding_puts_extra_after() {
        // 3x3, stride 2 on an even extent needs one element, placed after.
        assert_eq!(strided_same_padding(64, 3, 2), Some((0, 1)));
        assert_eq!(strided_same_padding(2, 3, 2), Some((0, 1)));
        // Odd extents need two, split evenly.
        assert_eq!(strided_same_padding(65, 3, 2), Some((1, 1)));
        assert_eq!(strided_same_padding(1, 3, 2), Some((1, 1)));
        assert_eq!(strided_same_padding(8, 3, 0), None);
    }

    #[test]
    fn test_strided_same_padding_gives_ceil_extent() {
        for size in 1..40 {
            let (before, after) = strided_same_padding(size, 3, 2).unwrap();
            assert_eq!(
                conv_output_size(size + before + after, 3, 2, 0, 1),
                Some(size.div_ceil(2)),
                "size {size}"
            );
        }
    }

    #[test]
    fn test_pooling_extent_rounds_down() {
        // 2x2 pooling window, stride 2, no padding gives floor(n / 2).
        assert_eq!(conv_output_size(64, 2, 2, 0, 1), Some(32));
        assert_eq!(conv_output_size(65, 2, 2, 0, 1), Some(32));
    }

    #[test]
    fn test_conv_output_size_input_smaller_than_kernel() {
        assert_eq!(conv_output_size(1, 3, 1, 0, 1), None);
        assert_eq!(conv_output_size(1, 2, 2, 0, 1), None);
        assert_eq!(conv_output_size(4, 3, 1, 0, 2), None);
        assert_eq!(conv_output_size(1, 3, 1, 1, 1), Some(1));
    }

    #[test]
    fn test_conv_output_size_degenerate_kernel() {
        assert_eq!(conv_output_size(8, 0, 1, 0, 1), None);
        assert_eq!(conv_output_size(8, 3, 0, 0, 1), None);
    }
}
