use burn::prelude::*;

use crate::error::{EsNetError, EsNetResult};

/// Fails with `InvalidConfiguration` when a channel count is zero.
pub(crate) fn validate_channels(name: &str, channels: usize) -> EsNetResult<()> {
    if channels == 0 {
        return Err(EsNetError::invalid_config(format!(
            "{name} must be greater than 0"
        )));
    }
    Ok(())
}

/// Fails with `InvalidConfiguration` unless `0 <= prob < 1`.
pub(crate) fn validate_dropout(prob: f64) -> EsNetResult<()> {
    if !(0.0..1.0).contains(&prob) {
        return Err(EsNetError::invalid_config(format!(
            "dropout probability must be in [0, 1), got {prob}"
        )));
    }
    Ok(())
}

/// Checks that an NCHW tensor carries `expected` channels.
pub(crate) fn check_channels<B: Backend>(
    block: &'static str,
    x: &Tensor<B, 4>,
    expected: usize,
) -> EsNetResult<()> {
    let dims = x.dims();
    if dims[1] != expected {
        return Err(EsNetError::ShapeMismatch {
            block,
            expected: format!("[_, {expected}, _, _]"),
            actual: format!("{dims:?}"),
        });
    }
    Ok(())
}
