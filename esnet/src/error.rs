use thiserror::Error;

/// The error type for `ESNet-Burn` operations.
///
/// Both variants are raised before any kernel runs: configuration problems when a
/// block is initialized, shape problems when a tensor is handed to `forward`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EsNetError {
    /// Error for when an invalid block or model configuration is provided.
    /// This can happen if configuration parameters are logically inconsistent.
    #[error("Invalid model configuration: {reason}")]
    InvalidConfiguration {
        /// The reason why the configuration is invalid.
        reason: String,
    },

    /// Error for when an input tensor cannot flow through a block, because the
    /// residual add or the channel concatenation would combine unequal shapes.
    #[error("Shape mismatch in {block}: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// The block that rejected the tensor.
        block: &'static str,
        /// The expected tensor shape.
        expected: String,
        /// The actual tensor shape.
        actual: String,
    },
}

impl EsNetError {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}

/// A specialized `Result` type for `ESNet-Burn` operations.
pub type EsNetResult<T> = Result<T, EsNetError>;
