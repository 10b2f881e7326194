//! Building blocks of ESNet, an efficient symmetric network for real-time
//! semantic segmentation, implemented with Burn.
//!
//! Every block is a Burn [`Module`](burn::module::Module) created from a
//! [`Config`](burn::config::Config). All tensors use the NCHW layout; see
//! [`burn_extra_ops::TensorExtraOps`] for converting NHWC inputs.
//!
//! ```ignore
//! use burn::{backend::NdArray, prelude::*};
//! use esnet_burn::{DownsamplingBlockConfig, FactorizedConvUnitConfig};
//!
//! let device = Default::default();
//! let down = DownsamplingBlockConfig::new(16, 32).init::<NdArray>(&device)?;
//! let fcu = FactorizedConvUnitConfig::new(32).init::<NdArray>(&device)?;
//!
//! let x = Tensor::<NdArray, 4>::zeros([1, 16, 64, 64], &device);
//! let y = fcu.forward(down.forward(x)?)?;
//! assert_eq!(y.dims(), [1, 32, 32, 32]);
//! ```

mod config;
mod error;
mod models;

pub use config::*;
pub use error::{EsNetError, EsNetResult};
pub use models::*;
