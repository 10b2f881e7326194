//! # Model Architectures
//!
//! This module aggregates the ESNet building blocks and the network that
//! composes them:
//!
//! - `modules`: Downsampling and upsampling blocks, the factorized convolution
//!   unit (FCU) and the parallel factorized convolution unit (PFCU).
//! - `esnet`: The symmetric encoder-decoder built from those blocks.
//!
//! The components are re-exported for easy access from the parent `models` module.

pub mod esnet;
pub mod modules;

pub use esnet::{EsNet, EsNetOutput, EsNetRecord};
pub use modules::*;
