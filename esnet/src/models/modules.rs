mod downsampling;
mod factorized_conv;
mod fcu;
mod pfcu;
mod upsampling;
mod utils;

pub use downsampling::*;
pub use factorized_conv::*;
pub use fcu::*;
pub use pfcu::*;
pub use upsampling::*;
