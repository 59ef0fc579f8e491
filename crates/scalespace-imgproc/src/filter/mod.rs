//! Filter operations
//!
//! This module provides the zero-padded convolution engine and the kernels used
//! by the scale space and diffusion modules.

/// Filter kernels
pub mod kernels;
pub use kernels::Kernel;

/// Convolution operations
mod convolution;
pub use convolution::*;

/// Filter operations
mod ops;
pub use ops::*;
