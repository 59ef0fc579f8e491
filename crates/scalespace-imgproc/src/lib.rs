#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// image cropping module.
pub mod crop;

/// flow based smoothing: heat, anisotropic and total variation diffusion.
pub mod diffusion;

/// utilities to draw on images.
pub mod draw;

/// Error types for the image processing module.
pub mod error;

/// feature detection module.
pub mod features;

/// image filtering module.
pub mod filter;

/// operations to normalize images.
pub mod normalize;

/// intensity profiles along image rows and columns.
pub mod profile;

/// Gaussian scale space construction.
pub mod pyramid;

pub use crate::error::ImgprocError;
