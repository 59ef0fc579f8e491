use scalespace_image::{ImageError, ImageSize};

/// An error type for the image processing operations.
///
/// All variants are precondition violations detected before any output
/// buffer is written.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImgprocError {
    /// A numeric parameter is outside of its valid domain.
    #[error("Invalid parameter `{0}`: {1}")]
    InvalidParameter(&'static str, String),

    /// Two images that must share the same size do not.
    #[error("Image size mismatch: expected {0}, got {1}")]
    ImageSizeMismatch(ImageSize, ImageSize),

    /// Two parallel sequences have different lengths.
    #[error("Sequence length mismatch: {0} != {1}")]
    LengthMismatch(usize, usize),

    /// A kernel cannot be normalized because its weights sum to zero.
    #[error("Kernel weights sum to zero and cannot be normalized")]
    DegenerateNormalization,

    /// Error coming from the image container.
    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Check that two image sizes match.
pub(crate) fn ensure_same_size(expected: ImageSize, actual: ImageSize) -> Result<(), ImgprocError> {
    if expected != actual {
        return Err(ImgprocError::ImageSizeMismatch(expected, actual));
    }
    Ok(())
}
