use rayon::prelude::*;
use scalespace_image::Image;

use crate::error::ImgprocError;
use crate::filter::{convolve, kernels::laplacian_kernel};
use crate::pyramid::ScaleLevel;

/// Compute the scale normalized Laplacian response of an image.
///
/// The image is convolved with the 3x3 discrete Laplacian and every sample is
/// multiplied by `sigma^2` so that responses of different scales are comparable.
/// No smoothing is applied here, `src` is expected to be already smoothed with
/// `sigma`.
///
/// # Arguments
///
/// * `src` - The smoothed source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `sigma` - The sigma `src` was smoothed with.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn laplacian_response<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    sigma: f32,
) -> Result<(), ImgprocError> {
    if !sigma.is_finite() {
        return Err(ImgprocError::InvalidParameter(
            "sigma",
            format!("must be finite, got {sigma}"),
        ));
    }

    convolve(src, dst, &laplacian_kernel())?;

    let norm = sigma * sigma;
    dst.as_slice_mut().par_iter_mut().for_each(|v| *v *= norm);

    Ok(())
}

/// Compute the normalized Laplacian response of every level of a scale space.
///
/// Each level is processed with its own sigma, see [`laplacian_response`].
pub fn laplacian_responses<const C: usize>(
    levels: &[ScaleLevel<C>],
) -> Result<Vec<Image<f32, C>>, ImgprocError> {
    levels
        .iter()
        .map(|level| {
            let mut response = Image::from_size_val(level.image.size(), 0.0)?;
            laplacian_response(&level.image, &mut response, level.sigma)?;
            Ok(response)
        })
        .collect()
}
