use scalespace_image::Image;

use super::{convolve, kernels};
use crate::error::{ensure_same_size, ImgprocError};

/// Blur an image using a gaussian blur filter
///
/// The kernel radius follows the 3-sigma rule, see [`kernels::gaussian_radius`],
/// and is clamped as in [`gaussian_blur_with_radius`].
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `sigma` - The sigma of the gaussian kernel.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn gaussian_blur<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    sigma: f32,
) -> Result<(), ImgprocError> {
    gaussian_blur_with_radius(src, dst, sigma, kernels::gaussian_radius(sigma))
}

/// Blur an image using a gaussian blur filter with an explicit kernel radius.
///
/// The 2D gaussian is applied as a horizontal and a vertical pass of the
/// normalized 1D kernel. The radius is clamped to `max(width, height) - 1`:
/// farther taps only ever read the zero padding. The kernel is normalized
/// over the clamped support.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `sigma` - The sigma of the gaussian kernel.
/// * `radius` - The half size of the kernel, the kernel is `(2 * radius + 1)` wide.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn gaussian_blur_with_radius<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    sigma: f32,
    radius: usize,
) -> Result<(), ImgprocError> {
    let max_radius = src.cols().max(src.rows()).saturating_sub(1);
    let kernel_x = kernels::gaussian_kernel_1d_with_radius(sigma, radius.min(max_radius))?;
    let kernel_y = kernel_x.transposed();

    ensure_same_size(src.size(), dst.size())?;

    let mut horizontal = Image::<f32, C>::from_size_val(src.size(), 0.0)?;
    convolve(src, &mut horizontal, &kernel_x)?;
    convolve(&horizontal, dst, &kernel_y)
}
