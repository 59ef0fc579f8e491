use num_traits::Float;
use rayon::prelude::*;
use scalespace_image::{Image, ImageError};

use crate::error::{ensure_same_size, ImgprocError};

/// Smallest and largest sample of an image, over all channels.
///
/// # Errors
///
/// If the image holds no samples.
///
/// # Example
///
/// ```
/// use scalespace_image::Image;
/// use scalespace_imgproc::normalize::find_min_max;
///
/// let image = Image::<u8, 1>::new([3, 1].into(), vec![4, 9, 2]).unwrap();
/// assert_eq!(find_min_max(&image).unwrap(), (2, 9));
/// ```
pub fn find_min_max<T, const C: usize>(image: &Image<T, C>) -> Result<(T, T), ImgprocError>
where
    T: Copy + PartialOrd,
{
    let (&first, rest) = image
        .as_slice()
        .split_first()
        .ok_or(ImageError::ImageDataNotInitialized)?;

    Ok(rest.iter().fold((first, first), |(lo, hi), &v| {
        (if v < lo { v } else { lo }, if v > hi { v } else { hi })
    }))
}

/// Linearly rescale an image so that its range becomes `[min, max]`.
///
/// A constant image maps to `min`.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `min` - Value the smallest sample maps to.
/// * `max` - Value the largest sample maps to.
///
/// # Errors
///
/// If the shapes differ or `src` is empty.
pub fn normalize_min_max<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    min: T,
    max: T,
) -> Result<(), ImgprocError>
where
    T: Float + Send + Sync,
{
    ensure_same_size(src.size(), dst.size())?;

    let (lo, hi) = find_min_max(src)?;
    let range = hi - lo;
    if range <= T::zero() {
        dst.as_slice_mut().fill(min);
        return Ok(());
    }

    let gain = (max - min) / range;
    dst.as_slice_mut()
        .par_iter_mut()
        .zip(src.as_slice().par_iter())
        .for_each(|(out, &v)| *out = (v - lo) * gain + min);

    Ok(())
}
