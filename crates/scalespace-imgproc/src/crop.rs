use rayon::prelude::*;
use scalespace_image::{Image, ImageSize};

use crate::error::ImgprocError;

/// Copy the window of `dst`'s size whose top-left corner is `(x, y)` in `src`.
///
/// # Errors
///
/// [`ImgprocError::ImageSizeMismatch`] with the size of `src` and the extent the
/// window needs, if the window does not fit inside `src`.
///
/// # Example
///
/// ```
/// use scalespace_image::Image;
/// use scalespace_imgproc::crop::crop_image;
///
/// let image = Image::<u8, 1>::new([4, 3].into(), (0..12).collect()).unwrap();
/// let mut window = Image::<u8, 1>::from_size_val([2, 2].into(), 0).unwrap();
///
/// crop_image(&image, &mut window, 2, 1).unwrap();
/// assert_eq!(window.as_slice(), &[6, 7, 10, 11]);
/// ```
pub fn crop_image<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    x: usize,
    y: usize,
) -> Result<(), ImgprocError>
where
    T: Copy + Send + Sync,
{
    let needed = x
        .checked_add(dst.cols())
        .zip(y.checked_add(dst.rows()))
        .map(|(width, height)| ImageSize { width, height });
    match needed {
        Some(extent) if extent.width <= src.cols() && extent.height <= src.rows() => {}
        Some(extent) => return Err(ImgprocError::ImageSizeMismatch(src.size(), extent)),
        None => {
            return Err(ImgprocError::InvalidParameter(
                "crop origin",
                format!("({x}, {y}) overflows"),
            ))
        }
    }

    let row_len = dst.cols() * C;
    if row_len == 0 {
        return Ok(());
    }
    let src_stride = src.cols() * C;
    let src_rows = &src.as_slice()[y * src_stride..];

    dst.as_slice_mut()
        .par_chunks_exact_mut(row_len)
        .zip(src_rows.par_chunks(src_stride))
        .for_each(|(window_row, src_row)| {
            window_row.copy_from_slice(&src_row[x * C..x * C + row_len]);
        });

    Ok(())
}
