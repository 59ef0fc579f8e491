use scalespace_image::{Image, ImageError};

use crate::error::ImgprocError;

/// Direction of an intensity profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileAxis {
    /// Samples along a row, left to right.
    Row,
    /// Samples along a column, top to bottom.
    Column,
}

/// Extract the intensity profile of one channel along a row or a column.
///
/// # Arguments
///
/// * `image` - The input image.
/// * `axis` - Whether `index` is a row or a column.
/// * `index` - The row or column index.
/// * `channel` - The channel to sample.
///
/// # Errors
///
/// If `index` or `channel` is out of bounds.
///
/// # Example
///
/// ```
/// use scalespace_image::Image;
/// use scalespace_imgproc::profile::{intensity_profile, ProfileAxis};
///
/// let image = Image::<u8, 1>::new([3, 2].into(), vec![1, 2, 3, 4, 5, 6]).unwrap();
///
/// assert_eq!(intensity_profile(&image, ProfileAxis::Row, 1, 0).unwrap(), vec![4, 5, 6]);
/// assert_eq!(intensity_profile(&image, ProfileAxis::Column, 2, 0).unwrap(), vec![3, 6]);
/// ```
pub fn intensity_profile<T, const C: usize>(
    image: &Image<T, C>,
    axis: ProfileAxis,
    index: usize,
    channel: usize,
) -> Result<Vec<T>, ImgprocError>
where
    T: Copy,
{
    if channel >= C {
        return Err(ImageError::ChannelIndexOutOfBounds(channel, C).into());
    }

    let (cols, rows) = (image.cols(), image.rows());
    let data = image.as_slice();

    let profile = match axis {
        ProfileAxis::Row => {
            if index >= rows {
                return Err(ImageError::PixelIndexOutOfBounds(0, index, cols, rows).into());
            }
            (0..cols)
                .map(|x| data[(index * cols + x) * C + channel])
                .collect()
        }
        ProfileAxis::Column => {
            if index >= cols {
                return Err(ImageError::PixelIndexOutOfBounds(index, 0, cols, rows).into());
            }
            (0..rows)
                .map(|y| data[(y * cols + index) * C + channel])
                .collect()
        }
    };

    Ok(profile)
}
