use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};
use scalespace_image::Image;

use super::Kernel;
use crate::error::{ensure_same_size, ImgprocError};

/// Convolve an image with a 2D kernel using zero padding.
///
/// For every output sample the kernel is laid over the source with its center
/// at `(x, y)`:
///
/// `dst(x, y) = sum_{i, j} kernel(i, j) * src(x + i - rx, y + j - ry)`
///
/// where `rx`/`ry` are the kernel radii. Samples falling outside the source are
/// read as zero. Every channel is filtered independently. The kernel is used as
/// given, no normalization is applied.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel` - The convolution kernel.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
///
/// # Example
///
/// ```
/// use scalespace_image::Image;
/// use scalespace_imgproc::filter::{convolve, kernels::gradient_kernel_x};
///
/// let src = Image::<f32, 1>::new([3, 1].into(), vec![1.0, 2.0, 4.0]).unwrap();
/// let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0).unwrap();
///
/// convolve(&src, &mut dst, &gradient_kernel_x()).unwrap();
///
/// assert_eq!(dst.as_slice(), &[2.0, 3.0, -2.0]);
/// ```
pub fn convolve<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    kernel: &Kernel,
) -> Result<(), ImgprocError> {
    ensure_same_size(src.size(), dst.size())?;

    let (cols, rows) = (src.cols(), src.rows());
    if cols == 0 || rows == 0 {
        return Ok(());
    }

    let (kw, kh) = (kernel.width(), kernel.height());
    let (rx, ry) = (kernel.radius_x() as isize, kernel.radius_y() as isize);
    let weights = kernel.as_slice();
    let src_data = src.as_slice();

    dst.as_slice_mut()
        .par_chunks_exact_mut(cols * C)
        .enumerate()
        .for_each(|(y, dst_row)| {
            dst_row
                .chunks_exact_mut(C)
                .enumerate()
                .for_each(|(x, dst_pixel)| {
                    let mut acc = [0.0f32; C];
                    for j in 0..kh {
                        let sy = y as isize + j as isize - ry;
                        if sy < 0 || sy >= rows as isize {
                            continue;
                        }
                        let row_offset = sy as usize * cols;
                        for i in 0..kw {
                            let sx = x as isize + i as isize - rx;
                            if sx < 0 || sx >= cols as isize {
                                continue;
                            }
                            let w = weights[j * kw + i];
                            if w == 0.0 {
                                continue;
                            }
                            let src_offset = (row_offset + sx as usize) * C;
                            for (a, &v) in acc.iter_mut().zip(&src_data[src_offset..src_offset + C])
                            {
                                *a += w * v;
                            }
                        }
                    }
                    dst_pixel.copy_from_slice(&acc);
                });
        });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::kernels::{gradient_kernel_y, laplacian_kernel};
    use scalespace_image::ImageSize;

    #[test]
    fn test_convolve_identity() -> Result<(), ImgprocError> {
        let size = ImageSize {
            width: 4,
            height: 3,
        };
        let src = Image::<f32, 1>::new(size, (0..12).map(|x| x as f32).collect())?;
        let mut dst = Image::from_size_val(size, 0.0)?;

        convolve(&src, &mut dst, &Kernel::identity())?;
        assert_eq!(dst.as_slice(), src.as_slice());

        Ok(())
    }

    #[test]
    fn test_convolve_laplacian_zero_padding() -> Result<(), ImgprocError> {
        let size = ImageSize {
            width: 3,
            height: 3,
        };
        let src = Image::<f32, 1>::from_size_val(size, 1.0)?;
        let mut dst = Image::from_size_val(size, 0.0)?;

        convolve(&src, &mut dst, &laplacian_kernel())?;

        // missing neighbours outside the image read as zero
        #[rustfmt::skip]
        assert_eq!(
            dst.as_slice(),
            &[
                -2.0, -1.0, -2.0,
                -1.0,  0.0, -1.0,
                -2.0, -1.0, -2.0,
            ]
        );

        Ok(())
    }

    #[test]
    fn test_convolve_vertical_gradient() -> Result<(), ImgprocError> {
        #[rustfmt::skip]
        let src = Image::<f32, 1>::new(
            [2, 3].into(),
            vec![
                1.0, 2.0,
                3.0, 5.0,
                6.0, 9.0,
            ],
        )?;
        let mut dst = Image::from_size_val(src.size(), 0.0)?;

        convolve(&src, &mut dst, &gradient_kernel_y())?;

        #[rustfmt::skip]
        assert_eq!(
            dst.as_slice(),
            &[
                3.0, 5.0,
                5.0, 7.0,
                -3.0, -5.0,
            ]
        );

        Ok(())
    }

    #[test]
    fn test_convolve_multichannel() -> Result<(), ImgprocError> {
        let src = Image::<f32, 2>::new([2, 1].into(), vec![1.0, 10.0, 2.0, 20.0])?;
        let mut dst = Image::from_size_val(src.size(), 0.0)?;
        let kernel = Kernel::new(3, 1, vec![1.0, 1.0, 1.0])?;

        convolve(&src, &mut dst, &kernel)?;

        assert_eq!(dst.as_slice(), &[3.0, 30.0, 3.0, 30.0]);
        Ok(())
    }

    #[test]
    fn test_convolve_preserves_size() -> Result<(), ImgprocError> {
        let src = Image::<f32, 1>::from_size_val([7, 5].into(), 2.0)?;
        let kernel = Kernel::new(5, 5, vec![1.0; 25])?;
        let mut dst = Image::from_size_val(src.size(), 0.0)?;
        convolve(&src, &mut dst, &kernel)?;
        assert_eq!(dst.size(), src.size());
        assert_eq!(dst.get([2, 3, 0]), Some(&50.0));
        Ok(())
    }

    #[test]
    fn test_convolve_size_mismatch() -> Result<(), ImgprocError> {
        let src = Image::<f32, 1>::from_size_val([3, 3].into(), 0.0)?;
        let mut dst = Image::from_size_val([2, 3].into(), 0.0)?;
        assert_eq!(
            convolve(&src, &mut dst, &Kernel::identity()),
            Err(ImgprocError::ImageSizeMismatch(src.size(), dst.size()))
        );
        Ok(())
    }
}
