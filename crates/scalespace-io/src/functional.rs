use std::path::Path;

use scalespace_image::{Image, ImageSize};

use crate::error::IoError;

fn open_image(file_path: &Path) -> Result<image::DynamicImage, IoError> {
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let img = image::ImageReader::open(file_path)?
        .with_guessed_format()?
        .decode()?;
    log::debug!(
        "decoded {} ({}x{}, {:?})",
        file_path.display(),
        img.width(),
        img.height(),
        img.color()
    );

    Ok(img)
}

/// Reads an image from the given file path as a single channel (mono8) image.
///
/// Any format supported by the image crate is accepted; color images are
/// converted to luminance.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// A grayscale image with a single channel.
pub fn read_image_any_mono8(file_path: impl AsRef<Path>) -> Result<Image<u8, 1>, IoError> {
    let img = open_image(file_path.as_ref())?.into_luma8();
    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };
    Ok(Image::new(size, img.into_raw())?)
}

/// Reads an image from the given file path as a three channel (rgb8) image.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// A RGB image with three channels.
pub fn read_image_any_rgb8(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let img = open_image(file_path.as_ref())?.into_rgb8();
    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };
    Ok(Image::new(size, img.into_raw())?)
}

fn write_png_impl(
    file_path: &Path,
    data: &[u8],
    size: ImageSize,
    color_type: image::ExtendedColorType,
) -> Result<(), IoError> {
    image::save_buffer_with_format(
        file_path,
        data,
        size.width as u32,
        size.height as u32,
        color_type,
        image::ImageFormat::Png,
    )
    .map_err(IoError::ImageEncodeError)?;
    log::debug!("wrote {}", file_path.display());
    Ok(())
}

/// Writes a single channel (mono8) image to a PNG file.
///
/// # Arguments
///
/// * `file_path` - The path to the PNG file.
/// * `image` - The grayscale image to write.
pub fn write_image_png_mono8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 1>,
) -> Result<(), IoError> {
    write_png_impl(
        file_path.as_ref(),
        image.as_slice(),
        image.size(),
        image::ExtendedColorType::L8,
    )
}

/// Writes a three channel (rgb8) image to a PNG file.
///
/// # Arguments
///
/// * `file_path` - The path to the PNG file.
/// * `image` - The RGB image to write.
pub fn write_image_png_rgb8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 3>,
) -> Result<(), IoError> {
    write_png_impl(
        file_path.as_ref(),
        image.as_slice(),
        image.size(),
        image::ExtendedColorType::Rgb8,
    )
}
