use scalespace_image::Image;

use crate::features::Blob;

/// Color used to mark blobs on an RGB image.
pub const BLOB_COLOR: [u8; 3] = [100, 200, 100];

/// Set a pixel's color, ignoring coordinates outside the image.
#[inline]
fn set_pixel<const C: usize>(img: &mut Image<u8, C>, x: i64, y: i64, color: [u8; C]) {
    if x >= 0 && x < img.cols() as i64 && y >= 0 && y < img.rows() as i64 {
        let start = (y as usize * img.cols() + x as usize) * C;
        img.as_slice_mut()[start..start + C].copy_from_slice(&color);
    }
}

/// Draws a circle outline on an image inplace.
///
/// A pixel is painted when its distance to the center is within half the
/// thickness of `radius`. Parts of the circle outside the image are clipped.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `center` - The center of the circle as a tuple of (x, y).
/// * `radius` - The radius of the circle in pixels.
/// * `color` - The color of the circle as an array of `C` elements.
/// * `thickness` - The width of the outline in pixels.
pub fn draw_circle<const C: usize>(
    img: &mut Image<u8, C>,
    center: (i64, i64),
    radius: usize,
    color: [u8; C],
    thickness: usize,
) {
    let (cx, cy) = center;
    let half = thickness.max(1) as f64 / 2.0;
    let inner = radius as f64 - half;
    let outer = radius as f64 + half;
    let reach = outer.ceil() as i64;

    for dy in -reach..=reach {
        for dx in -reach..=reach {
            let d = ((dx * dx + dy * dy) as f64).sqrt();
            if d >= inner && d <= outer {
                set_pixel(img, cx + dx, cy + dy, color);
            }
        }
    }
}

/// Draws one circle per blob, with a radius of the blob scale plus one pixel.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `blobs` - The blobs to mark.
/// * `color` - The color of the circles.
pub fn draw_blobs<const C: usize>(img: &mut Image<u8, C>, blobs: &[Blob], color: [u8; C]) {
    for blob in blobs {
        let radius = blob.scale.max(0.0) as usize + 1;
        draw_circle(img, (blob.x as i64, blob.y as i64), radius, color, 1);
    }
}
