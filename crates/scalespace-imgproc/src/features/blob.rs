use std::cmp::Ordering;

use rayon::prelude::*;
use scalespace_image::Image;

use super::laplacian_responses;
use crate::error::{ensure_same_size, ImgprocError};
use crate::pyramid::{build_pyramid_with_config, ScaleSpaceConfig};

/// A scale space extremum: a pixel location and the sigma it was found at.
///
/// Blobs are ordered by scale, then by row, then by column.
#[derive(Debug, Clone, Copy)]
pub struct Blob {
    /// Column of the extremum.
    pub x: usize,
    /// Row of the extremum.
    pub y: usize,
    /// Sigma of the scale space level holding the extremum.
    pub scale: f32,
}

impl Blob {
    /// Create a new blob.
    pub fn new(x: usize, y: usize, scale: f32) -> Self {
        Self { x, y, scale }
    }
}

impl PartialEq for Blob {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Blob {}

impl PartialOrd for Blob {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Blob {
    fn cmp(&self, other: &Self) -> Ordering {
        self.scale
            .total_cmp(&other.scale)
            .then(self.y.cmp(&other.y))
            .then(self.x.cmp(&other.x))
    }
}

/// Parameters of the scale space blob detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlobDetectorConfig {
    /// The scale space to search.
    pub scale_space: ScaleSpaceConfig,
    /// Minimum absolute normalized Laplacian response of a blob.
    pub threshold: f32,
}

impl Default for BlobDetectorConfig {
    fn default() -> Self {
        Self {
            scale_space: ScaleSpaceConfig::default(),
            threshold: 0.05,
        }
    }
}

impl BlobDetectorConfig {
    /// Set the scale space parameters.
    pub fn with_scale_space(mut self, scale_space: ScaleSpaceConfig) -> Self {
        self.scale_space = scale_space;
        self
    }

    /// Set the response threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }
}

/// Find the local extrema of a scale space response volume.
///
/// Only the interior scales are candidates: the first and the last level have
/// no neighbour on one side of the scale axis. A sample at `(x, y, z)` is a blob
/// if `|response[z](x, y)| > threshold` and it equals either the minimum or the
/// maximum of its 3x3x3 neighbourhood (itself included). The spatial window is
/// clipped at the image border. Equality is not strict, so every sample of a
/// plateau qualifies.
///
/// # Arguments
///
/// * `responses` - One response image per scale, finest first.
/// * `sigmas` - The sigma of every response.
/// * `threshold` - Minimum absolute response.
///
/// # Returns
///
/// The blobs, sorted by scale, row and column.
///
/// # Errors
///
/// If `responses` and `sigmas` have different lengths, the responses do not
/// share the same size, or the threshold is not finite.
pub fn find_blobs(
    responses: &[Image<f32, 1>],
    sigmas: &[f32],
    threshold: f32,
) -> Result<Vec<Blob>, ImgprocError> {
    if responses.len() != sigmas.len() {
        return Err(ImgprocError::LengthMismatch(responses.len(), sigmas.len()));
    }
    if !threshold.is_finite() {
        return Err(ImgprocError::InvalidParameter(
            "threshold",
            format!("must be finite, got {threshold}"),
        ));
    }

    let Some(first) = responses.first() else {
        return Ok(Vec::new());
    };
    let size = first.size();
    for response in responses.iter().skip(1) {
        ensure_same_size(size, response.size())?;
    }

    let (cols, rows) = (size.width, size.height);
    let mut blobs = Vec::new();

    for z in 1..responses.len().saturating_sub(1) {
        let sigma = sigmas[z];
        let volume = [
            responses[z - 1].as_slice(),
            responses[z].as_slice(),
            responses[z + 1].as_slice(),
        ];

        let level_blobs = (0..rows)
            .into_par_iter()
            .flat_map_iter(|y| {
                (0..cols).filter_map(move |x| {
                    let value = volume[1][y * cols + x];
                    if value.abs() > threshold && is_local_extremum(&volume, cols, rows, x, y) {
                        Some(Blob::new(x, y, sigma))
                    } else {
                        None
                    }
                })
            })
            .collect::<Vec<_>>();

        log::debug!(
            "found {} blobs at scale index {z} (sigma {sigma:.4})",
            level_blobs.len()
        );
        blobs.extend(level_blobs);
    }

    blobs.sort();

    Ok(blobs)
}

/// Whether the center sample equals the minimum or maximum of its neighbourhood.
fn is_local_extremum(volume: &[&[f32]; 3], cols: usize, rows: usize, x: usize, y: usize) -> bool {
    let x_min = x.saturating_sub(1);
    let x_max = (x + 1).min(cols - 1);
    let y_min = y.saturating_sub(1);
    let y_max = (y + 1).min(rows - 1);

    let value = volume[1][y * cols + x];
    let (mut v_min, mut v_max) = (value, value);

    for level in volume {
        for yy in y_min..=y_max {
            for &v in &level[yy * cols + x_min..=yy * cols + x_max] {
                if v < v_min {
                    v_min = v;
                }
                if v > v_max {
                    v_max = v;
                }
            }
        }
    }

    value == v_min || value == v_max
}

/// Detect blobs in an image with the scale normalized Laplacian.
///
/// Builds the Gaussian scale space, computes the normalized Laplacian of every
/// level and returns the scale space extrema, see [`find_blobs`].
///
/// # Example
///
/// ```
/// use scalespace_image::Image;
/// use scalespace_imgproc::features::{detect_blobs, BlobDetectorConfig};
///
/// let mut image = Image::<f32, 1>::from_size_val([32, 32].into(), 0.0).unwrap();
/// for y in 14..18 {
///     for x in 14..18 {
///         image.set_pixel(x, y, 0, 255.0).unwrap();
///     }
/// }
///
/// let blobs = detect_blobs(&image, &BlobDetectorConfig::default().with_threshold(10.0)).unwrap();
/// assert!(!blobs.is_empty());
/// ```
pub fn detect_blobs(
    src: &Image<f32, 1>,
    config: &BlobDetectorConfig,
) -> Result<Vec<Blob>, ImgprocError> {
    let levels = build_pyramid_with_config(src, &config.scale_space)?;
    let responses = laplacian_responses(&levels)?;
    let sigmas = levels.iter().map(|level| level.sigma).collect::<Vec<_>>();

    let blobs = find_blobs(&responses, &sigmas, config.threshold)?;
    log::debug!(
        "detected {} blobs over {} scales",
        blobs.len(),
        sigmas.len()
    );

    Ok(blobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scalespace_image::ImageSize;

    fn volume_with_peak(
        size: ImageSize,
        num_scales: usize,
        peak: (usize, usize, usize),
        value: f32,
    ) -> Result<Vec<Image<f32, 1>>, ImgprocError> {
        let mut responses = Vec::with_capacity(num_scales);
        for z in 0..num_scales {
            let mut response = Image::from_size_val(size, 0.0)?;
            if z == peak.2 {
                response.set_pixel(peak.0, peak.1, 0, value)?;
            }
            responses.push(response);
        }
        Ok(responses)
    }

    #[test]
    fn test_blob_ordering() {
        let mut blobs = vec![
            Blob::new(3, 1, 2.0),
            Blob::new(1, 2, 1.0),
            Blob::new(0, 2, 1.0),
            Blob::new(9, 0, 1.0),
        ];
        blobs.sort();
        assert_eq!(
            blobs,
            vec![
                Blob::new(9, 0, 1.0),
                Blob::new(0, 2, 1.0),
                Blob::new(1, 2, 1.0),
                Blob::new(3, 1, 2.0),
            ]
        );
    }

    #[test]
    fn test_find_blobs_single_peak() -> Result<(), ImgprocError> {
        let responses = volume_with_peak([7, 7].into(), 3, (3, 4, 1), 100.0)?;
        let blobs = find_blobs(&responses, &[1.0, 1.5, 2.0], 50.0)?;
        assert_eq!(blobs, vec![Blob::new(3, 4, 1.5)]);
        Ok(())
    }

    #[test]
    fn test_find_blobs_single_minimum_at_corner() -> Result<(), ImgprocError> {
        let responses = volume_with_peak([5, 5].into(), 3, (0, 0, 1), -100.0)?;
        let blobs = find_blobs(&responses, &[1.0, 2.0, 4.0], 50.0)?;
        assert_eq!(blobs, vec![Blob::new(0, 0, 2.0)]);
        Ok(())
    }

    #[test]
    fn test_find_blobs_skips_boundary_scales() -> Result<(), ImgprocError> {
        let sigmas = [1.0, 2.0, 3.0, 4.0];
        for z in [0, 3] {
            let responses = volume_with_peak([6, 6].into(), 4, (2, 2, z), 100.0)?;
            assert!(find_blobs(&responses, &sigmas, 50.0)?.is_empty());
        }

        // two scales have no interior level at all
        let responses = volume_with_peak([6, 6].into(), 2, (2, 2, 1), 100.0)?;
        assert!(find_blobs(&responses, &sigmas[..2], 0.0)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_find_blobs_below_threshold() -> Result<(), ImgprocError> {
        let responses = volume_with_peak([5, 5].into(), 3, (2, 2, 1), 40.0)?;
        assert!(find_blobs(&responses, &[1.0, 2.0, 3.0], 50.0)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_find_blobs_plateau_is_not_deduplicated() -> Result<(), ImgprocError> {
        let size = [4, 3].into();
        let responses = vec![
            Image::from_size_val(size, 0.0)?,
            Image::from_size_val(size, 10.0)?,
            Image::from_size_val(size, 0.0)?,
        ];
        let blobs = find_blobs(&responses, &[1.0, 2.0, 3.0], 5.0)?;
        assert_eq!(blobs.len(), 12);
        assert!(blobs.iter().all(|b| b.scale == 2.0));
        Ok(())
    }

    #[test]
    fn test_find_blobs_shape_mismatch() -> Result<(), ImgprocError> {
        let responses = volume_with_peak([5, 5].into(), 3, (2, 2, 1), 100.0)?;
        assert_eq!(
            find_blobs(&responses, &[1.0, 2.0], 50.0),
            Err(ImgprocError::LengthMismatch(3, 2))
        );

        let mut responses = responses;
        responses[2] = Image::from_size_val([4, 5].into(), 0.0)?;
        assert_eq!(
            find_blobs(&responses, &[1.0, 2.0, 3.0], 50.0),
            Err(ImgprocError::ImageSizeMismatch(
                [5, 5].into(),
                [4, 5].into()
            ))
        );
        Ok(())
    }

    #[test]
    fn test_find_blobs_empty() -> Result<(), ImgprocError> {
        assert!(find_blobs(&[], &[], 1.0)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_detect_blobs_bright_square() -> Result<(), ImgprocError> {
        let size = ImageSize {
            width: 32,
            height: 32,
        };
        let mut image = Image::from_size_val(size, 0.0)?;
        for y in 13..19 {
            for x in 13..19 {
                image.set_pixel(x, y, 0, 255.0)?;
            }
        }

        let config = BlobDetectorConfig::default()
            .with_scale_space(ScaleSpaceConfig::default().with_sigma0(1.0).with_num_scales(6))
            .with_threshold(20.0);
        let blobs = detect_blobs(&image, &config)?;

        // the bright square yields a strong negative response at its center
        assert!(blobs
            .iter()
            .any(|b| (14..=17).contains(&b.x) && (14..=17).contains(&b.y)));
        assert!(blobs.windows(2).all(|w| w[0] <= w[1]));
        Ok(())
    }
}
