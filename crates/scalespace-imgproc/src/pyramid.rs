use scalespace_image::Image;

use crate::error::ImgprocError;
use crate::filter::gaussian_blur;

/// Parameters of a Gaussian scale space.
///
/// Level `i` is smoothed with `sigma0 * growth^i`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleSpaceConfig {
    /// Standard deviation of the finest level.
    pub sigma0: f32,
    /// Number of levels.
    pub num_scales: usize,
    /// Ratio between the sigmas of two consecutive levels.
    pub growth: f32,
}

impl Default for ScaleSpaceConfig {
    fn default() -> Self {
        Self {
            sigma0: 1.0,
            num_scales: 5,
            growth: std::f32::consts::SQRT_2,
        }
    }
}

impl ScaleSpaceConfig {
    /// Set the sigma of the finest level.
    pub fn with_sigma0(mut self, sigma0: f32) -> Self {
        self.sigma0 = sigma0;
        self
    }

    /// Set the number of levels.
    pub fn with_num_scales(mut self, num_scales: usize) -> Self {
        self.num_scales = num_scales;
        self
    }

    /// Set the sigma ratio between consecutive levels.
    pub fn with_growth(mut self, growth: f32) -> Self {
        self.growth = growth;
        self
    }

    /// The sigma of every level, finest first.
    pub fn sigmas(&self) -> Vec<f32> {
        (0..self.num_scales)
            .map(|i| self.sigma0 * self.growth.powi(i as i32))
            .collect()
    }

    /// Check the parameters.
    ///
    /// # Errors
    ///
    /// If `sigma0` is negative or not finite, `num_scales` is zero or `growth` is
    /// not finite and greater than one.
    pub fn validate(&self) -> Result<(), ImgprocError> {
        if !self.sigma0.is_finite() || self.sigma0 < 0.0 {
            return Err(ImgprocError::InvalidParameter(
                "sigma0",
                format!("must be finite and >= 0, got {}", self.sigma0),
            ));
        }
        if self.num_scales == 0 {
            return Err(ImgprocError::InvalidParameter(
                "num_scales",
                "at least one scale is required".to_string(),
            ));
        }
        if !self.growth.is_finite() || self.growth <= 1.0 {
            return Err(ImgprocError::InvalidParameter(
                "growth",
                format!("must be finite and > 1, got {}", self.growth),
            ));
        }
        Ok(())
    }
}

/// One level of a Gaussian scale space.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleLevel<const C: usize> {
    /// The standard deviation used to smooth this level.
    pub sigma: f32,
    /// The smoothed image, same size as the input.
    pub image: Image<f32, C>,
}

/// Build a Gaussian scale space with a `sqrt(2)` sigma growth.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `sigma0` - The sigma of the finest level.
/// * `num_scales` - The number of levels.
///
/// # Returns
///
/// The levels, finest (smallest sigma) first. Every level keeps the size of `src`.
///
/// # Example
///
/// ```
/// use scalespace_image::Image;
/// use scalespace_imgproc::pyramid::build_pyramid;
///
/// let image = Image::<f32, 1>::from_size_val([16, 16].into(), 1.0).unwrap();
/// let levels = build_pyramid(&image, 1.0, 3).unwrap();
///
/// assert_eq!(levels.len(), 3);
/// assert!((levels[2].sigma - 2.0).abs() < 1e-6);
/// assert_eq!(levels[2].image.size(), image.size());
/// ```
pub fn build_pyramid<const C: usize>(
    src: &Image<f32, C>,
    sigma0: f32,
    num_scales: usize,
) -> Result<Vec<ScaleLevel<C>>, ImgprocError> {
    build_pyramid_with_config(
        src,
        &ScaleSpaceConfig::default()
            .with_sigma0(sigma0)
            .with_num_scales(num_scales),
    )
}

/// Build a Gaussian scale space with a custom sigma growth.
///
/// See [`build_pyramid`].
pub fn build_pyramid_with_growth<const C: usize>(
    src: &Image<f32, C>,
    sigma0: f32,
    num_scales: usize,
    growth: f32,
) -> Result<Vec<ScaleLevel<C>>, ImgprocError> {
    build_pyramid_with_config(
        src,
        &ScaleSpaceConfig {
            sigma0,
            num_scales,
            growth,
        },
    )
}

/// Build a Gaussian scale space from a [`ScaleSpaceConfig`].
///
/// Each level is smoothed directly from `src` with its own sigma.
pub fn build_pyramid_with_config<const C: usize>(
    src: &Image<f32, C>,
    config: &ScaleSpaceConfig,
) -> Result<Vec<ScaleLevel<C>>, ImgprocError> {
    config.validate()?;

    config
        .sigmas()
        .into_iter()
        .map(|sigma| {
            log::debug!("smoothing scale space level with sigma {sigma:.4}");
            let mut image = Image::from_size_val(src.size(), 0.0)?;
            gaussian_blur(src, &mut image, sigma)?;
            Ok(ScaleLevel { sigma, image })
        })
        .collect()
}
