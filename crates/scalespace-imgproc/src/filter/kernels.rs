use crate::error::ImgprocError;

/// A small 2D convolution kernel.
///
/// The weights are stored row-major, `data[j * width + i]` being the weight at
/// column `i` and row `j`. The kernel center sits at `(width / 2, height / 2)`.
/// Kernels are immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl Kernel {
    /// Create a new kernel from its weights.
    ///
    /// # Arguments
    ///
    /// * `width` - The number of columns of the kernel.
    /// * `height` - The number of rows of the kernel.
    /// * `data` - The weights, row-major.
    ///
    /// # Errors
    ///
    /// If the kernel is empty or the data length does not match `width * height`.
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> Result<Self, ImgprocError> {
        if width == 0 || height == 0 {
            return Err(ImgprocError::InvalidParameter(
                "kernel size",
                format!("kernel must not be empty, got {width}x{height}"),
            ));
        }
        if data.len() != width * height {
            return Err(ImgprocError::LengthMismatch(data.len(), width * height));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// The 1x1 kernel leaving an image unchanged.
    pub fn identity() -> Self {
        Self {
            width: 1,
            height: 1,
            data: vec![1.0],
        }
    }

    /// Divide every weight by the sum of all weights so that the kernel sums to one.
    ///
    /// # Errors
    ///
    /// [`ImgprocError::DegenerateNormalization`] if the weights sum to zero (or to a
    /// non-finite value).
    pub fn normalized(mut self) -> Result<Self, ImgprocError> {
        let norm = self.sum();
        if norm == 0.0 || !norm.is_finite() {
            return Err(ImgprocError::DegenerateNormalization);
        }
        self.data.iter_mut().for_each(|w| *w /= norm);
        Ok(self)
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Horizontal offset of the kernel center.
    pub fn radius_x(&self) -> usize {
        self.width / 2
    }

    /// Vertical offset of the kernel center.
    pub fn radius_y(&self) -> usize {
        self.height / 2
    }

    /// Weight at column `i` and row `j`, `None` if outside the kernel.
    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        if i >= self.width || j >= self.height {
            return None;
        }
        Some(self.data[j * self.width + i])
    }

    /// The weights, row-major.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Sum of all the weights.
    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }

    /// The kernel with rows and columns swapped.
    pub fn transposed(&self) -> Kernel {
        let data = (0..self.width)
            .flat_map(|i| (0..self.height).map(move |j| self.data[j * self.width + i]))
            .collect();
        Kernel {
            width: self.height,
            height: self.width,
            data,
        }
    }
}

/// Truncation radius of a Gaussian kernel following the 3-sigma rule.
///
/// Saturates at `usize::MAX` for huge sigmas, the kernel constructors reject
/// radii whose support cannot be allocated.
pub fn gaussian_radius(sigma: f32) -> usize {
    (3.0 * sigma).round().max(0.0) as usize
}

/// Number of samples `2 * radius + 1` of a kernel axis.
fn support_size(sigma: f32, radius: usize) -> Result<usize, ImgprocError> {
    radius
        .checked_mul(2)
        .and_then(|r| r.checked_add(1))
        .ok_or_else(|| {
            ImgprocError::InvalidParameter(
                "sigma",
                format!("kernel radius {radius} for sigma {sigma} is not representable"),
            )
        })
}

/// Sampled `exp(-x^2 / (2 sigma^2))` over `[-radius, radius]`, unnormalized.
fn gaussian_samples(sigma: f32, radius: usize) -> Result<Vec<f32>, ImgprocError> {
    let size = support_size(sigma, radius)?;
    let sigma_sq_2 = 2.0 * sigma * sigma;

    let mut samples = Vec::new();
    samples.try_reserve_exact(size).map_err(|e| {
        ImgprocError::InvalidParameter("sigma", format!("kernel of {size} samples: {e}"))
    })?;
    samples.extend((0..size).map(|i| {
        let x = i as f32 - radius as f32;
        (-(x * x) / sigma_sq_2).exp()
    }));

    Ok(samples)
}

/// Create a normalized 1D gaussian kernel of `2 * radius + 1` columns and one row.
///
/// A zero `sigma` yields the identity kernel. The 2D gaussian of the same
/// parameters is the outer product of this kernel with its transpose.
///
/// # Errors
///
/// If `sigma` is negative or not finite, or the support is not representable.
pub fn gaussian_kernel_1d_with_radius(sigma: f32, radius: usize) -> Result<Kernel, ImgprocError> {
    validate_sigma(sigma)?;
    if sigma == 0.0 {
        return Ok(Kernel::identity());
    }

    let samples = gaussian_samples(sigma, radius)?;
    Kernel::new(samples.len(), 1, samples)?.normalized()
}

/// Create a normalized 2D gaussian kernel with a `round(3 * sigma)` radius.
///
/// # Arguments
///
/// * `sigma` - The standard deviation of the gaussian.
///
/// # Errors
///
/// If `sigma` is negative or not finite.
///
/// # Example
///
/// ```
/// use scalespace_imgproc::filter::kernels::gaussian_kernel_2d;
///
/// let kernel = gaussian_kernel_2d(1.0).unwrap();
/// assert_eq!(kernel.width(), 7);
/// assert!((kernel.sum() - 1.0).abs() < 1e-5);
/// ```
pub fn gaussian_kernel_2d(sigma: f32) -> Result<Kernel, ImgprocError> {
    validate_sigma(sigma)?;
    gaussian_kernel_2d_with_radius(sigma, gaussian_radius(sigma))
}

/// Create a normalized 2D gaussian kernel of size `(2 * radius + 1)^2`.
///
/// The samples are `exp(-(x^2 + y^2) / (2 sigma^2))`; the analytic normalization
/// constant is dropped since the kernel is divided by the sum of its samples.
/// A zero `sigma` yields the identity kernel.
///
/// # Arguments
///
/// * `sigma` - The standard deviation of the gaussian.
/// * `radius` - The half size of the kernel support.
///
/// # Errors
///
/// If `sigma` is negative or not finite, or the support cannot be allocated.
pub fn gaussian_kernel_2d_with_radius(sigma: f32, radius: usize) -> Result<Kernel, ImgprocError> {
    validate_sigma(sigma)?;
    if sigma == 0.0 {
        return Ok(Kernel::identity());
    }

    let samples = gaussian_samples(sigma, radius)?;
    let size = samples.len();
    let len = size.checked_mul(size).ok_or_else(|| {
        ImgprocError::InvalidParameter(
            "sigma",
            format!("a {size}x{size} kernel for sigma {sigma} is not representable"),
        )
    })?;

    // exp(-(x^2 + y^2) / 2s^2) = exp(-x^2 / 2s^2) * exp(-y^2 / 2s^2)
    let mut data = Vec::new();
    data.try_reserve_exact(len).map_err(|e| {
        ImgprocError::InvalidParameter("sigma", format!("kernel of {len} samples: {e}"))
    })?;
    data.extend(
        samples
            .iter()
            .flat_map(|&wy| samples.iter().map(move |&wx| wx * wy)),
    );

    Kernel::new(size, size, data)?.normalized()
}

/// The 3x3 discrete Laplacian `[[0, 1, 0], [1, -4, 1], [0, 1, 0]]`.
pub fn laplacian_kernel() -> Kernel {
    Kernel {
        width: 3,
        height: 3,
        data: vec![0.0, 1.0, 0.0, 1.0, -4.0, 1.0, 0.0, 1.0, 0.0],
    }
}

/// The horizontal central difference `[-1, 0, 1]` (3 columns, 1 row).
pub fn gradient_kernel_x() -> Kernel {
    Kernel {
        width: 3,
        height: 1,
        data: vec![-1.0, 0.0, 1.0],
    }
}

/// The vertical central difference `[-1, 0, 1]` (1 column, 3 rows).
pub fn gradient_kernel_y() -> Kernel {
    Kernel {
        width: 1,
        height: 3,
        data: vec![-1.0, 0.0, 1.0],
    }
}

fn validate_sigma(sigma: f32) -> Result<(), ImgprocError> {
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(ImgprocError::InvalidParameter(
            "sigma",
            format!("must be finite and >= 0, got {sigma}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_kernel_new() -> Result<(), ImgprocError> {
        let kernel = Kernel::new(3, 1, vec![1.0, 2.0, 3.0])?;
        assert_eq!(kernel.radius_x(), 1);
        assert_eq!(kernel.radius_y(), 0);
        assert_eq!(kernel.get(2, 0), Some(3.0));
        assert_eq!(kernel.get(0, 1), None);

        assert_eq!(
            Kernel::new(2, 2, vec![1.0]),
            Err(ImgprocError::LengthMismatch(1, 4))
        );
        assert!(matches!(
            Kernel::new(0, 3, vec![]),
            Err(ImgprocError::InvalidParameter(..))
        ));
        Ok(())
    }

    #[test]
    fn test_kernel_normalized() -> Result<(), ImgprocError> {
        let kernel = Kernel::new(2, 1, vec![1.0, 3.0])?.normalized()?;
        assert_eq!(kernel.as_slice(), &[0.25, 0.75]);

        assert_eq!(
            laplacian_kernel().normalized(),
            Err(ImgprocError::DegenerateNormalization)
        );
        Ok(())
    }

    #[test]
    fn test_gaussian_kernel_2d_sums_to_one() -> Result<(), ImgprocError> {
        for sigma in [0.3f32, 0.5, 1.0, 1.4142135, 2.0, 3.7] {
            let kernel = gaussian_kernel_2d(sigma)?;
            assert_eq!(kernel.width(), 2 * gaussian_radius(sigma) + 1);
            assert_eq!(kernel.width(), kernel.height());
            assert_relative_eq!(kernel.sum(), 1.0, epsilon = 1e-5);
        }
        Ok(())
    }

    #[test]
    fn test_gaussian_kernel_2d_values() -> Result<(), ImgprocError> {
        let kernel = gaussian_kernel_2d_with_radius(1.0, 1)?;
        let e = (-0.5f32).exp();
        let c = (-1.0f32).exp();
        let norm = 1.0 + 4.0 * e + 4.0 * c;
        let at = |i, j| kernel.get(i, j).unwrap_or_default();
        assert_relative_eq!(at(1, 1), 1.0 / norm, epsilon = 1e-6);
        assert_relative_eq!(at(0, 1), e / norm, epsilon = 1e-6);
        assert_relative_eq!(at(2, 2), c / norm, epsilon = 1e-6);
        Ok(())
    }

    #[test]
    fn test_gaussian_kernel_2d_zero_sigma() -> Result<(), ImgprocError> {
        assert_eq!(gaussian_kernel_2d(0.0)?, Kernel::identity());
        assert_eq!(gaussian_kernel_2d_with_radius(0.0, 4)?, Kernel::identity());
        Ok(())
    }

    #[test]
    fn test_gaussian_kernel_2d_invalid_sigma() {
        assert!(matches!(
            gaussian_kernel_2d(-1.0),
            Err(ImgprocError::InvalidParameter("sigma", _))
        ));
        assert!(gaussian_kernel_2d(f32::NAN).is_err());
    }

    #[test]
    fn test_gaussian_kernel_huge_sigma_is_an_error() {
        for result in [
            gaussian_kernel_2d(1e20),
            gaussian_kernel_1d_with_radius(1.0, usize::MAX),
            gaussian_kernel_2d_with_radius(1.0, usize::MAX / 2),
        ] {
            assert!(matches!(
                result,
                Err(ImgprocError::InvalidParameter("sigma", _))
            ));
        }
    }

    #[test]
    fn test_gaussian_kernel_1d() -> Result<(), ImgprocError> {
        let kernel = gaussian_kernel_1d_with_radius(1.0, 2)?;
        assert_eq!(kernel.width(), 5);
        assert_eq!(kernel.height(), 1);
        assert_relative_eq!(kernel.sum(), 1.0, epsilon = 1e-6);
        assert_eq!(kernel.get(0, 0), kernel.get(4, 0));

        let column = kernel.transposed();
        assert_eq!(column.width(), 1);
        assert_eq!(column.height(), 5);
        assert_eq!(column.as_slice(), kernel.as_slice());

        assert_eq!(gaussian_kernel_1d_with_radius(0.0, 3)?, Kernel::identity());
        Ok(())
    }

    #[test]
    fn test_gaussian_kernel_2d_is_outer_product() -> Result<(), ImgprocError> {
        let k1 = gaussian_kernel_1d_with_radius(1.5, 3)?;
        let k2 = gaussian_kernel_2d_with_radius(1.5, 3)?;
        for j in 0..7 {
            for i in 0..7 {
                assert_relative_eq!(
                    k2.get(i, j).unwrap_or_default(),
                    k1.get(i, 0).unwrap_or_default() * k1.get(j, 0).unwrap_or_default(),
                    epsilon = 1e-6
                );
            }
        }
        Ok(())
    }

    #[test]
    fn test_fixed_kernels() {
        assert_eq!(laplacian_kernel().sum(), 0.0);
        assert_eq!(gradient_kernel_x().width(), 3);
        assert_eq!(gradient_kernel_x().height(), 1);
        assert_eq!(gradient_kernel_y().width(), 1);
        assert_eq!(gradient_kernel_y().height(), 3);
    }
}
