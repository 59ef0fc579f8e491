use rayon::prelude::*;
use scalespace_image::Image;

use crate::error::{ensure_same_size, ImgprocError};
use crate::filter::{
    convolve,
    kernels::{gradient_kernel_x, gradient_kernel_y, laplacian_kernel},
};

/// Time step of the explicit flow update.
pub const FLOW_STEP: f32 = 0.2;

/// Diffusivity returned by [`Diffusivity::TotalVariation`] where the gradient vanishes.
pub const TV_DIFFUSIVITY_SENTINEL: f32 = 1e11;

/// Scalar diffusivity as a function of the local gradient magnitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Diffusivity {
    /// Perona-Malik edge stopping function `exp(-s / k)`.
    PeronaMalik {
        /// Gradient magnitude scale.
        k: f32,
    },
    /// Total variation weight `k / s`, [`TV_DIFFUSIVITY_SENTINEL`] at `s == 0`.
    TotalVariation {
        /// Flow weight.
        k: f32,
    },
    /// Gradient independent diffusivity.
    Constant(f32),
}

impl Diffusivity {
    /// Evaluate the diffusivity at gradient magnitude `s`.
    pub fn eval(&self, s: f32) -> f32 {
        match *self {
            Diffusivity::PeronaMalik { k } => (-s / k).exp(),
            Diffusivity::TotalVariation { k } => {
                if s != 0.0 {
                    k / s
                } else {
                    TV_DIFFUSIVITY_SENTINEL
                }
            }
            Diffusivity::Constant(c) => c,
        }
    }
}

/// Evolve an image with the explicit flow `I += 0.2 * div(g(|grad I|) grad I)`.
///
/// Each iteration computes the central difference gradients of the current
/// image, weights them with `g` of the gradient magnitude, takes the divergence
/// with the same difference kernels and adds it scaled by [`FLOW_STEP`]. All
/// convolutions use zero padding, so the gradient is underestimated on the
/// border. The iteration count is the only stopping criterion. Channels are
/// processed independently.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `iterations` - The number of explicit steps.
/// * `diffusivity` - The diffusivity as a function of the gradient magnitude.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn flow_smoothing<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    iterations: usize,
    diffusivity: impl Fn(f32) -> f32 + Send + Sync,
) -> Result<(), ImgprocError> {
    ensure_same_size(src.size(), dst.size())?;

    let kernel_x = gradient_kernel_x();
    let kernel_y = gradient_kernel_y();

    let mut current = src.clone();
    let mut grad_x = Image::<f32, C>::from_size_val(src.size(), 0.0)?;
    let mut grad_y = Image::<f32, C>::from_size_val(src.size(), 0.0)?;
    let mut div_x = Image::<f32, C>::from_size_val(src.size(), 0.0)?;
    let mut div_y = Image::<f32, C>::from_size_val(src.size(), 0.0)?;

    for it in 0..iterations {
        convolve(&current, &mut grad_x, &kernel_x)?;
        convolve(&current, &mut grad_y, &kernel_y)?;

        // weight the gradient with the diffusivity of its magnitude
        grad_x
            .as_slice_mut()
            .par_iter_mut()
            .zip(grad_y.as_slice_mut().par_iter_mut())
            .for_each(|(gx, gy)| {
                let g = diffusivity((*gx * *gx + *gy * *gy).sqrt());
                *gx *= g;
                *gy *= g;
            });

        convolve(&grad_x, &mut div_x, &kernel_x)?;
        convolve(&grad_y, &mut div_y, &kernel_y)?;

        current
            .as_slice_mut()
            .par_iter_mut()
            .zip(div_x.as_slice().par_iter())
            .zip(div_y.as_slice().par_iter())
            .for_each(|((v, &dx), &dy)| {
                *v += FLOW_STEP * (dx + dy);
            });

        log::trace!("flow smoothing iteration {}/{iterations}", it + 1);
    }

    dst.as_slice_mut().copy_from_slice(current.as_slice());

    Ok(())
}

/// Smooth an image with Perona-Malik anisotropic diffusion.
///
/// Runs [`flow_smoothing`] with the diffusivity `exp(-s / k)`: the flow slows
/// down across strong gradients, which preserves edges.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `iterations` - The number of iterations, zero copies `src`.
/// * `k` - The gradient magnitude scale, must be finite and positive.
///
/// # Errors
///
/// If `k` is not finite and strictly positive, or the shapes differ.
///
/// # Example
///
/// ```
/// use scalespace_image::Image;
/// use scalespace_imgproc::diffusion::anisotropic_diffusion;
///
/// let src = Image::<f32, 1>::from_size_val([8, 8].into(), 4.0).unwrap();
/// let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0).unwrap();
///
/// anisotropic_diffusion(&src, &mut dst, 0, 1.0).unwrap();
/// assert_eq!(dst, src);
///
/// assert!(anisotropic_diffusion(&src, &mut dst, 10, 0.0).is_err());
/// ```
pub fn anisotropic_diffusion<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    iterations: usize,
    k: f32,
) -> Result<(), ImgprocError> {
    if !k.is_finite() || k <= 0.0 {
        return Err(ImgprocError::InvalidParameter(
            "k",
            format!("anisotropic diffusion requires a finite k > 0, got {k}"),
        ));
    }

    log::debug!("anisotropic diffusion: {iterations} iterations, k = {k}");
    let diffusivity = Diffusivity::PeronaMalik { k };
    flow_smoothing(src, dst, iterations, |s| diffusivity.eval(s))
}

/// Smooth an image with the total variation flow.
///
/// Runs [`flow_smoothing`] with the diffusivity `k / s`, which performs a
/// steepest descent on the total variation energy. Where the gradient vanishes
/// the diffusivity takes the large [`TV_DIFFUSIVITY_SENTINEL`] value instead of
/// dividing by zero; the weighted gradient there is zero either way.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `iterations` - The number of iterations, zero copies `src`.
/// * `k` - The flow weight, must be finite and non negative.
///
/// # Errors
///
/// If `k` is negative or not finite, or the shapes differ.
pub fn total_variation_flow<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    iterations: usize,
    k: f32,
) -> Result<(), ImgprocError> {
    if !k.is_finite() || k < 0.0 {
        return Err(ImgprocError::InvalidParameter(
            "k",
            format!("total variation flow requires a finite k >= 0, got {k}"),
        ));
    }

    log::debug!("total variation flow: {iterations} iterations, k = {k}");
    let diffusivity = Diffusivity::TotalVariation { k };
    flow_smoothing(src, dst, iterations, |s| diffusivity.eval(s))
}

/// Smooth an image with the linear heat equation `I += step * laplacian(I)`.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `iterations` - The number of explicit steps.
/// * `step` - The time step, must be finite and positive.
///
/// # Errors
///
/// If `step` is not finite and strictly positive, or the shapes differ.
pub fn heat_diffusion<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    iterations: usize,
    step: f32,
) -> Result<(), ImgprocError> {
    if !step.is_finite() || step <= 0.0 {
        return Err(ImgprocError::InvalidParameter(
            "step",
            format!("must be finite and > 0, got {step}"),
        ));
    }
    ensure_same_size(src.size(), dst.size())?;

    log::debug!("heat diffusion: {iterations} iterations, step = {step}");

    let kernel = laplacian_kernel();
    let mut current = src.clone();
    let mut laplacian = Image::<f32, C>::from_size_val(src.size(), 0.0)?;

    for _ in 0..iterations {
        convolve(&current, &mut laplacian, &kernel)?;
        current
            .as_slice_mut()
            .par_iter_mut()
            .zip(laplacian.as_slice().par_iter())
            .for_each(|(v, &l)| *v += step * l);
    }

    dst.as_slice_mut().copy_from_slice(current.as_slice());

    Ok(())
}
