use argh::FromArgs;
use std::{path::PathBuf, str::FromStr};

use scalespace::{
    image::{
        ops::{cast_and_scale, saturate_cast_u8},
        Image, ImageSize,
    },
    imgproc::{
        crop::crop_image,
        diffusion::{anisotropic_diffusion, heat_diffusion, total_variation_flow},
        normalize::normalize_min_max,
        filter::{gaussian_blur, gaussian_blur_with_radius},
        profile::{intensity_profile, ProfileAxis},
    },
    io::functional::{read_image_any_mono8, write_image_png_mono8},
};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Method {
    Gaussian,
    Anisotropic,
    TotalVariation,
    Heat,
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gaussian" => Ok(Method::Gaussian),
            "anisotropic" => Ok(Method::Anisotropic),
            "tv" => Ok(Method::TotalVariation),
            "heat" => Ok(Method::Heat),
            _ => Err(format!(
                "unknown method {s}, expected gaussian, anisotropic, tv or heat"
            )),
        }
    }
}

/// Region of interest given as `x,y,width,height`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Window {
    x: usize,
    y: usize,
    size: ImageSize,
}

impl FromStr for Window {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|v| v.trim().parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("invalid window {s}: {e}"))?;
        match values[..] {
            [x, y, width, height] => Ok(Window {
                x,
                y,
                size: ImageSize { width, height },
            }),
            _ => Err(format!("invalid window {s}, expected x,y,width,height")),
        }
    }
}

/// Load the image as floats in [0, 255], cropped to `window` if any.
fn load_input(
    img_gray8: &Image<u8, 1>,
    window: Option<Window>,
) -> Result<Image<f32, 1>, Box<dyn std::error::Error>> {
    let mut full = Image::<f32, 1>::from_size_val(img_gray8.size(), 0.0)?;
    cast_and_scale(img_gray8, &mut full, 1.0)?;

    let Some(window) = window else {
        return Ok(full);
    };
    let mut cropped = Image::<f32, 1>::from_size_val(window.size, 0.0)?;
    crop_image(&full, &mut cropped, window.x, window.y)?;
    Ok(cropped)
}

/// Convert the smoothed image to 8 bits, stretching it to [0, 255] if asked.
fn to_mono8(
    smoothed: &Image<f32, 1>,
    normalize: bool,
) -> Result<Image<u8, 1>, Box<dyn std::error::Error>> {
    let mut out = Image::<u8, 1>::from_size_val(smoothed.size(), 0)?;
    if normalize {
        let mut stretched = Image::<f32, 1>::from_size_val(smoothed.size(), 0.0)?;
        normalize_min_max(smoothed, &mut stretched, 0.0, 255.0)?;
        saturate_cast_u8(&stretched, &mut out)?;
    } else {
        saturate_cast_u8(smoothed, &mut out)?;
    }
    Ok(out)
}

/// Smooth an image with a gaussian filter or an explicit diffusion flow.
#[derive(FromArgs)]
struct Args {
    /// path to the image to smooth
    #[argh(option)]
    image_path: PathBuf,

    /// smoothing method: gaussian, anisotropic, tv or heat
    #[argh(option)]
    method: Method,

    /// sigma of the gaussian filter
    #[argh(option, default = "2.0")]
    sigma: f32,

    /// radius of the gaussian kernel, defaults to round(3 * sigma)
    #[argh(option)]
    radius: Option<usize>,

    /// diffusivity parameter of the anisotropic and tv flows
    #[argh(option, default = "5.0")]
    k: f32,

    /// number of flow iterations
    #[argh(option, default = "10")]
    iterations: usize,

    /// time step of the heat equation
    #[argh(option, default = "0.2")]
    step: f32,

    /// directory to write the smoothed image to
    #[argh(option, default = "PathBuf::from(\".\")")]
    output_dir: PathBuf,

    /// print the intensity profile of this row
    #[argh(option)]
    profile_row: Option<usize>,

    /// print the intensity profile of this column
    #[argh(option)]
    profile_col: Option<usize>,

    /// only process this window, given as x,y,width,height
    #[argh(option)]
    crop: Option<Window>,

    /// stretch the result to the full [0, 255] range before saving
    #[argh(switch)]
    normalize: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args: Args = argh::from_env();

    let profile = match (args.profile_row, args.profile_col) {
        (Some(_), Some(_)) => return Err("--profile-row and --profile-col are exclusive".into()),
        (Some(row), None) => Some((ProfileAxis::Row, row)),
        (None, Some(col)) => Some((ProfileAxis::Column, col)),
        (None, None) => None,
    };

    let img_gray8 = read_image_any_mono8(&args.image_path)?;
    let src = load_input(&img_gray8, args.crop)?;
    let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;

    let params = match args.method {
        Method::Gaussian => match args.radius {
            Some(radius) => {
                gaussian_blur_with_radius(&src, &mut dst, args.sigma, radius)?;
                format!("gaussian_Sigma_{}_Radius_{}", args.sigma, radius)
            }
            None => {
                gaussian_blur(&src, &mut dst, args.sigma)?;
                format!("gaussian_Sigma_{}", args.sigma)
            }
        },
        Method::Anisotropic => {
            anisotropic_diffusion(&src, &mut dst, args.iterations, args.k)?;
            format!("anisotropic_Iter_{}_K_{}", args.iterations, args.k)
        }
        Method::TotalVariation => {
            total_variation_flow(&src, &mut dst, args.iterations, args.k)?;
            format!("tv_Iter_{}_K_{}", args.iterations, args.k)
        }
        Method::Heat => {
            heat_diffusion(&src, &mut dst, args.iterations, args.step)?;
            format!("heat_Iter_{}_Step_{}", args.iterations, args.step)
        }
    };

    let out = to_mono8(&dst, args.normalize)?;

    let stem = args
        .image_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    std::fs::create_dir_all(&args.output_dir)?;
    let output_path = args.output_dir.join(format!("{params}_{stem}.png"));
    write_image_png_mono8(&output_path, &out)?;
    log::info!("Saved {}", output_path.display());

    if let Some((axis, index)) = profile {
        let raw = intensity_profile(&src, axis, index, 0)?;
        let smoothed = intensity_profile(&dst, axis, index, 0)?;
        println!("index,raw,smoothed");
        for (i, (r, s)) in raw.iter().zip(&smoothed).enumerate() {
            println!("{i},{r},{s}");
        }
    }

    Ok(())
}
