use argh::FromArgs;
use std::path::PathBuf;

use scalespace::{
    image::Image,
    imgproc::{
        draw::{draw_blobs, BLOB_COLOR},
        features::{detect_blobs, BlobDetectorConfig},
        pyramid::ScaleSpaceConfig,
    },
    io::functional::{read_image_any_mono8, write_image_png_rgb8},
};

/// Detect blobs on an image with the scale normalized Laplacian.
#[derive(FromArgs)]
struct Args {
    /// path to the image to detect blobs on
    #[argh(option)]
    image_path: PathBuf,

    /// sigma of the finest scale
    #[argh(option, default = "1.0")]
    sigma: f32,

    /// number of scales
    #[argh(option, default = "5")]
    num_scales: usize,

    /// minimum absolute response of a blob, in intensity units
    #[argh(option, default = "10.0")]
    threshold: f32,

    /// ratio between consecutive sigmas
    #[argh(option, default = "std::f32::consts::SQRT_2")]
    growth: f32,

    /// path of the output image
    #[argh(option, default = "PathBuf::from(\"blobs.png\")")]
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args: Args = argh::from_env();

    // read the image and keep intensities in [0, 255]
    let img_gray8 = read_image_any_mono8(&args.image_path)?;
    let img_gray_f32 = img_gray8.cast::<f32>()?;

    let config = BlobDetectorConfig::default()
        .with_scale_space(
            ScaleSpaceConfig::default()
                .with_sigma0(args.sigma)
                .with_num_scales(args.num_scales)
                .with_growth(args.growth),
        )
        .with_threshold(args.threshold);

    let blobs = detect_blobs(&img_gray_f32, &config)?;
    log::info!("Found {} blobs", blobs.len());

    // draw the blobs over the gray image
    let mut canvas: Image<u8, 3> = img_gray8.to_channels()?;
    draw_blobs(&mut canvas, &blobs, BLOB_COLOR);
    write_image_png_rgb8(&args.output, &canvas)?;

    log::info!("Saved {}", args.output.display());

    Ok(())
}
