use approx::assert_relative_eq;
use scalespace_image::Image;
use scalespace_imgproc::features::{
    detect_blobs, find_blobs, laplacian_response, laplacian_responses, BlobDetectorConfig,
};
use scalespace_imgproc::pyramid::{build_pyramid, ScaleSpaceConfig};
use scalespace_imgproc::ImgprocError;

/// A bright gaussian spot centered at `(cx, cy)`.
fn gaussian_spot(
    size: usize,
    cx: f32,
    cy: f32,
    sigma: f32,
    amplitude: f32,
) -> Result<Image<f32, 1>, ImgprocError> {
    let data = (0..size * size)
        .map(|i| {
            let (x, y) = ((i % size) as f32, (i / size) as f32);
            let r2 = (x - cx).powi(2) + (y - cy).powi(2);
            amplitude * (-r2 / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    Ok(Image::new([size, size].into(), data)?)
}

#[test]
fn test_responses_match_per_level_computation() -> Result<(), ImgprocError> {
    let image = Image::<f32, 1>::new(
        [20, 16].into(),
        (0..320).map(|i| ((i * 37) % 101) as f32).collect(),
    )?;

    let levels = build_pyramid(&image, 1.0, 4)?;
    let responses = laplacian_responses(&levels)?;
    assert_eq!(responses.len(), levels.len());

    for (level, response) in levels.iter().zip(&responses) {
        let mut expected = Image::from_size_val(image.size(), 0.0)?;
        laplacian_response(&level.image, &mut expected, level.sigma)?;
        assert_eq!(response, &expected);
    }
    Ok(())
}

#[test]
fn test_detect_gaussian_spot() -> Result<(), ImgprocError> {
    let image = gaussian_spot(64, 32.0, 32.0, 3.0, 255.0)?;

    let config = BlobDetectorConfig::default()
        .with_scale_space(
            ScaleSpaceConfig::default()
                .with_sigma0(1.0)
                .with_num_scales(7),
        )
        .with_threshold(1.0);
    let blobs = detect_blobs(&image, &config)?;

    // the strongest normalized response of a spot sits near its own sigma
    let center = blobs.iter().find(|b| b.x == 32 && b.y == 32);
    assert!(
        matches!(center, Some(b) if b.scale > 2.0 && b.scale < 4.0),
        "no blob at the spot center: {blobs:?}"
    );

    for blob in &blobs {
        assert!(blob.x < 64 && blob.y < 64);
    }
    assert!(blobs.windows(2).all(|w| w[0] <= w[1]));
    Ok(())
}

#[test]
fn test_find_blobs_on_pyramid_responses() -> Result<(), ImgprocError> {
    let image = gaussian_spot(48, 20.0, 24.0, 2.0, 100.0)?;

    let levels = build_pyramid(&image, 1.0, 5)?;
    let responses = laplacian_responses(&levels)?;
    let sigmas = levels.iter().map(|l| l.sigma).collect::<Vec<_>>();

    let blobs = find_blobs(&responses, &sigmas, 1.0)?;
    assert!(blobs.iter().any(|b| b.x == 20 && b.y == 24));

    // every reported blob lies on an interior scale
    for blob in &blobs {
        assert!(blob.scale > sigmas[0] && blob.scale < sigmas[4]);
    }

    // a higher threshold only removes blobs
    let strong = find_blobs(&responses, &sigmas, 10.0)?;
    assert!(strong.len() <= blobs.len());
    assert!(strong.iter().all(|b| blobs.contains(b)));
    Ok(())
}

#[test]
fn test_flat_image_has_no_interior_blobs() -> Result<(), ImgprocError> {
    let image = Image::<f32, 1>::from_size_val([24, 24].into(), 0.0)?;
    let blobs = detect_blobs(&image, &BlobDetectorConfig::default().with_threshold(0.0))?;
    assert!(blobs.is_empty());

    let levels = build_pyramid(&image, 1.0, 3)?;
    for response in laplacian_responses(&levels)? {
        for &v in response.as_slice() {
            assert_relative_eq!(v, 0.0);
        }
    }
    Ok(())
}
