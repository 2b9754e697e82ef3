use anyhow::Result;
use descreen::{
    Effect, PostprocessConfig,
    descreen_effect::extract_channel,
    postprocess, postprocess_buffer,
    radial::radial_weights,
    resize_effect::ResizeConfig,
    spectral_filter::SpectralFilter,
    spectrum::Spectrum,
};
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::f64::consts::PI;

const SIZE: u32 = 256;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn filter_only() -> PostprocessConfig {
    PostprocessConfig::identity()
        .with_apply_filter(true)
        .with_threshold(92.0)
        .with_dilation_radius(6)
        .with_middle_ratio(4)
}

/// Slowly varying base level, one period across the image on each axis.
fn smooth_base(x: u32, y: u32) -> f64 {
    128.0 + 40.0 * (2.0 * PI * x as f64 / SIZE as f64).cos() + 20.0 * (2.0 * PI * y as f64 / SIZE as f64).cos()
}

fn checker(x: u32, y: u32, amplitude: f64) -> f64 {
    if (x + y) % 2 == 0 { amplitude } else { -amplitude }
}

fn smooth_image() -> RgbImage {
    RgbImage::from_fn(SIZE, SIZE, |x, y| {
        let v = smooth_base(x, y).round() as u8;
        Rgb([v, v.saturating_sub(20), v.saturating_add(10)])
    })
}

fn screened_image() -> RgbImage {
    RgbImage::from_fn(SIZE, SIZE, |x, y| {
        let v = (smooth_base(x, y) + checker(x, y, 32.0)).round() as u8;
        Rgb([v, v, v])
    })
}

fn laplacian_variance(image: &RgbImage) -> f64 {
    let (w, h) = image.dimensions();
    let at = |x: u32, y: u32, c: usize| image.get_pixel(x, y)[c] as f64;

    let mut values = Vec::new();
    for c in 0..3 {
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                let lap = at(x - 1, y, c) + at(x + 1, y, c) + at(x, y - 1, c) + at(x, y + 1, c)
                    - 4.0 * at(x, y, c);
                values.push(lap);
            }
        }
    }

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}

fn mean_intensity(image: &RgbImage) -> f64 {
    image.as_raw().iter().map(|&v| v as f64).sum::<f64>() / image.as_raw().len() as f64
}

#[test]
fn identity_when_every_stage_is_disabled() -> Result<()> {
    init_logger();

    let image = screened_image();
    let out = postprocess_buffer(image.clone(), &PostprocessConfig::identity())?;
    assert_eq!(out, image);

    let rgba = DynamicImage::ImageRgba8(RgbaImage::from_fn(20, 7, |x, y| {
        Rgba([x as u8, y as u8, (x * y) as u8, 200])
    }));
    assert_eq!(postprocess(rgba.clone(), &PostprocessConfig::identity())?, rgba);

    Ok(())
}

#[test]
fn checkerboard_screen_is_suppressed() -> Result<()> {
    init_logger();

    let input = screened_image();
    let output = postprocess_buffer(input.clone(), &filter_only())?;

    let before = laplacian_variance(&input);
    let after = laplacian_variance(&output);
    assert!(after <= 0.5 * before, "laplacian variance {before} -> {after}");

    let (mean_in, mean_out) = (mean_intensity(&input), mean_intensity(&output));
    assert!(
        (mean_out - mean_in).abs() / mean_in < 0.05,
        "mean intensity {mean_in} -> {mean_out}"
    );

    // what is left is the smooth base
    for (x, y, pixel) in output.enumerate_pixels() {
        let expected = smooth_base(x, y);
        assert!((pixel[0] as f64 - expected).abs() <= 2.0, "({x}, {y}): {} vs {expected}", pixel[0]);
    }

    Ok(())
}

#[test]
fn low_frequency_content_survives() -> Result<()> {
    init_logger();

    let input = smooth_image();
    let output = postprocess_buffer(input.clone(), &filter_only())?;

    for (a, b) in input.as_raw().iter().zip(output.as_raw()) {
        assert!(a.abs_diff(*b) <= 1, "{a} vs {b}");
    }

    Ok(())
}

#[test]
fn channels_are_filtered_independently() -> Result<()> {
    init_logger();

    let input = RgbImage::from_fn(SIZE, SIZE, |x, y| {
        let red = (128.0 + checker(x, y, 64.0)) as u8;
        let blue = smooth_base(x, y).round() as u8;
        Rgb([red, 90, blue])
    });
    let output = postprocess_buffer(input.clone(), &filter_only())?;

    // constant green channel comes back as it was
    assert!(output.pixels().all(|p| p[1] == 90));

    // blue equals its own transform round trip
    let blue = extract_channel(&input, 2);
    let round_trip = Spectrum::forward(&blue).inverse();
    for (x, y, pixel) in output.enumerate_pixels() {
        let expected = round_trip[[y as usize, x as usize]].round().clamp(0.0, 255.0) as u8;
        assert_eq!(pixel[2], expected);
    }

    // red lost its checkerboard
    let red_spread = output.pixels().map(|p| p[0].abs_diff(128)).max().unwrap_or(0);
    assert!(red_spread <= 2, "red spread {red_spread}");

    Ok(())
}

#[test]
fn suppression_mask_is_bounded_and_spares_low_frequencies() -> Result<()> {
    init_logger();

    let mut rng = StdRng::seed_from_u64(0x5eed);
    let image = RgbImage::from_fn(64, 48, |_, _| Rgb([rng.random(), rng.random(), rng.random()]));

    let weights = radial_weights(48, 64);
    let filter = SpectralFilter::new().with_threshold(80.0);
    let protected = filter.protected_region(48, 64);

    let mut suppressed = 0;
    for index in 0..3 {
        let spectrum = Spectrum::forward(&extract_channel(&image, index));
        let mask = filter.suppression_mask(&spectrum, &weights)?;

        assert!(mask.iter().all(|m| (0.0..=1.0).contains(m)));
        for ((y, x), &p) in protected.indexed_iter() {
            if p != 0 {
                assert_eq!(mask[[y, x]], 1.0);
            }
        }
        suppressed += mask.iter().filter(|&&m| m < 1.0).count();
    }

    assert!(suppressed > 0, "noise should trigger some suppression");
    Ok(())
}

#[test]
fn extreme_parameters_degrade_without_failing() -> Result<()> {
    init_logger();

    let image = RgbImage::from_fn(12, 5, |x, y| Rgb([(x * 20) as u8, (y * 40) as u8, 7]));
    for config in [
        filter_only().with_threshold(0.0),
        filter_only().with_middle_ratio(0),
        filter_only().with_middle_ratio(1000),
        filter_only().with_dilation_radius(0),
        filter_only().with_dilation_radius(10_000),
    ] {
        let out = postprocess_buffer(image.clone(), &config)?;
        assert_eq!(out.dimensions(), (12, 5));
    }

    Ok(())
}

#[test]
fn resize_to_target_length() -> Result<()> {
    init_logger();

    let image = RgbImage::new(2000, 1000);
    let config = PostprocessConfig::identity().with_target_length(1024.0);
    let out = postprocess_buffer(image, &config)?;
    assert_eq!(out.dimensions(), (1024, 512));

    Ok(())
}

#[test]
fn resize_preserves_aspect_ratio() -> Result<()> {
    init_logger();

    for (w, h, target) in [(640, 480, 200.0), (77, 301, 150.0), (50, 50, 13.0), (1, 90, 45.0)] {
        let mut image = RgbImage::new(w, h);
        let config = ResizeConfig::new().with_target_length(target);
        config.apply(&mut image)?;

        let (nw, nh) = image.dimensions();
        assert_eq!(nw.max(nh), target as u32);

        let ratio = target / w.max(h) as f64;
        assert!((nw as f64 - w as f64 * ratio).abs() <= 1.0);
        assert!((nh as f64 - h as f64 * ratio).abs() <= 1.0);

        let once = image.clone();
        config.apply(&mut image)?;
        assert_eq!(image, once);
    }

    Ok(())
}

#[test]
fn contrast_pivot_comes_from_the_resized_image() -> Result<()> {
    init_logger();

    let image = smooth_image();
    let flat = postprocess_buffer(image.clone(), &PostprocessConfig::identity().with_contrast_factor(1.0))?;
    assert_eq!(flat.as_raw(), image.as_raw());

    let config = PostprocessConfig::identity()
        .with_target_length(64.0)
        .with_contrast_factor(2.0);
    let out = postprocess_buffer(image.clone(), &config)?;
    assert_eq!(out.dimensions(), (64, 64));

    let mut resized = image.clone();
    config.resize().apply(&mut resized)?;
    let mut expected = resized.clone();
    config.contrast().apply(&mut expected)?;
    assert_eq!(out, expected);

    // enhancing first and resizing afterwards gives a different result
    let mut reversed = image;
    config.contrast().apply(&mut reversed)?;
    config.resize().apply(&mut reversed)?;
    assert_ne!(out, reversed);

    Ok(())
}
