/// Descreen a synthetic halftone-like image
/// Writes the input and the filtered output for a few thresholds

use descreen::{PostprocessConfig, postprocess_buffer};
use image::{Rgb, RgbImage};
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let output_dir = Path::new("tmp");
    std::fs::create_dir_all(output_dir)?;

    // smooth color ramp with a 2px checkerboard on top
    let img = RgbImage::from_fn(512, 384, |x, y| {
        let screen = if (x + y) % 2 == 0 { 24 } else { -24 };
        let r = (60 + x * 140 / 512) as i32 + screen;
        let g = (60 + y * 140 / 384) as i32 + screen;
        let b = 120 + screen;
        Rgb([r as u8, g as u8, b as u8])
    });
    img.save(output_dir.join("checkerboard_input.png"))?;

    for threshold in [80.0, 92.0, 110.0] {
        let config = PostprocessConfig::identity()
            .with_apply_filter(true)
            .with_threshold(threshold);

        let filtered = postprocess_buffer(img.clone(), &config)?;

        let filename = format!("checkerboard_t{threshold}.png");
        filtered.save(output_dir.join(&filename))?;
        println!("✓ Generated {}", filename);
    }

    println!("\n✓ All descreen outputs generated!");
    println!("  Images saved to: tmp/");

    Ok(())
}
