use crate::{COLOR_CHANNELS, DescreenResult, Effect, to_sample, validate_image};
use derivative::Derivative;
use derive_setters::Setters;
use image::{ImageBuffer, Pixel};

/// Contrast adjustment configuration
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct ContrastConfig {
    /// 1.0 keeps the image, larger values spread the samples away from the
    /// mean gray level, smaller values pull them towards it.
    #[derivative(Default(value = "1.05"))]
    pub factor: f64,
}

impl ContrastConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.factor != 1.0
    }
}

/// ITU-R 601-2 luma of an 8-bit RGB triple, in 16.16 fixed point.
#[inline]
fn luma(r: u8, g: u8, b: u8) -> u32 {
    (r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16
}

/// Mean luma of the image rounded to the nearest gray level.
pub fn mean_gray<P>(image: &ImageBuffer<P, Vec<u8>>) -> u8
where
    P: Pixel<Subpixel = u8>,
{
    let count = image.width() as u64 * image.height() as u64;
    if count == 0 {
        return 0;
    }

    let sum: u64 = image
        .pixels()
        .map(|p| {
            let c = p.channels();
            luma(c[0], c[1], c[2]) as u64
        })
        .sum();

    ((sum as f64 / count as f64) + 0.5) as u8
}

impl Effect for ContrastConfig {
    fn apply<P>(&self, image: &mut ImageBuffer<P, Vec<u8>>) -> DescreenResult<()>
    where
        P: Pixel<Subpixel = u8> + 'static,
    {
        validate_image("contrast", image)?;

        if !self.is_enabled() {
            return Ok(());
        }

        // new_color = mean + (old_color - mean) * factor
        let mean = mean_gray(image) as f64;
        log::debug!("contrast factor {} around gray level {mean}", self.factor);

        for pixel in image.pixels_mut() {
            for value in pixel.channels_mut().iter_mut().take(COLOR_CHANNELS) {
                *value = to_sample(mean + (*value as f64 - mean) * self.factor);
            }
        }

        Ok(())
    }
}
