use crate::{DescreenResult, Effect, validate_image};
use derivative::Derivative;
use derive_setters::Setters;
use image::{ImageBuffer, Pixel, imageops::FilterType};

/// Scale an image so that its longest side becomes `target_length`.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct ResizeConfig {
    /// Length of the longest output side. Zero or less keeps the image as is.
    #[derivative(Default(value = "1024.0"))]
    pub target_length: f64,
}

impl ResizeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.target_length > 0.0
    }
}

/// Output size for a `width x height` image whose longest side should become
/// `target_length`. One ratio scales both axes, each side is at least 1.
pub fn fit_dimensions(width: u32, height: u32, target_length: f64) -> (u32, u32) {
    let longest = width.max(height).max(1) as f64;
    let ratio = target_length / longest;
    let scale = |side: u32| (side as f64 * ratio).round().clamp(1.0, u32::MAX as f64) as u32;

    (scale(width), scale(height))
}

impl Effect for ResizeConfig {
    fn apply<P>(&self, image: &mut ImageBuffer<P, Vec<u8>>) -> DescreenResult<()>
    where
        P: Pixel<Subpixel = u8> + 'static,
    {
        validate_image("resize", image)?;

        if !self.is_enabled() {
            return Ok(());
        }

        let (width, height) = image.dimensions();
        let (new_width, new_height) = fit_dimensions(width, height, self.target_length);
        if (new_width, new_height) == (width, height) {
            return Ok(());
        }

        log::debug!("resize {width}x{height} -> {new_width}x{new_height}");
        *image = image::imageops::resize(&*image, new_width, new_height, FilterType::CatmullRom);

        Ok(())
    }
}
