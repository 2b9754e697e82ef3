//! Descreen, resize and contrast, chained according to one configuration.

use crate::{
    DescreenResult, Effect, contrast_effect::ContrastConfig, resize_effect::ResizeConfig,
    spectral_filter::SpectralFilter, validate_channels, validate_image,
};
use derivative::Derivative;
use derive_setters::Setters;
use image::{DynamicImage, ImageBuffer, Pixel};

#[derive(Debug, Clone, PartialEq, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct PostprocessConfig {
    #[derivative(Default(value = "true"))]
    pub apply_filter: bool,

    #[derivative(Default(value = "92.0"))]
    pub threshold: f64,

    #[derivative(Default(value = "6"))]
    pub dilation_radius: u32,

    #[derivative(Default(value = "4"))]
    pub middle_ratio: u32,

    /// Longest output side, zero or less disables resizing.
    #[derivative(Default(value = "1024.0"))]
    pub target_length: f64,

    /// 1.0 disables the contrast stage.
    #[derivative(Default(value = "1.05"))]
    pub contrast_factor: f64,
}

impl PostprocessConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// A configuration that leaves every image untouched.
    pub fn identity() -> Self {
        Self::default()
            .with_apply_filter(false)
            .with_target_length(0.0)
            .with_contrast_factor(1.0)
    }

    pub fn filter(&self) -> SpectralFilter {
        SpectralFilter::new()
            .with_threshold(self.threshold)
            .with_dilation_radius(self.dilation_radius)
            .with_middle_ratio(self.middle_ratio)
    }

    pub fn resize(&self) -> ResizeConfig {
        ResizeConfig::new().with_target_length(self.target_length)
    }

    pub fn contrast(&self) -> ContrastConfig {
        ContrastConfig::new().with_factor(self.contrast_factor)
    }

    /// Enabled stages in the order they run.
    pub fn stages(&self) -> Vec<PostprocessStage> {
        let mut stages = Vec::with_capacity(3);

        if self.apply_filter {
            stages.push(PostprocessStage::Descreen(self.filter()));
        }

        let resize = self.resize();
        if resize.is_enabled() {
            stages.push(PostprocessStage::Resize(resize));
        }

        let contrast = self.contrast();
        if contrast.is_enabled() {
            stages.push(PostprocessStage::Contrast(contrast));
        }

        stages
    }
}

#[derive(Debug, Clone)]
pub enum PostprocessStage {
    Descreen(SpectralFilter),
    Resize(ResizeConfig),
    Contrast(ContrastConfig),
}

impl PostprocessStage {
    pub fn name(&self) -> &'static str {
        match self {
            PostprocessStage::Descreen(_) => "descreen",
            PostprocessStage::Resize(_) => "resize",
            PostprocessStage::Contrast(_) => "contrast",
        }
    }
}

impl Effect for PostprocessStage {
    fn apply<P>(&self, image: &mut ImageBuffer<P, Vec<u8>>) -> DescreenResult<()>
    where
        P: Pixel<Subpixel = u8> + 'static,
    {
        match self {
            PostprocessStage::Descreen(config) => config.apply(image),
            PostprocessStage::Resize(config) => config.apply(image),
            PostprocessStage::Contrast(config) => config.apply(image),
        }
    }
}

/// Run every enabled stage over an 8-bit RGB or RGBA buffer.
pub fn postprocess_buffer<P>(
    mut image: ImageBuffer<P, Vec<u8>>,
    config: &PostprocessConfig,
) -> DescreenResult<ImageBuffer<P, Vec<u8>>>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    validate_image("postprocess", &image)?;

    for stage in config.stages() {
        log::debug!("postprocess stage: {}", stage.name());
        stage.apply(&mut image)?;
    }

    Ok(image)
}

/// Run every enabled stage over a decoded image.
///
/// 8-bit RGB and RGBA are processed as they are. Other layouts with at least
/// three channels are converted to 8-bit RGB or RGBA first, keeping alpha if
/// there is one.
pub fn postprocess(image: DynamicImage, config: &PostprocessConfig) -> DescreenResult<DynamicImage> {
    match image {
        DynamicImage::ImageRgb8(image) => postprocess_buffer(image, config).map(DynamicImage::ImageRgb8),
        DynamicImage::ImageRgba8(image) => postprocess_buffer(image, config).map(DynamicImage::ImageRgba8),
        image => {
            let color = image.color();
            validate_channels("postprocess", color.channel_count())?;

            if color.has_alpha() {
                postprocess_buffer(image.to_rgba8(), config).map(DynamicImage::ImageRgba8)
            } else {
                postprocess_buffer(image.to_rgb8(), config).map(DynamicImage::ImageRgb8)
            }
        }
    }
}
