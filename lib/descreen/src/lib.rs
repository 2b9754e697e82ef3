pub mod contrast_effect;
pub mod descreen_effect;
pub mod ellipse;
pub mod postprocess;
pub mod radial;
pub mod resize_effect;
pub mod spectral_filter;
pub mod spectrum;

pub use postprocess::{PostprocessConfig, PostprocessStage, postprocess, postprocess_buffer};

use image::{ImageBuffer, Pixel};

/// Number of color channels touched by the effects. A fourth channel is alpha.
pub const COLOR_CHANNELS: usize = 3;

pub type DescreenResult<T> = Result<T, DescreenError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DescreenError {
    #[error("{stage}: image dimensions must be positive, got {width}x{height}")]
    EmptyImage {
        stage: &'static str,
        width: u32,
        height: u32,
    },
    #[error("{stage}: expected 3 or 4 channels, got {channels}")]
    UnsupportedChannels { stage: &'static str, channels: u8 },
    #[error("{stage}: expected a {expected:?} (rows, cols) matrix, got {actual:?}")]
    DimensionMismatch {
        stage: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },
}

pub trait Effect {
    fn apply<P>(&self, image: &mut ImageBuffer<P, Vec<u8>>) -> DescreenResult<()>
    where
        P: Pixel<Subpixel = u8> + 'static;
}

/// Check that `image` can go through the pipeline at all: both dimensions
/// positive and at least three color channels.
pub fn validate_image<P>(stage: &'static str, image: &ImageBuffer<P, Vec<u8>>) -> DescreenResult<()>
where
    P: Pixel<Subpixel = u8>,
{
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(DescreenError::EmptyImage {
            stage,
            width,
            height,
        });
    }

    validate_channels(stage, P::CHANNEL_COUNT)
}

pub(crate) fn validate_channels(stage: &'static str, channels: u8) -> DescreenResult<()> {
    if !(COLOR_CHANNELS as u8..=4).contains(&channels) {
        return Err(DescreenError::UnsupportedChannels { stage, channels });
    }

    Ok(())
}

/// Round a processed sample back into the 8-bit range.
#[inline]
pub(crate) fn to_sample(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }

    value.round().clamp(0.0, 255.0) as u8
}
