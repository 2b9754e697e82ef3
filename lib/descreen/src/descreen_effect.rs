//! Apply the spectral filter to the color channels of an image.

use crate::{
    COLOR_CHANNELS, DescreenResult, Effect, radial::radial_weights,
    spectral_filter::SpectralFilter, to_sample, validate_image,
};
use image::{ImageBuffer, Pixel};
use ndarray::Array2;

/// Copy channel `index` of every pixel into a `height x width` matrix.
pub fn extract_channel<P>(image: &ImageBuffer<P, Vec<u8>>, index: usize) -> Array2<f64>
where
    P: Pixel<Subpixel = u8>,
{
    let (width, height) = image.dimensions();
    Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
        image.get_pixel(x as u32, y as u32).channels()[index] as f64
    })
}

/// Write `channel` back into channel `index`, clipped to `[0, 255]` and rounded.
pub fn store_channel<P>(image: &mut ImageBuffer<P, Vec<u8>>, index: usize, channel: &Array2<f64>)
where
    P: Pixel<Subpixel = u8>,
{
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        pixel.channels_mut()[index] = to_sample(channel[[y as usize, x as usize]]);
    }
}

impl Effect for SpectralFilter {
    fn apply<P>(&self, image: &mut ImageBuffer<P, Vec<u8>>) -> DescreenResult<()>
    where
        P: Pixel<Subpixel = u8> + 'static,
    {
        validate_image("descreen", image)?;

        let (width, height) = image.dimensions();
        let (rows, cols) = (height as usize, width as usize);

        let weights = radial_weights(rows, cols);
        for index in 0..COLOR_CHANNELS {
            log::debug!("descreen channel {index} of {width}x{height}");
            let channel = extract_channel(image, index);
            let filtered = self.filter_channel(&channel, &weights)?;
            store_channel(image, index, &filtered);
        }

        Ok(())
    }
}
