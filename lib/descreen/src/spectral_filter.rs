//! Per-channel frequency-domain descreening.
//!
//! A halftone or screen pattern shows up as isolated, strong peaks away from
//! the center of the magnitude spectrum. The filter finds those peaks with a
//! radially corrected threshold, grows them into soft blobs and attenuates the
//! spectrum there, while an elliptical region around the zero frequency is
//! left alone.

use crate::{
    DescreenError, DescreenResult,
    ellipse::{ellipse, place},
    spectrum::Spectrum,
};
use derivative::Derivative;
use derive_setters::Setters;
use image::{GrayImage, ImageBuffer, Luma};
use imageproc::{filter::gaussian_blur_f32, morphology::Mask};
use ndarray::Array2;

/// Scale applied to `ln(magnitude * weight)` before thresholding.
pub const LOG_SCALE: f64 = 20.0;

/// Blur sigma is `dilation_radius / BLUR_SIGMA_DIVISOR`.
pub const BLUR_SIGMA_DIVISOR: f64 = 3.0;

/// `imageproc` masks are limited to 511x511 with a `u8` center.
const MAX_DILATION_RADIUS: u32 = 255;

const SUPPRESSED: u8 = 255;

/// `gaussian_blur_f32` rejects a zero sigma.
const MIN_BLUR_SIGMA: f32 = 1e-3;

#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct SpectralFilter {
    /// Cutoff for the weighted log magnitude spectrum.
    #[derivative(Default(value = "92.0"))]
    pub threshold: f64,

    /// Radius in pixels used to grow the suppressed peaks.
    #[derivative(Default(value = "6"))]
    pub dilation_radius: u32,

    /// The protected low-frequency ellipse spans `1 / middle_ratio` of each
    /// spectrum axis.
    #[derivative(Default(value = "4"))]
    pub middle_ratio: u32,

    #[derivative(Default(value = "LOG_SCALE"))]
    pub log_scale: f64,

    #[derivative(Default(value = "BLUR_SIGMA_DIVISOR"))]
    pub blur_sigma_divisor: f64,
}

impl SpectralFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dilation radius actually used for a `rows x cols` spectrum.
    pub fn effective_radius(&self, rows: usize, cols: usize) -> u32 {
        let limit = ((rows.min(cols).saturating_sub(1) / 2) as u32).clamp(1, MAX_DILATION_RADIUS);
        self.dilation_radius.clamp(1, limit)
    }

    /// Half-axes `(w, h)` of the protected ellipse for a `rows x cols` spectrum.
    pub fn protected_axes(&self, rows: usize, cols: usize) -> (u32, u32) {
        let mid = 2 * self.middle_ratio.max(1) as usize;
        let axis = |len: usize| {
            let limit = (len.saturating_sub(1) / 2).max(1);
            (len / mid).clamp(1, limit) as u32
        };

        (axis(cols), axis(rows))
    }

    /// Binary stencil of the low frequencies that are never suppressed.
    pub fn protected_region(&self, rows: usize, cols: usize) -> Array2<u8> {
        let (ew, eh) = self.protected_axes(rows, cols);
        let top = (rows as isize - 2 * eh as isize).div_euclid(2);
        let left = (cols as isize - 2 * ew as isize).div_euclid(2);

        place(&ellipse(ew, eh), rows, cols, top, left)
    }

    /// Weighted log magnitude, `max(0, log_scale * ln(|F| * weight))`.
    pub fn log_spectrum(&self, spectrum: &Spectrum, weights: &Array2<f64>) -> DescreenResult<Array2<f64>> {
        check_dim("log spectrum", spectrum.dim(), weights.dim())?;

        let mut out = spectrum.magnitude();
        out.zip_mut_with(weights, |m, &w| {
            let value = self.log_scale * (*m * w).ln();
            *m = if value.is_nan() { 0.0 } else { value.max(0.0) };
        });

        Ok(out)
    }

    /// Multiplicative suppression mask in `[0, 1]`, 0 where the spectrum is
    /// removed and 1 where it is kept.
    pub fn suppression_mask(&self, spectrum: &Spectrum, weights: &Array2<f64>) -> DescreenResult<Array2<f64>> {
        let (rows, cols) = spectrum.dim();
        let log_spectrum = self.log_spectrum(spectrum, weights)?;
        if rows == 0 || cols == 0 {
            return Ok(Array2::ones((rows, cols)));
        }

        let protected = self.protected_region(rows, cols);

        let candidates = GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
            let (y, x) = (y as usize, x as usize);
            if log_spectrum[[y, x]] > self.threshold && protected[[y, x]] == 0 {
                Luma([SUPPRESSED])
            } else {
                Luma([0])
            }
        });

        let radius = self.effective_radius(rows, cols);
        if radius != self.dilation_radius {
            log::warn!(
                "dilation radius {} is out of range for a {cols}x{rows} spectrum, using {radius}",
                self.dilation_radius
            );
        }
        if self.middle_ratio == 0 {
            log::warn!("middle ratio 0 is treated as 1");
        }

        let footprint = ellipse(radius, radius);
        let kernel = GrayImage::from_fn(2 * radius + 1, 2 * radius + 1, |x, y| {
            Luma([footprint[[y as usize, x as usize]] * SUPPRESSED])
        });
        let mask = Mask::from_image(&kernel, radius as u8, radius as u8);
        let dilated = imageproc::morphology::grayscale_dilate(&candidates, &mask);

        // blur the strength as floats so soft edges are not quantized
        let strength: ImageBuffer<Luma<f32>, Vec<f32>> =
            ImageBuffer::from_fn(cols as u32, rows as u32, |x, y| {
                Luma([dilated.get_pixel(x, y)[0] as f32 / SUPPRESSED as f32])
            });
        let blurred = gaussian_blur_f32(&strength, self.blur_sigma(radius));

        Ok(Array2::from_shape_fn((rows, cols), |(y, x)| {
            if protected[[y, x]] != 0 {
                1.0
            } else {
                (1.0 - blurred.get_pixel(x as u32, y as u32)[0] as f64).clamp(0.0, 1.0)
            }
        }))
    }

    /// Blur sigma for a dilation of `radius`, always positive.
    pub fn blur_sigma(&self, radius: u32) -> f32 {
        let divisor = if self.blur_sigma_divisor.is_finite() && self.blur_sigma_divisor > 0.0 {
            self.blur_sigma_divisor
        } else {
            log::warn!(
                "blur sigma divisor {} is invalid, using {BLUR_SIGMA_DIVISOR}",
                self.blur_sigma_divisor
            );
            BLUR_SIGMA_DIVISOR
        };

        let sigma = (radius as f64 / divisor) as f32;
        if sigma.is_finite() && sigma >= MIN_BLUR_SIGMA {
            sigma
        } else {
            log::warn!("blur sigma {sigma} for radius {radius} raised to {MIN_BLUR_SIGMA}");
            MIN_BLUR_SIGMA
        }
    }

    /// Filter one channel. `weights` comes from [`crate::radial::radial_weights`]
    /// for the same size.
    pub fn filter_channel(&self, channel: &Array2<f64>, weights: &Array2<f64>) -> DescreenResult<Array2<f64>> {
        check_dim("spectral filter", channel.dim(), weights.dim())?;

        let mut spectrum = Spectrum::forward(channel);
        let mask = self.suppression_mask(&spectrum, weights)?;
        spectrum.apply_mask(&mask)?;

        Ok(spectrum.inverse())
    }
}

fn check_dim(stage: &'static str, expected: (usize, usize), actual: (usize, usize)) -> DescreenResult<()> {
    if expected != actual {
        return Err(DescreenError::DimensionMismatch {
            stage,
            expected,
            actual,
        });
    }

    Ok(())
}
