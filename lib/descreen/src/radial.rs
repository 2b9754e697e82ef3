//! Energy correction for centered magnitude spectra.
//!
//! The magnitude of a natural image's spectrum falls off quickly with the
//! distance from the zero-frequency bin. Multiplying by this weight flattens
//! that falloff so that one scalar threshold applies to the whole spectrum.

use ndarray::Array2;

/// Lower bound of every weight, keeps the center bin from collapsing to zero.
pub const MIN_WEIGHT: f64 = 0.01;

/// Build the `height x width` weight map.
///
/// Cell `(y, x)` holds `max((sqrt|x - W/2| + sqrt|y - H/2|)^2, MIN_WEIGHT)`.
/// The map only depends on the size, so compute it once per image and share
/// it between channels.
pub fn radial_weights(height: usize, width: usize) -> Array2<f64> {
    let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);

    Array2::from_shape_fn((height, width), |(y, x)| {
        let energy = (x as f64 - cx).abs().sqrt() + (y as f64 - cy).abs().sqrt();
        (energy * energy).max(MIN_WEIGHT)
    })
}
