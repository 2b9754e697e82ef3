//! Centered 2D frequency representation of a single channel.

use crate::{DescreenError, DescreenResult};
use ndarray::Array2;
use rustfft::{FftDirection, FftPlanner, num_complex::Complex};

/// The scaled 2D DFT of a channel, stored with the zero-frequency bin moved to
/// the center (`rows / 2`, `cols / 2`).
///
/// The forward transform is divided by `rows * cols` and the inverse is left
/// unscaled, so a forward/inverse round trip reproduces the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    data: Array2<Complex<f64>>,
}

impl Spectrum {
    /// Transform a real channel and center its zero frequency.
    pub fn forward(channel: &Array2<f64>) -> Self {
        let (rows, cols) = channel.dim();
        let scale = 1.0 / (rows * cols).max(1) as f64;
        let mut data = channel.mapv(|v| Complex::new(v, 0.0));

        fft_2d(&mut data, FftDirection::Forward);
        data.mapv_inplace(|c| c * scale);

        Self {
            data: fftshift(&data),
        }
    }

    /// Undo the shift, transform back and keep the modulus of every cell.
    pub fn inverse(self) -> Array2<f64> {
        let mut data = ifftshift(&self.data);
        fft_2d(&mut data, FftDirection::Inverse);
        data.mapv(|c| c.norm())
    }

    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn as_array(&self) -> &Array2<Complex<f64>> {
        &self.data
    }

    pub fn magnitude(&self) -> Array2<f64> {
        self.data.mapv(|c| c.norm())
    }

    /// Scale the real and imaginary part of every cell by `mask`.
    pub fn apply_mask(&mut self, mask: &Array2<f64>) -> DescreenResult<()> {
        if mask.dim() != self.dim() {
            return Err(DescreenError::DimensionMismatch {
                stage: "spectrum mask",
                expected: self.dim(),
                actual: mask.dim(),
            });
        }

        self.data.zip_mut_with(mask, |c, &m| *c *= m);
        Ok(())
    }
}

/// Unnormalized 2D FFT, rows first, then columns.
///
/// Each line is copied into a contiguous buffer, transformed in place and
/// written back, so the matrix keeps its `(rows, cols)` orientation.
fn fft_2d(data: &mut Array2<Complex<f64>>, direction: FftDirection) {
    let (rows, cols) = data.dim();
    if rows == 0 || cols == 0 {
        return;
    }

    let mut planner = FftPlanner::<f64>::new();
    let fft_row = planner.plan_fft(cols, direction);
    let fft_col = planner.plan_fft(rows, direction);

    let scratch_len = fft_row
        .get_inplace_scratch_len()
        .max(fft_col.get_inplace_scratch_len());
    let mut scratch = vec![Complex::default(); scratch_len];
    let mut line = Vec::with_capacity(rows.max(cols));

    for mut row in data.rows_mut() {
        line.clear();
        line.extend(row.iter().copied());
        fft_row.process_with_scratch(&mut line, &mut scratch);
        row.iter_mut().zip(&line).for_each(|(dst, src)| *dst = *src);
    }

    for mut col in data.columns_mut() {
        line.clear();
        line.extend(col.iter().copied());
        fft_col.process_with_scratch(&mut line, &mut scratch);
        col.iter_mut().zip(&line).for_each(|(dst, src)| *dst = *src);
    }
}

/// Circularly shift a matrix down by `dy` rows and right by `dx` columns.
fn roll<T: Clone>(data: &Array2<T>, dy: usize, dx: usize) -> Array2<T> {
    let (rows, cols) = data.dim();
    Array2::from_shape_fn((rows, cols), |(y, x)| {
        data[[(y + rows - dy) % rows, (x + cols - dx) % cols]].clone()
    })
}

/// Swap quadrants so the zero-frequency bin moves to `(rows / 2, cols / 2)`.
pub fn fftshift<T: Clone>(data: &Array2<T>) -> Array2<T> {
    let (rows, cols) = data.dim();
    roll(data, rows / 2, cols / 2)
}

/// Inverse of [`fftshift`]. Differs from it when a dimension is odd.
pub fn ifftshift<T: Clone>(data: &Array2<T>) -> Array2<T> {
    let (rows, cols) = data.dim();
    roll(data, rows - rows / 2, cols - cols / 2)
}
