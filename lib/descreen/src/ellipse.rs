use ndarray::Array2;

/// Binary elliptical footprint with half-axes `w` (columns) and `h` (rows).
///
/// The result has shape `(2h + 1, 2w + 1)`. A cell at centered coordinates
/// `(x, y)` is 1 when `(x/w)^2 + (y/h)^2 - offset <= 1`, where
/// `offset = (w + h) / (2wh)` keeps small ellipses closed on the integer grid.
/// Half-axes below 1 are raised to 1.
pub fn ellipse(w: u32, h: u32) -> Array2<u8> {
    let (w, h) = (w.max(1) as usize, h.max(1) as usize);
    let (wf, hf) = (w as f64, h as f64);
    let offset = (wf + hf) / 2.0 / (wf * hf);

    Array2::from_shape_fn((2 * h + 1, 2 * w + 1), |(row, col)| {
        let x = col as f64 - wf;
        let y = row as f64 - hf;
        u8::from((x / wf).powi(2) + (y / hf).powi(2) - offset <= 1.0)
    })
}

/// Copy `footprint` into a zeroed `rows x cols` matrix with its top-left
/// corner at `(top, left)`. Cells that land outside are dropped.
pub fn place(footprint: &Array2<u8>, rows: usize, cols: usize, top: isize, left: isize) -> Array2<u8> {
    let mut out = Array2::zeros((rows, cols));

    for ((fy, fx), &value) in footprint.indexed_iter() {
        let (y, x) = (top + fy as isize, left + fx as isize);
        if (0..rows as isize).contains(&y) && (0..cols as isize).contains(&x) {
            out[[y as usize, x as usize]] = value;
        }
    }

    out
}
