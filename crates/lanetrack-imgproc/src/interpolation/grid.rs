use lanetrack_image::{Image, ImageError, ImageSize};

/// Create a pair of sampling maps by evaluating a function at every destination pixel.
///
/// # Arguments
///
/// * `cols` - The width of the grid.
/// * `rows` - The height of the grid.
/// * `f` - Maps a destination `(x, y)` to the source coordinates to sample.
///
/// # Returns
///
/// The `map_x` and `map_y` images with shape (rows, cols, 1).
pub fn meshgrid_from_fn(
    cols: usize,
    rows: usize,
    f: impl Fn(usize, usize) -> (f32, f32),
) -> Result<(Image<f32, 1>, Image<f32, 1>), ImageError> {
    let mut map_x = Vec::with_capacity(rows * cols);
    let mut map_y = Vec::with_capacity(rows * cols);

    for y in 0..rows {
        for x in 0..cols {
            let (sx, sy) = f(x, y);
            map_x.push(sx);
            map_y.push(sy);
        }
    }

    let size = ImageSize {
        width: cols,
        height: rows,
    };

    Ok((Image::new(size, map_x)?, Image::new(size, map_y)?))
}
