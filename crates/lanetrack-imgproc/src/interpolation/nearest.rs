use lanetrack_image::{Image, ImageDtype};

/// Kernel for nearest neighbor interpolation
///
/// # Arguments
///
/// * `image` - The input image container.
/// * `u` - The x coordinate of the pixel to interpolate.
/// * `v` - The y coordinate of the pixel to interpolate.
///
/// # Returns
///
/// The pixel values, or `None` when the rounded position is outside the image.
pub(crate) fn nearest_neighbor_interpolation<T: ImageDtype, const C: usize>(
    image: &Image<T, C>,
    u: f32,
    v: f32,
) -> Option<[f32; C]> {
    let (rows, cols) = (image.rows(), image.cols());

    let iu = u.round();
    let iv = v.round();

    if iu < 0.0 || iv < 0.0 || iu >= cols as f32 || iv >= rows as f32 {
        return None;
    }

    let base = (iv as usize * cols + iu as usize) * C;
    let src = image.as_slice().get(base..base + C)?;

    let mut pixel = [0.0; C];
    for (dst, &val) in pixel.iter_mut().zip(src.iter()) {
        *dst = val.into();
    }

    Some(pixel)
}
