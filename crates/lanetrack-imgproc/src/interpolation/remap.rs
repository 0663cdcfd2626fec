use crate::parallel;

use super::interpolate::interpolate_pixel;
use super::InterpolationMode;
use lanetrack_image::{Image, ImageDtype, ImageError};

/// Apply generic geometric transformation to an image.
///
/// Destination pixels whose sample falls outside the source are set to zero.
///
/// # Arguments
///
/// * `src` - The input image container with shape (height, width, C).
/// * `dst` - The output image container with shape (height, width, C).
/// * `map_x` - The x coordinates of the pixels to interpolate.
/// * `map_y` - The y coordinates of the pixels to interpolate.
/// * `interpolation` - The interpolation mode to use.
///
/// # Errors
///
/// * The mapx and mapy must have the same size.
/// * The output image must have the same size as the mapx and mapy.
pub fn remap<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    map_x: &Image<f32, 1>,
    map_y: &Image<f32, 1>,
    interpolation: InterpolationMode,
) -> Result<(), ImageError> {
    if src.is_empty() {
        return Err(ImageError::EmptyImage);
    }
    crate::ensure_same_size(map_x.size(), map_y.size())?;
    crate::ensure_same_size(map_x.size(), dst.size())?;

    // parallelize the remap operation by rows
    parallel::par_iter_rows_resample(dst, map_x, map_y, |&x, &y, dst_pixel| {
        match interpolate_pixel(src, x, y, interpolation) {
            Some(pixel) => dst_pixel
                .iter_mut()
                .zip(pixel.iter())
                .for_each(|(out, &val)| *out = T::from_f32(val)),
            None => dst_pixel.iter_mut().for_each(|out| *out = T::default()),
        }
    });

    Ok(())
}
