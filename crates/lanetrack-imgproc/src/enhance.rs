use lanetrack_image::{Image, ImageDtype, ImageError};

use crate::parallel;

/// Performs weighted addition of two images `src1` and `src2` with weights `alpha`
/// and `beta`, and a scalar `gamma`. The formula used is:
///
/// dst(x,y,c) = (src1(x,y,c) * alpha + src2(x,y,c) * beta + gamma)
///
/// The sum is computed in `f32` and converted back with [`ImageDtype::from_f32`], so `u8`
/// images are rounded and saturated to `[0, 255]`.
///
/// # Arguments
///
/// * `src1` - The first input image.
/// * `alpha` - Weight of the first image elements to be multiplied.
/// * `src2` - The second input image.
/// * `beta` - Weight of the second image elements to be multiplied.
/// * `gamma` - Scalar added to each sum.
/// * `dst` - The output image.
///
/// # Errors
///
/// Returns an error if the sizes of `src1`, `src2` and `dst` do not match.
///
/// # Example
///
/// ```
/// use lanetrack_image::{Image, ImageSize};
/// use lanetrack_imgproc::enhance::add_weighted;
///
/// let size = ImageSize { width: 2, height: 1 };
/// let a = Image::<u8, 1>::new(size, vec![100, 250]).unwrap();
/// let b = Image::<u8, 1>::new(size, vec![100, 100]).unwrap();
/// let mut dst = Image::<u8, 1>::from_size_val(size, 0).unwrap();
///
/// add_weighted(&a, 1.0, &b, 0.3, 0.0, &mut dst).unwrap();
/// assert_eq!(dst.as_slice(), &[130, 255]);
/// ```
pub fn add_weighted<T: ImageDtype, const C: usize>(
    src1: &Image<T, C>,
    alpha: f32,
    src2: &Image<T, C>,
    beta: f32,
    gamma: f32,
    dst: &mut Image<T, C>,
) -> Result<(), ImageError> {
    crate::ensure_same_size(src1.size(), src2.size())?;
    crate::ensure_same_size(src1.size(), dst.size())?;

    // compute the weighted sum
    parallel::par_iter_rows_val_two(src1, src2, dst, |&src1_pixel, &src2_pixel, dst_pixel| {
        let v1: f32 = src1_pixel.into();
        let v2: f32 = src2_pixel.into();
        *dst_pixel = T::from_f32(v1 * alpha + v2 * beta + gamma);
    });

    Ok(())
}
