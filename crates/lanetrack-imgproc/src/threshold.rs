use std::ops::RangeBounds;

use lanetrack_image::{Image, ImageError};

use crate::parallel;

/// Mark the pixels of a single channel image that fall inside a range.
///
/// The destination is a binary mask with values in `{0, 1}`. Any [`RangeBounds`] works, so
/// both `lo..=hi` and half-open bounds such as `(Bound::Excluded(lo), Bound::Included(hi))`
/// can be expressed.
///
/// # Arguments
///
/// * `src` - The input image with shape (H, W, 1).
/// * `dst` - The output mask with shape (H, W, 1).
/// * `range` - The accepted range of values.
///
/// # Examples
///
/// ```
/// use lanetrack_image::{Image, ImageSize};
/// use lanetrack_imgproc::threshold::in_range;
///
/// let size = ImageSize { width: 4, height: 1 };
/// let image = Image::<u8, 1>::new(size, vec![10, 20, 100, 101]).unwrap();
/// let mut mask = Image::<u8, 1>::from_size_val(size, 0).unwrap();
///
/// in_range(&image, &mut mask, 20..=100).unwrap();
/// assert_eq!(mask.as_slice(), &[0, 1, 1, 0]);
/// ```
pub fn in_range<T, R>(
    src: &Image<T, 1>,
    dst: &mut Image<u8, 1>,
    range: R,
) -> Result<(), ImageError>
where
    T: Clone + Send + Sync + PartialOrd,
    R: RangeBounds<T> + Send + Sync,
{
    crate::ensure_same_size(src.size(), dst.size())?;

    parallel::par_iter_rows_val(src, dst, |src_pixel, dst_pixel| {
        *dst_pixel = range.contains(src_pixel) as u8;
    });

    Ok(())
}

/// Rescale the absolute values of an image so that its maximum maps to 255.
///
/// Each output value is `trunc(255 · |v| / max|v|)`. When the maximum is zero (or the image
/// holds no finite values) the output is all zeros.
///
/// # Arguments
///
/// * `src` - The input image with shape (H, W, 1).
/// * `dst` - The rescaled image with shape (H, W, 1).
///
/// # Examples
///
/// ```
/// use lanetrack_image::{Image, ImageSize};
/// use lanetrack_imgproc::threshold::scale_abs_by_max;
///
/// let size = ImageSize { width: 3, height: 1 };
/// let image = Image::<f32, 1>::new(size, vec![-4.0, 1.0, 2.0]).unwrap();
/// let mut scaled = Image::<u8, 1>::from_size_val(size, 0).unwrap();
///
/// scale_abs_by_max(&image, &mut scaled).unwrap();
/// assert_eq!(scaled.as_slice(), &[255, 63, 127]);
/// ```
pub fn scale_abs_by_max(src: &Image<f32, 1>, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
    crate::ensure_same_size(src.size(), dst.size())?;

    let max = src
        .as_slice()
        .iter()
        .map(|v| v.abs())
        .filter(|v| v.is_finite())
        .fold(0.0f32, f32::max);

    if max <= 0.0 {
        dst.as_slice_mut().fill(0);
        return Ok(());
    }

    let scale = 255.0 / max;
    parallel::par_iter_rows_val(src, dst, |src_pixel, dst_pixel| {
        // the cast saturates, non-finite values land on 0 or 255
        *dst_pixel = (src_pixel.abs() * scale) as u8;
    });

    Ok(())
}
