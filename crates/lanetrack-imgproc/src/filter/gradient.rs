use lanetrack_image::{Image, ImageError};

use super::{kernels, separable_filter};
use crate::parallel;

/// Compute the first order sobel derivatives of a single channel image.
///
/// Borders are handled with reflect-101, so a constant image yields zero gradients everywhere.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, 1).
/// * `gx` - The horizontal derivative with shape (H, W, 1).
/// * `gy` - The vertical derivative with shape (H, W, 1).
/// * `kernel_size` - The size of the sobel kernel, 3 or 5.
///
/// # Example
///
/// ```
/// use lanetrack_image::{Image, ImageSize};
/// use lanetrack_imgproc::filter::sobel_gradients;
///
/// let size = ImageSize { width: 4, height: 3 };
/// let src = Image::<f32, 1>::new(size, vec![
///     0.0, 0.0, 1.0, 1.0,
///     0.0, 0.0, 1.0, 1.0,
///     0.0, 0.0, 1.0, 1.0,
/// ]).unwrap();
///
/// let mut gx = Image::<f32, 1>::from_size_val(size, 0.0).unwrap();
/// let mut gy = Image::<f32, 1>::from_size_val(size, 0.0).unwrap();
///
/// sobel_gradients(&src, &mut gx, &mut gy, 3).unwrap();
///
/// assert_eq!(gx.as_slice()[1], 4.0);
/// assert!(gy.as_slice().iter().all(|v| *v == 0.0));
/// ```
pub fn sobel_gradients(
    src: &Image<f32, 1>,
    gx: &mut Image<f32, 1>,
    gy: &mut Image<f32, 1>,
    kernel_size: usize,
) -> Result<(), ImageError> {
    let (derivative, smoothing) = kernels::sobel_kernel_1d(kernel_size)?;

    separable_filter(src, gx, &derivative, &smoothing)?;
    separable_filter(src, gy, &smoothing, &derivative)?;

    Ok(())
}

/// Compute the gradient magnitude `sqrt(gx² + gy²)`.
///
/// PRECONDITION: `gx`, `gy` and `dst` must have the same shape.
pub fn gradient_magnitude(
    gx: &Image<f32, 1>,
    gy: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
) -> Result<(), ImageError> {
    crate::ensure_same_size(gx.size(), gy.size())?;
    crate::ensure_same_size(gx.size(), dst.size())?;

    parallel::par_iter_rows_val_two(gx, gy, dst, |&x, &y, out| {
        *out = x.hypot(y);
    });

    Ok(())
}

/// Compute the absolute gradient direction `atan2(|gy|, |gx|)` in radians.
///
/// The result lies in `[0, π/2]`; 0 for vertical edges, π/2 for horizontal ones.
///
/// PRECONDITION: `gx`, `gy` and `dst` must have the same shape.
pub fn gradient_direction(
    gx: &Image<f32, 1>,
    gy: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
) -> Result<(), ImageError> {
    crate::ensure_same_size(gx.size(), gy.size())?;
    crate::ensure_same_size(gx.size(), dst.size())?;

    parallel::par_iter_rows_val_two(gx, gy, dst, |&x, &y, out| {
        *out = y.abs().atan2(x.abs());
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lanetrack_image::ImageSize;

    #[rustfmt::skip]
    #[test]
    fn test_sobel_gradients_ramp() -> Result<(), ImageError> {
        let size = ImageSize { width: 5, height: 4 };
        let src = Image::new(size, vec![
            0.0, 1.0, 2.0, 3.0, 4.0,
            0.0, 1.0, 2.0, 3.0, 4.0,
            0.0, 1.0, 2.0, 3.0, 4.0,
            0.0, 1.0, 2.0, 3.0, 4.0,
        ])?;

        let mut gx = Image::from_size_val(size, 0.0)?;
        let mut gy = Image::from_size_val(size, 0.0)?;
        sobel_gradients(&src, &mut gx, &mut gy, 3)?;

        // interior columns see a slope of 1 scaled by (1 + 2 + 1) * 2
        for row in gx.as_slice().chunks_exact(5) {
            assert_eq!(row, &[0.0, 8.0, 8.0, 8.0, 0.0]);
        }
        assert!(gy.as_slice().iter().all(|v| *v == 0.0));

        Ok(())
    }

    #[test]
    fn test_sobel_gradients_invalid_kernel() -> Result<(), ImageError> {
        let size = ImageSize { width: 3, height: 3 };
        let src = Image::from_size_val(size, 1.0)?;
        let mut gx = Image::from_size_val(size, 0.0)?;
        let mut gy = Image::from_size_val(size, 0.0)?;
        assert_eq!(
            sobel_gradients(&src, &mut gx, &mut gy, 4),
            Err(ImageError::InvalidKernelSize(4))
        );
        Ok(())
    }

    #[test]
    fn test_magnitude_direction() -> Result<(), ImageError> {
        let size = ImageSize { width: 2, height: 1 };
        let gx = Image::new(size, vec![3.0, 0.0])?;
        let gy = Image::new(size, vec![-4.0, 2.0])?;

        let mut mag = Image::from_size_val(size, 0.0)?;
        gradient_magnitude(&gx, &gy, &mut mag)?;
        approx::assert_relative_eq!(mag.as_slice()[0], 5.0);
        approx::assert_relative_eq!(mag.as_slice()[1], 2.0);

        let mut dir = Image::from_size_val(size, 0.0)?;
        gradient_direction(&gx, &gy, &mut dir)?;
        approx::assert_relative_eq!(dir.as_slice()[0], (4.0f32).atan2(3.0));
        approx::assert_relative_eq!(dir.as_slice()[1], std::f32::consts::FRAC_PI_2);

        Ok(())
    }
}
