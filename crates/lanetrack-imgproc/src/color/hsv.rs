use crate::parallel;
use lanetrack_image::{Image, ImageError};

/// Convert an RGB image to an HSV image.
///
/// The input image is assumed to have 3 channels in the order R, G, B.
///
/// # Returns
///
/// The HSV image with the following channels:
///
/// * H: The hue channel in the range [0, 255] (0-360 degrees).
/// * S: The saturation channel in the range [0, 255].
/// * V: The value channel in the range [0, 255].
///
/// Precondition: the input and output images must have the same size.
pub fn hsv_from_rgb(src: &Image<f32, 3>, dst: &mut Image<f32, 3>) -> Result<(), ImageError> {
    crate::ensure_same_size(src.size(), dst.size())?;

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        let r = src_pixel[0] / 255.;
        let g = src_pixel[1] / 255.;
        let b = src_pixel[2] / 255.;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let h = if delta == 0.0 {
            0.0
        } else if max == r {
            60.0 * (((g - b) / delta) % 6.0)
        } else if max == g {
            60.0 * (((b - r) / delta) + 2.0)
        } else {
            60.0 * (((r - g) / delta) + 4.0)
        };

        let h = if h < 0.0 { h + 360.0 } else { h };

        let s = if max == 0.0 { 0.0 } else { delta / max };

        dst_pixel[0] = (h / 360.0) * 255.0;
        dst_pixel[1] = s * 255.0;
        dst_pixel[2] = max * 255.0;
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use lanetrack_image::{Image, ImageError, ImageSize};

    #[test]
    fn hsv_from_rgb() -> Result<(), ImageError> {
        let image = Image::<f32, 3>::new(
            ImageSize {
                width: 2,
                height: 1,
            },
            vec![0.0, 128.0, 255.0, 128.0, 128.0, 128.0],
        )?;

        let mut hsv = Image::<f32, 3>::from_size_val(image.size(), 0.0)?;
        super::hsv_from_rgb(&image, &mut hsv)?;

        let hsv = hsv.as_slice();
        assert_relative_eq!(hsv[1], 255.0, epsilon = 1e-3);
        assert_relative_eq!(hsv[2], 255.0, epsilon = 1e-3);
        assert_relative_eq!(hsv[4], 0.0, epsilon = 1e-3);
        assert_relative_eq!(hsv[5], 128.0, epsilon = 1e-3);

        Ok(())
    }
}
