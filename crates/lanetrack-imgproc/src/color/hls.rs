use crate::parallel;
use lanetrack_image::{Image, ImageError};

/// Convert an RGB image to an HLS image.
///
/// The input image is assumed to have 3 channels in the order R, G, B in the range [0, 255].
///
/// # Returns
///
/// The HLS image with the following channels:
///
/// * H: The hue channel in the range [0, 255] (0-360 degrees).
/// * L: The lightness channel in the range [0, 255].
/// * S: The saturation channel in the range [0, 255].
///
/// Precondition: the input and output images must have the same size.
///
/// # Example
///
/// ```
/// use lanetrack_image::{Image, ImageSize};
/// use lanetrack_imgproc::color::hls_from_rgb;
///
/// let image = Image::<f32, 3>::new(
///     ImageSize {
///        width: 1,
///        height: 1,
///     },
///     vec![255.0, 255.0, 0.0],
/// )
/// .unwrap();
///
/// let mut hls = Image::<f32, 3>::from_size_val(image.size(), 0.0).unwrap();
///
/// hls_from_rgb(&image, &mut hls).unwrap();
///
/// assert_eq!(hls.as_slice()[2], 255.0);
/// ```
pub fn hls_from_rgb(src: &Image<f32, 3>, dst: &mut Image<f32, 3>) -> Result<(), ImageError> {
    crate::ensure_same_size(src.size(), dst.size())?;

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        let r = src_pixel[0] / 255.;
        let g = src_pixel[1] / 255.;
        let b = src_pixel[2] / 255.;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let l = (max + min) / 2.0;

        let (h, s) = if delta <= f32::EPSILON {
            (0.0, 0.0)
        } else {
            let s = if l < 0.5 {
                delta / (max + min)
            } else {
                delta / (2.0 - max - min)
            };

            let h = if max == r {
                60.0 * ((g - b) / delta)
            } else if max == g {
                60.0 * ((b - r) / delta) + 120.0
            } else {
                60.0 * ((r - g) / delta) + 240.0
            };

            (if h < 0.0 { h + 360.0 } else { h }, s)
        };

        dst_pixel[0] = (h / 360.0) * 255.0;
        dst_pixel[1] = l * 255.0;
        dst_pixel[2] = s * 255.0;
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use lanetrack_image::{Image, ImageError, ImageSize};

    #[test]
    fn hls_from_rgb() -> Result<(), ImageError> {
        let image = Image::<f32, 3>::new(
            ImageSize {
                width: 4,
                height: 1,
            },
            vec![
                255.0, 255.0, 255.0, // white
                0.0, 0.0, 0.0, // black
                255.0, 0.0, 0.0, // red
                64.0, 128.0, 64.0, // dark green
            ],
        )?;

        let mut hls = Image::<f32, 3>::from_size_val(image.size(), 0.0)?;
        super::hls_from_rgb(&image, &mut hls)?;

        let hls = hls.as_slice();

        // achromatic pixels carry no saturation
        assert_relative_eq!(hls[1], 255.0, epsilon = 1e-3);
        assert_relative_eq!(hls[2], 0.0, epsilon = 1e-3);
        assert_relative_eq!(hls[5], 0.0, epsilon = 1e-3);

        // pure red
        assert_relative_eq!(hls[6], 0.0, epsilon = 1e-3);
        assert_relative_eq!(hls[7], 127.5, epsilon = 1e-3);
        assert_relative_eq!(hls[8], 255.0, epsilon = 1e-3);

        // l = (128 + 64) / 2 / 255, s = 64 / 192
        assert_relative_eq!(hls[9], 120.0 / 360.0 * 255.0, epsilon = 1e-2);
        assert_relative_eq!(hls[10], 96.0, epsilon = 1e-2);
        assert_relative_eq!(hls[11], 255.0 / 3.0, epsilon = 1e-2);

        Ok(())
    }
}
