use lanetrack_image::{Image, ImageDtype};

/// Kernel for bilinear interpolation
///
/// # Arguments
///
/// * `image` - The input image container.
/// * `u` - The x coordinate of the pixel to interpolate.
/// * `v` - The y coordinate of the pixel to interpolate.
///
/// # Returns
///
/// The interpolated pixel values, or `None` when the sample is outside the image.
pub(crate) fn bilinear_interpolation<T: ImageDtype, const C: usize>(
    image: &Image<T, C>,
    u: f32,
    v: f32,
) -> Option<[f32; C]> {
    let (rows, cols) = (image.rows(), image.cols());

    if u < 0.0 || v < 0.0 || u > (cols - 1) as f32 || v > (rows - 1) as f32 {
        return None;
    }

    let iu0 = (u.trunc() as usize).min(cols - 1);
    let iv0 = (v.trunc() as usize).min(rows - 1);

    let frac_u = u - iu0 as f32;
    let frac_v = v - iv0 as f32;

    let frac_uu = 1.0 - frac_u;
    let frac_vv = 1.0 - frac_v;

    let w00 = frac_uu * frac_vv;
    let w01 = frac_u * frac_vv;
    let w10 = frac_uu * frac_v;
    let w11 = frac_u * frac_v;

    let iu1 = if iu0 + 1 < cols { iu0 + 1 } else { iu0 };
    let iv1 = if iv0 + 1 < rows { iv0 + 1 } else { iv0 };

    let base00 = (iv0 * cols + iu0) * C;
    let base01 = (iv0 * cols + iu1) * C;
    let base10 = (iv1 * cols + iu0) * C;
    let base11 = (iv1 * cols + iu1) * C;

    let data = image.as_slice();

    let p00 = data.get(base00..base00 + C)?;
    let p01 = data.get(base01..base01 + C)?;
    let p10 = data.get(base10..base10 + C)?;
    let p11 = data.get(base11..base11 + C)?;

    let mut pixel = [0.0; C];
    for (k, out) in pixel.iter_mut().enumerate() {
        let (v00, v01, v10, v11): (f32, f32, f32, f32) =
            (p00[k].into(), p01[k].into(), p10[k].into(), p11[k].into());
        *out = v00 * w00 + v01 * w01 + v10 * w10 + v11 * w11;
    }

    Some(pixel)
}
