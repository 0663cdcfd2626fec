use crate::{
    interpolation::{grid::meshgrid_from_fn, interpolate_pixel, InterpolationMode},
    parallel,
};

use lanetrack_image::{Image, ImageDtype, ImageError};

const SINGULAR_EPS: f64 = 1e-12;

#[rustfmt::skip]
fn determinant3x3(m: &[f32; 9]) -> f32 {
    m[0] * (m[4] * m[8] - m[5] * m[7]) -
    m[1] * (m[3] * m[8] - m[5] * m[6]) +
    m[2] * (m[3] * m[7] - m[4] * m[6])
}

#[rustfmt::skip]
fn adjugate3x3(m: &[f32; 9]) -> [f32; 9] {
    [
        m[4] * m[8] - m[5] * m[7],  // [0, 0]
        m[2] * m[7] - m[1] * m[8],  // [0, 1]
        m[1] * m[5] - m[2] * m[4],  // [0, 2]
        m[5] * m[6] - m[3] * m[8],  // [1, 0]
        m[0] * m[8] - m[2] * m[6],  // [1, 1]
        m[2] * m[3] - m[0] * m[5],  // [1, 2]
        m[3] * m[7] - m[4] * m[6],  // [2, 0]
        m[1] * m[6] - m[0] * m[7],  // [2, 1]
        m[0] * m[4] - m[1] * m[3],  // [2, 2]
    ]
}

/// Invert a 3x3 perspective matrix through its adjugate.
///
/// # Errors
///
/// [`ImageError::CannotComputeDeterminant`] when the matrix is singular.
pub fn inverse_perspective_matrix(m: &[f32; 9]) -> Result<[f32; 9], ImageError> {
    let det = determinant3x3(m);

    if det == 0.0 || !det.is_finite() {
        return Err(ImageError::CannotComputeDeterminant);
    }

    let adj = adjugate3x3(m);
    let inv_det = 1.0 / det;

    let mut inv_m = [0.0; 9];
    for (inv, a) in inv_m.iter_mut().zip(adj.iter()) {
        *inv = a * inv_det;
    }

    Ok(inv_m)
}

/// Apply a 3x3 perspective matrix to a point.
///
/// Points mapped to the line at infinity come back as non-finite coordinates.
pub fn transform_point(x: f32, y: f32, m: &[f32; 9]) -> (f32, f32) {
    let w = m[6] * x + m[7] * y + m[8];
    let xt = (m[0] * x + m[1] * y + m[2]) / w;
    let yt = (m[3] * x + m[4] * y + m[5]) / w;
    (xt, yt)
}

/// Compute the perspective transform that maps four source points onto four destination
/// points.
///
/// The homography is the right singular vector of the smallest singular value of the
/// 8x9 direct linear transform system, normalized so that its last entry is 1.
///
/// # Arguments
///
/// * `src` - The source points as `[x, y]`.
/// * `dst` - The destination points as `[x, y]`, in the same order.
///
/// # Errors
///
/// [`ImageError::SingularSystem`] when three of the points are collinear.
pub fn get_perspective_transform(
    src: &[[f32; 2]; 4],
    dst: &[[f32; 2]; 4],
) -> Result<[f32; 9], ImageError> {
    // construct matrix A
    let mut mat_a = faer::Mat::<f64>::zeros(8, 9);
    for (i, (s, d)) in src.iter().zip(dst.iter()).enumerate() {
        let (x, y) = (s[0] as f64, s[1] as f64);
        let (u, v) = (d[0] as f64, d[1] as f64);

        mat_a.write(2 * i, 0, x);
        mat_a.write(2 * i, 1, y);
        mat_a.write(2 * i, 2, 1.0);
        mat_a.write(2 * i, 6, -u * x);
        mat_a.write(2 * i, 7, -u * y);
        mat_a.write(2 * i, 8, -u);

        mat_a.write(2 * i + 1, 3, x);
        mat_a.write(2 * i + 1, 4, y);
        mat_a.write(2 * i + 1, 5, 1.0);
        mat_a.write(2 * i + 1, 6, -v * x);
        mat_a.write(2 * i + 1, 7, -v * y);
        mat_a.write(2 * i + 1, 8, -v);
    }

    let svd = mat_a.svd();

    // a second null direction means degenerate correspondences
    let s = svd.s_diagonal();
    if !(s[7] > s[0] * SINGULAR_EPS) {
        return Err(ImageError::SingularSystem);
    }

    let h = svd.v().col(8);
    if !(h[8].abs() > SINGULAR_EPS) {
        return Err(ImageError::SingularSystem);
    }

    let mut m = [0.0f32; 9];
    for (i, mi) in m.iter_mut().enumerate() {
        *mi = (h[i] / h[8]) as f32;
    }

    if !m.iter().all(|v| v.is_finite()) {
        return Err(ImageError::SingularSystem);
    }

    Ok(m)
}

/// Applies a perspective transformation to an image.
///
/// Destination pixels that map outside the source are filled with zero.
///
/// * `src` - The input image with shape (height, width, channels).
/// * `dst` - The output image with shape (height, width, channels).
/// * `m` - The 3x3 perspective transformation matrix src -> dst.
/// * `interpolation` - The interpolation mode to use.
///
/// # Example
///
/// ```
/// use lanetrack_image::{Image, ImageSize};
/// use lanetrack_imgproc::interpolation::InterpolationMode;
/// use lanetrack_imgproc::warp::warp_perspective;
///
/// let src = Image::<u8, 1>::new(
///   ImageSize {
///     width: 4,
///     height: 5,
///   },
///   vec![1u8; 4 * 5]
/// ).unwrap();
///
/// let m = [1.0, 0.0, -1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0];
///
/// let mut dst = Image::<u8, 1>::from_size_val(
///   ImageSize {
///     width: 2,
///     height: 3,
///   },
///   0
/// ).unwrap();
///
/// warp_perspective(&src, &mut dst, &m, InterpolationMode::Nearest).unwrap();
///
/// assert_eq!(dst.as_slice(), &[0, 0, 1, 1, 1, 1]);
/// ```
pub fn warp_perspective<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    m: &[f32; 9],
    interpolation: InterpolationMode,
) -> Result<(), ImageError> {
    if src.is_empty() || dst.is_empty() {
        return Err(ImageError::EmptyImage);
    }

    let inv_m = inverse_perspective_matrix(m)?;

    // create meshgrid to find corresponding positions in src from dst
    let (dst_rows, dst_cols) = (dst.rows(), dst.cols());
    let (map_x, map_y) = meshgrid_from_fn(dst_cols, dst_rows, |x, y| {
        transform_point(x as f32, y as f32, &inv_m)
    })?;

    parallel::par_iter_rows_resample(dst, &map_x, &map_y, |&x, &y, dst_pixel| {
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
