use lanetrack_image::{Image, ImageError};
use rayon::prelude::*;

/// Map an out of range index into the image using reflect-101 borders (`gfedcb|abcdefgh|gfedcba`).
#[inline]
pub(crate) fn reflect_101(index: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let len = len as isize;
    let mut i = index;
    while i < 0 || i >= len {
        if i < 0 {
            i = -i;
        }
        if i >= len {
            i = 2 * (len - 1) - i;
        }
    }
    i as usize
}

/// Apply a separable 2D correlation to a single channel image.
///
/// The horizontal kernel is applied first, then the vertical one. Out of range pixels are
/// read with reflect-101 borders.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, 1).
/// * `dst` - The destination image with shape (H, W, 1).
/// * `kernel_x` - The horizontal kernel, odd length.
/// * `kernel_y` - The vertical kernel, odd length.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn separable_filter(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    kernel_x: &[f32],
    kernel_y: &[f32],
) -> Result<(), ImageError> {
    crate::ensure_same_size(src.size(), dst.size())?;

    if kernel_x.len() % 2 == 0 {
        return Err(ImageError::InvalidKernelSize(kernel_x.len()));
    }
    if kernel_y.len() % 2 == 0 {
        return Err(ImageError::InvalidKernelSize(kernel_y.len()));
    }

    let (rows, cols) = (src.rows(), src.cols());
    let half_x = (kernel_x.len() / 2) as isize;
    let half_y = (kernel_y.len() / 2) as isize;
    let src_data = src.as_slice();

    // horizontal pass
    let mut temp = vec![0.0f32; rows * cols];
    temp.par_chunks_exact_mut(cols)
        .zip(src_data.par_chunks_exact(cols))
        .for_each(|(temp_row, src_row)| {
            for (c, out) in temp_row.iter_mut().enumerate() {
                let mut acc = 0.0;
                for (k, weight) in kernel_x.iter().enumerate() {
                    let xi = reflect_101(c as isize + k as isize - half_x, cols);
                    acc += weight * src_row[xi];
                }
                *out = acc;
            }
        });

    // vertical pass
    dst.as_slice_mut()
        .par_chunks_exact_mut(cols)
        .enumerate()
        .for_each(|(r, dst_row)| {
            for (c, out) in dst_row.iter_mut().enumerate() {
                let mut acc = 0.0;
                for (k, weight) in kernel_y.iter().enumerate() {
                    let yi = reflect_101(r as isize + k as isize - half_y, rows);
                    acc += weight * temp[yi * cols + c];
                }
                *out = acc;
            }
        });

    Ok(())
}
