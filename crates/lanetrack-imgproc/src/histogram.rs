use lanetrack_image::{Image, ImageError};
use rayon::prelude::*;

/// Sum the values of a single channel image per column over a range of rows.
///
/// # Arguments
///
/// * `src` - The input mask.
/// * `rows` - The half-open range of rows to accumulate, clipped to the image height.
///
/// # Returns
///
/// A vector with one sum per column.
///
/// # Errors
///
/// Returns an error if the image is empty.
///
/// # Example
///
/// ```
/// use lanetrack_image::{Image, ImageSize};
/// use lanetrack_imgproc::histogram::column_histogram;
///
/// let image = Image::<u8, 1>::new(
///   ImageSize {
///     width: 3,
///     height: 3,
///   },
///   vec![1, 0, 0, 0, 1, 1, 1, 1, 0],
/// ).unwrap();
///
/// let histogram = column_histogram(&image, 1..3).unwrap();
/// assert_eq!(histogram, vec![1, 2, 1]);
/// ```
pub fn column_histogram(
    src: &Image<u8, 1>,
    rows: std::ops::Range<usize>,
) -> Result<Vec<u32>, ImageError> {
    if src.is_empty() {
        return Err(ImageError::EmptyImage);
    }

    let cols = src.cols();
    let end = rows.end.min(src.rows());
    let start = rows.start.min(end);

    let data = &src.as_slice()[start * cols..end * cols];

    let hist = data
        .par_chunks_exact(cols)
        .fold(
            || vec![0u32; cols],
            |mut local, row| {
                for (acc, &px) in local.iter_mut().zip(row.iter()) {
                    *acc += px as u32;
                }
                local
            },
        )
        .reduce(
            || vec![0u32; cols],
            |mut a, b| {
                for (acc, val) in a.iter_mut().zip(b.iter()) {
                    *acc += val;
                }
                a
            },
        );

    Ok(hist)
}

/// Index of the first maximum of a slice, `None` when it is empty.
pub fn argmax<T: PartialOrd + Copy>(values: &[T]) -> Option<usize> {
    let mut best: Option<(usize, T)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_histogram_bottom_half() -> Result<(), ImageError> {
        let mut image = Image::<u8, 1>::from_size_val([4, 4].into(), 0)?;
        image.set_pixel(1, 0, 0, 1)?;
        image.set_pixel(2, 2, 0, 1)?;
        image.set_pixel(2, 3, 0, 1)?;

        let hist = column_histogram(&image, 2..4)?;
        assert_eq!(hist, vec![0, 0, 2, 0]);

        // out of range rows are clipped
        let hist = column_histogram(&image, 3..10)?;
        assert_eq!(hist, vec![0, 0, 1, 0]);
        let hist = column_histogram(&image, 8..10)?;
        assert_eq!(hist, vec![0, 0, 0, 0]);

        Ok(())
    }

    #[test]
    fn test_argmax_first() {
        assert_eq!(argmax(&[1, 3, 3, 2]), Some(1));
        assert_eq!(argmax(&[0.0f32, 0.0]), Some(0));
        assert_eq!(argmax::<u32>(&[]), None);
    }
}
