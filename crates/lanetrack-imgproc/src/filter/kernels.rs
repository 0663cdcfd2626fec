use lanetrack_image::ImageError;

/// Create a box kernel of ones, as used by the convolution based window search.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
pub fn box_kernel_1d(kernel_size: usize) -> Vec<f32> {
    vec![1.0; kernel_size]
}

/// Create a sobel kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
///
/// # Returns
///
/// A tuple with the derivative kernel and the smoothing kernel.
pub fn sobel_kernel_1d(kernel_size: usize) -> Result<(Vec<f32>, Vec<f32>), ImageError> {
    let (kernel_x, kernel_y) = match kernel_size {
        3 => (vec![-1.0, 0.0, 1.0], vec![1.0, 2.0, 1.0]),
        5 => (
            vec![-1.0, -2.0, 0.0, 2.0, 1.0],
            vec![1.0, 4.0, 6.0, 4.0, 1.0],
        ),
        _ => return Err(ImageError::InvalidKernelSize(kernel_size)),
    };
    Ok((kernel_x, kernel_y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sobel_kernel_1d() -> Result<(), ImageError> {
        let kernel = sobel_kernel_1d(3)?;
        assert_eq!(kernel.0, vec![-1.0, 0.0, 1.0]);
        assert_eq!(kernel.1, vec![1.0, 2.0, 1.0]);

        let kernel = sobel_kernel_1d(5)?;
        assert_eq!(kernel.0, vec![-1.0, -2.0, 0.0, 2.0, 1.0]);
        assert_eq!(kernel.1, vec![1.0, 4.0, 6.0, 4.0, 1.0]);

        assert_eq!(sobel_kernel_1d(4), Err(ImageError::InvalidKernelSize(4)));
        Ok(())
    }

    #[test]
    fn test_box_kernel_1d() {
        assert_eq!(box_kernel_1d(3), vec![1.0, 1.0, 1.0]);
    }
}
