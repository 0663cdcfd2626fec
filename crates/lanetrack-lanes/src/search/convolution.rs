use lanetrack_image::{BinaryMask, Frame, Image, ImageError};
use lanetrack_imgproc::{
    enhance::add_weighted,
    filter::{convolve_1d_full, kernels::box_kernel_1d},
    histogram::{argmax, column_histogram},
};

use crate::config::ConvolutionConfig;

/// Window centers of the left and right lane lines in one layer, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CentroidPair {
    /// Center column of the left window.
    pub left: f64,
    /// Center column of the right window.
    pub right: f64,
}

/// Centroid search that slides a box window over the column sums of stacked layers.
///
/// Layers are `window_height` rows tall, bottom first. The first layer sums the bottom
/// quarter of the mask on each side of the middle column. Every later layer looks for the
/// strongest response within `margin` of the previous center.
#[derive(Debug, Clone)]
pub struct ConvolutionSearch {
    config: ConvolutionConfig,
    window: Vec<f32>,
}

impl ConvolutionSearch {
    /// Create the search from its configuration.
    pub fn new(config: ConvolutionConfig) -> Self {
        Self {
            window: box_kernel_1d(config.window_width),
            config,
        }
    }

    /// Find one centroid pair per layer.
    ///
    /// # Errors
    ///
    /// [`ImageError::EmptyImage`] for an empty mask or one narrower than two columns.
    pub fn find_centroids(&self, mask: &BinaryMask) -> Result<Vec<CentroidPair>, ImageError> {
        let (width, height) = (mask.cols(), mask.rows());
        let midpoint = width / 2;
        if midpoint == 0 {
            return Err(ImageError::EmptyImage);
        }

        let half_window = self.config.window_width as f64 / 2.0;
        let window_height = self.config.window_height;

        // first layer from the bottom quarter
        let bottom = column_histogram(mask, 3 * height / 4..height)?;
        let (left_sum, right_sum) = bottom.split_at(midpoint);

        let left_conv = self.convolve(left_sum);
        let right_conv = self.convolve(right_sum);
        let mut left_center =
            argmax(&left_conv).ok_or(ImageError::EmptyImage)? as f64 - half_window;
        let mut right_center = argmax(&right_conv).ok_or(ImageError::EmptyImage)? as f64
            - half_window
            + midpoint as f64;

        let mut centroids = vec![CentroidPair {
            left: left_center,
            right: right_center,
        }];

        for level in 1..height / window_height {
            let layer = column_histogram(
                mask,
                height - (level + 1) * window_height..height - level * window_height,
            )?;
            let signal = self.convolve(&layer);

            left_center = self.next_center(&signal, left_center, width);
            right_center = self.next_center(&signal, right_center, width);

            centroids.push(CentroidPair {
                left: left_center,
                right: right_center,
            });
        }

        log::debug!("convolution search: {} layers", centroids.len());

        Ok(centroids)
    }

    fn convolve(&self, sums: &[u32]) -> Vec<f32> {
        let signal = sums.iter().map(|&v| v as f32).collect::<Vec<_>>();
        convolve_1d_full(&signal, &self.window)
    }

    /// The convolution peaks at the right edge of the window, hence the half window offset.
    fn next_center(&self, signal: &[f32], center: f64, width: usize) -> f64 {
        let offset = self.config.window_width as f64 / 2.0;
        let min_index = (center + offset - self.config.margin).max(0.0) as usize;
        let max_index = (center + offset + self.config.margin)
            .min(width as f64)
            .max(0.0) as usize;

        match signal.get(min_index..max_index).and_then(argmax) {
            Some(i) => (i + min_index) as f64 - offset,
            // nothing to search, keep the previous center
            None => center,
        }
    }

    /// Paint the windows of every layer green over the mask.
    ///
    /// The windows are blended at half weight over the mask expanded to three channels.
    pub fn render(
        &self,
        mask: &BinaryMask,
        centroids: &[CentroidPair],
    ) -> Result<Frame, ImageError> {
        let base = mask.mask_to_rgb()?;
        if centroids.is_empty() {
            return Ok(base);
        }

        let (width, height) = (mask.cols() as i64, mask.rows() as i64);
        let window_width = self.config.window_width as f64;
        let window_height = self.config.window_height as i64;

        let mut template = Image::from_size_val(mask.size(), 0u8)?;
        for (level, pair) in centroids.iter().enumerate() {
            let level = level as i64;
            let y_low = (height - (level + 1) * window_height).max(0);
            let y_high = (height - level * window_height).max(0);

            for center in [pair.left, pair.right] {
                let x_low = ((center - window_width / 2.0).trunc() as i64).max(0);
                let x_high = ((center + window_width / 2.0).trunc() as i64).min(width);
                for y in y_low..y_high {
                    for x in x_low..x_high {
                        template.set_pixel(x as usize, y as usize, 1, 255)?;
                    }
                }
            }
        }

        let mut output = Image::from_size_val(mask.size(), 0u8)?;
        add_weighted(&base, 1.0, &template, 0.5, 0.0, &mut output)?;
        Ok(output)
    }
}
