use lanetrack_image::{BinaryMask, ImageError};
use lanetrack_imgproc::histogram::{argmax, column_histogram};

use super::{LanePixelSearch, LanePixels, SearchResult, Window, WindowBand};
use crate::config::SearchConfig;

/// Cold start search with stacked windows that follow the lane lines upwards.
///
/// The bases are the histogram peaks of the bottom half of the mask, one on each side of
/// the middle column. A window re-centers on the mean column of its pixels when it holds
/// more than `min_pixels` of them.
#[derive(Debug, Clone)]
pub struct SlidingWindowSearch {
    config: SearchConfig,
}

impl SlidingWindowSearch {
    /// Create the search from its configuration.
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    /// Columns of the left and right histogram peaks over the bottom half of the mask.
    pub fn find_bases(&self, mask: &BinaryMask) -> Result<(usize, usize), ImageError> {
        let histogram = column_histogram(mask, mask.rows() / 2..mask.rows())?;
        let midpoint = mask.cols() / 2;

        let (left, right) = histogram.split_at(midpoint);
        let left_base = argmax(left).ok_or(ImageError::EmptyImage)?;
        let right_base = argmax(right).ok_or(ImageError::EmptyImage)? + midpoint;

        Ok((left_base, right_base))
    }

    /// Push the nonzero pixels of a window and return the column to re-center on, if any.
    fn collect(&self, mask: &BinaryMask, window: &Window, pixels: &mut LanePixels) -> Option<usize> {
        let (cols, rows) = (mask.cols() as i64, mask.rows() as i64);
        let x_range = window.x_low.max(0)..window.x_high.min(cols);
        let y_range = window.y_low.max(0)..window.y_high.min(rows);

        let data = mask.as_slice();
        let (mut count, mut sum) = (0usize, 0usize);
        for y in y_range {
            let row = &data[(y * cols) as usize..((y + 1) * cols) as usize];
            for x in x_range.clone() {
                if row[x as usize] != 0 {
                    pixels.push(x as usize, y as usize);
                    count += 1;
                    sum += x as usize;
                }
            }
        }

        // re-center on the truncated mean column
        (count > self.config.min_pixels).then(|| sum / count)
    }
}

impl LanePixelSearch for SlidingWindowSearch {
    fn search(&self, mask: &BinaryMask) -> Result<SearchResult, ImageError> {
        let (mut left_current, mut right_current) = self.find_bases(mask)?;

        let height = mask.rows() as i64;
        let window_height = height / self.config.num_windows as i64;
        let margin = self.config.margin;

        let mut result = SearchResult {
            windows: Vec::with_capacity(self.config.num_windows),
            ..Default::default()
        };

        for band in 0..self.config.num_windows as i64 {
            let y_low = height - (band + 1) * window_height;
            let y_high = height - band * window_height;

            let window_at = |center: usize| Window {
                x_low: center as i64 - margin,
                x_high: center as i64 + margin,
                y_low,
                y_high,
            };
            let bands = WindowBand {
                left: window_at(left_current),
                right: window_at(right_current),
            };

            if let Some(center) = self.collect(mask, &bands.left, &mut result.left) {
                left_current = center;
            }
            if let Some(center) = self.collect(mask, &bands.right, &mut result.right) {
                right_current = center;
            }

            result.windows.push(bands);
        }

        log::debug!(
            "sliding window search: {} left and {} right pixels",
            result.left.len(),
            result.right.len()
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lanetrack_image::{Image, ImageSize};

    fn vertical_lines(size: ImageSize, columns: &[usize]) -> Result<BinaryMask, ImageError> {
        let mut mask = Image::from_size_val(size, 0)?;
        for y in 0..size.height {
            for &x in columns {
                mask.set_pixel(x, y, 0, 1)?;
            }
        }
        Ok(mask)
    }

    #[test]
    fn finds_two_vertical_lines() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 1280,
            height: 720,
        };
        let mask = vertical_lines(size, &[300, 301, 900, 901])?;

        let search = SlidingWindowSearch::new(SearchConfig::default());
        assert_eq!(search.find_bases(&mask)?, (300, 900));

        let result = search.search(&mask)?;
        assert_eq!(result.windows.len(), 9);
        assert_eq!(result.left.len(), 2 * 720);
        assert_eq!(result.right.len(), 2 * 720);
        assert!(result.left.x.iter().all(|&x| x == 300.0 || x == 301.0));

        // bands run bottom to top, 80 rows each
        assert_eq!(
            result.windows[0].left,
            Window {
                x_low: 200,
                x_high: 400,
                y_low: 640,
                y_high: 720
            }
        );
        assert_eq!(result.windows[8].left.y_low, 0);
        Ok(())
    }

    #[test]
    fn windows_follow_a_slanted_line() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 400,
            height: 90,
        };
        let mut mask = Image::from_size_val(size, 0)?;
        for y in 0..size.height {
            // drifts right by one column every two rows towards the top
            let x = 60 + (size.height - 1 - y) / 2;
            for dx in 0..6 {
                mask.set_pixel(x + dx, y, 0, 1)?;
            }
            mask.set_pixel(300, y, 0, 1)?;
        }

        let config = SearchConfig {
            num_windows: 9,
            margin: 20,
            min_pixels: 50,
            continuation_margin: 20.0,
        };
        let result = SlidingWindowSearch::new(config).search(&mask)?;

        // each 10 row band holds 60 pixels, enough to re-center
        let centers = result
            .windows
            .iter()
            .map(|band| (band.left.x_low + band.left.x_high) / 2)
            .collect::<Vec<_>>();
        // the first window sits on the histogram peak, the rest on the pixel means
        assert!(centers[1..].windows(2).all(|w| w[1] > w[0]));
        assert!(centers[8] > centers[1]);
        assert_eq!(result.left.len(), 6 * 90);
        Ok(())
    }

    #[test]
    fn empty_mask_yields_no_pixels() -> Result<(), ImageError> {
        let mask = Image::from_size_val([64, 36].into(), 0)?;
        let config = SearchConfig {
            num_windows: 9,
            margin: 10,
            min_pixels: 5,
            continuation_margin: 10.0,
        };
        let result = SlidingWindowSearch::new(config).search(&mask)?;
        assert!(result.left.is_empty());
        assert!(result.right.is_empty());
        assert_eq!(result.windows.len(), 9);
        Ok(())
    }

    #[test]
    fn narrow_mask_is_rejected() -> Result<(), ImageError> {
        let mask = Image::from_size_val([1, 4].into(), 1)?;
        let search = SlidingWindowSearch::new(SearchConfig::default());
        assert_eq!(search.search(&mask), Err(ImageError::EmptyImage));
        Ok(())
    }
}
