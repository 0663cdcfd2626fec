//! Lane pixel search strategies.
//!
//! - [`SlidingWindowSearch`]: cold start from a column histogram and stacked windows.
//! - [`ContinuationSearch`]: warm start inside a band around the previous fits.
//! - [`ConvolutionSearch`]: box filter centroids, for inspection only.

mod continuation;
mod convolution;
mod sliding_window;

pub use continuation::ContinuationSearch;
pub use convolution::{CentroidPair, ConvolutionSearch};
pub use sliding_window::SlidingWindowSearch;

use lanetrack_image::{BinaryMask, ImageError};

use crate::{error::FitError, fit::LaneFit};

/// Pixel coordinates attributed to one lane line in one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LanePixels {
    /// Column of every pixel.
    pub x: Vec<f64>,
    /// Row of every pixel.
    pub y: Vec<f64>,
}

impl LanePixels {
    /// Add one pixel.
    pub fn push(&mut self, x: usize, y: usize) {
        self.x.push(x as f64);
        self.y.push(y as f64);
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether no pixel was found.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Fit `x = a·y² + b·y + c` through the pixels.
    pub fn fit(&self) -> Result<LaneFit, FitError> {
        LaneFit::fit(&self.y, &self.x)
    }
}

/// A search window, `[x_low, x_high) × [y_low, y_high)` in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// First column.
    pub x_low: i64,
    /// One past the last column.
    pub x_high: i64,
    /// First row.
    pub y_low: i64,
    /// One past the last row.
    pub y_high: i64,
}

/// The left and right windows of one band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBand {
    /// Window of the left lane line.
    pub left: Window,
    /// Window of the right lane line.
    pub right: Window,
}

/// Lane pixels found in one rectified mask.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResult {
    /// Pixels of the left lane line.
    pub left: LanePixels,
    /// Pixels of the right lane line.
    pub right: LanePixels,
    /// The windows that were searched, bottom band first. Empty for window free searches.
    pub windows: Vec<WindowBand>,
}

impl SearchResult {
    /// Fit both lane lines.
    pub fn fit(&self) -> Result<(LaneFit, LaneFit), FitError> {
        Ok((self.left.fit()?, self.right.fit()?))
    }
}

/// A strategy that attributes the pixels of a rectified mask to the two lane lines.
pub trait LanePixelSearch {
    /// Search the lane pixels of a rectified binary mask.
    fn search(&self, mask: &BinaryMask) -> Result<SearchResult, ImageError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use approx::assert_abs_diff_eq;
    use lanetrack_image::{Image, ImageSize};

    fn assert_vertical(fit: &LaneFit, column: f64) {
        assert_abs_diff_eq!(fit.a, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(fit.b, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(fit.c, column, epsilon = 1e-6);
    }

    #[test]
    fn cold_start_then_continuation() -> Result<(), Box<dyn std::error::Error>> {
        let size = ImageSize {
            width: 1280,
            height: 720,
        };
        let mut mask = Image::from_size_val(size, 0u8)?;
        for y in 0..size.height {
            mask.set_pixel(300, y, 0, 1)?;
            mask.set_pixel(900, y, 0, 1)?;
        }

        let config = SearchConfig::default();
        let cold = SlidingWindowSearch::new(config.clone()).search(&mask)?;
        assert_eq!(cold.windows.len(), 9);

        let (left, right) = cold.fit()?;
        assert_vertical(&left, 300.0);
        assert_vertical(&right, 900.0);

        let warm = ContinuationSearch::new(left, right, config.continuation_margin).search(&mask)?;
        assert!(warm.windows.is_empty());
        assert_eq!(warm.left.len(), 720);
        assert_eq!(warm.right.len(), 720);

        let (left, right) = warm.fit()?;
        assert_vertical(&left, 300.0);
        assert_vertical(&right, 900.0);
        Ok(())
    }
}
