use lanetrack_image::{BinaryMask, ImageError};

use super::{LanePixelSearch, SearchResult};
use crate::fit::LaneFit;

/// Warm start search inside a band around the fits of the previous frame.
///
/// A pixel belongs to a lane line when its column lies strictly within `margin` of the
/// previous fit evaluated at its row.
#[derive(Debug, Clone)]
pub struct ContinuationSearch {
    left: LaneFit,
    right: LaneFit,
    margin: f64,
}

impl ContinuationSearch {
    /// Create the search seeded by a pair of previous fits.
    pub fn new(left: LaneFit, right: LaneFit, margin: f64) -> Self {
        Self {
            left,
            right,
            margin,
        }
    }

    /// The band half width in pixels.
    pub fn margin(&self) -> f64 {
        self.margin
    }

    /// The seed fits, left then right.
    pub fn seeds(&self) -> (&LaneFit, &LaneFit) {
        (&self.left, &self.right)
    }
}

impl LanePixelSearch for ContinuationSearch {
    fn search(&self, mask: &BinaryMask) -> Result<SearchResult, ImageError> {
        if mask.is_empty() {
            return Err(ImageError::EmptyImage);
        }

        let mut result = SearchResult::default();

        for (y, row) in mask.as_slice().chunks_exact(mask.cols()).enumerate() {
            let left_center = self.left.eval(y as f64);
            let right_center = self.right.eval(y as f64);

            for (x, _) in row.iter().enumerate().filter(|(_, v)| **v != 0) {
                let xf = x as f64;
                if xf > left_center - self.margin && xf < left_center + self.margin {
                    result.left.push(x, y);
                }
                if xf > right_center - self.margin && xf < right_center + self.margin {
                    result.right.push(x, y);
                }
            }
        }

        log::debug!(
            "continuation search: {} left and {} right pixels",
            result.left.len(),
            result.right.len()
        );

        Ok(result)
    }
}
