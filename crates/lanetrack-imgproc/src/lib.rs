#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// camera calibration record and undistortion module.
pub mod calibration;

/// color transformations module.
pub mod color;

/// utilities to draw on images.
pub mod draw;

/// image enhancement module.
pub mod enhance;

/// image filtering module.
pub mod filter;

/// column histograms of binary masks.
pub mod histogram;

/// utilities for interpolation.
pub mod interpolation;

/// module containing parallization utilities.
pub mod parallel;

/// operations to threshold images.
pub mod threshold;

/// image geometric transformations module.
pub mod warp;

use lanetrack_image::{ImageError, ImageSize};

/// Check that two images share a non-empty size.
pub(crate) fn ensure_same_size(src: ImageSize, dst: ImageSize) -> Result<(), ImageError> {
    if src.is_empty() || dst.is_empty() {
        return Err(ImageError::EmptyImage);
    }

    if src != dst {
        return Err(ImageError::InvalidImageSize(
            src.width, src.height, dst.width, dst.height,
        ));
    }

    Ok(())
}
