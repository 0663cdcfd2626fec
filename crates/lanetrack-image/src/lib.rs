#![deny(missing_docs)]
//! Image types used across the lane tracking pipeline.

/// image representation for computer vision purposes.
pub mod image;

/// Error types for the image module.
pub mod error;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageDtype, ImageSize};

/// A 3-channel RGB8 camera frame.
pub type Frame = Image<u8, 3>;

/// A single channel mask with values restricted to `{0, 1}`.
pub type BinaryMask = Image<u8, 1>;
