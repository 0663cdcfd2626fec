//! Pixel interpolation methods for image transformations.
//!
//! - **Nearest**: uses the nearest pixel value, keeps binary masks binary.
//! - **Bilinear**: linear interpolation between the four adjacent pixels.
//!
//! Samples that fall outside the source image read as zero (constant border).

mod bilinear;

/// Grid generation and coordinate mapping utilities.
pub mod grid;

pub(crate) mod interpolate;
mod nearest;
mod remap;

pub use interpolate::{interpolate_pixel, InterpolationMode};
pub use remap::remap;
