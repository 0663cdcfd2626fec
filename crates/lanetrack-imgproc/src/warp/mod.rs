//! Geometric image transformations using perspective warps.
//!
//! - Perspective transform estimation from four point correspondences
//! - Perspective matrix inversion and point transformation
//! - Image warping with a constant zero border
//!
//! # Examples
//!
//! Mapping the unit square onto a scaled square:
//!
//! ```
//! use lanetrack_imgproc::warp::{get_perspective_transform, transform_point};
//!
//! let src = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
//! let dst = [[0.0, 0.0], [2.0, 0.0], [0.0, 2.0], [2.0, 2.0]];
//!
//! let m = get_perspective_transform(&src, &dst).unwrap();
//! let (x, y) = transform_point(0.5, 0.5, &m);
//!
//! assert!((x - 1.0).abs() < 1e-5);
//! assert!((y - 1.0).abs() < 1e-5);
//! ```

mod perspective;

pub use perspective::{
    get_perspective_transform, inverse_perspective_matrix, transform_point, warp_perspective,
};
