//! Filter operations
//!
//! This module provides the derivative filters used to extract lane edges.

/// Filter kernels
pub mod kernels;

/// 1D convolution
mod convolve;
pub use convolve::*;

/// Separable filter operations
mod separable_filter;
pub use separable_filter::*;

/// Gradient operations
mod gradient;
pub use gradient::*;
