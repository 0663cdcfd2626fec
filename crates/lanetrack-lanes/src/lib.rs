#![deny(missing_docs)]
//! Lane boundary tracking for a forward facing camera.
//!
//! A [`tracker::LaneTracker`] turns every raw frame into a binary lane mask, rectifies it into
//! a top-down view, searches the lane pixels, fits one parabola per lane line and draws the
//! detected lane back onto the frame together with its curvature and the lateral deviation
//! of the vehicle.

/// configuration of every pipeline stage.
pub mod config;

/// error types of the lane pipeline.
pub mod error;

/// least-squares lane line fitting.
pub mod fit;

/// curvature and deviation estimation.
pub mod geometry;

/// lane area and text overlays.
pub mod overlay;

/// perspective rectification of the road plane.
pub mod rectify;

/// lane pixel search strategies.
pub mod search;

/// binary lane pixel thresholding.
pub mod threshold;

/// frame to frame lane tracking.
pub mod tracker;

/// lens distortion correction applied before tracking.
pub mod undistort;

pub use config::LaneConfig;
pub use error::{FitError, GeometryError, LaneError};
pub use fit::LaneFit;
pub use geometry::LaneGeometry;
pub use tracker::{FrameOutput, FrameStatus, LaneTracker, SearchMode, TrackerState};
pub use undistort::{CalibratedUndistortion, NoUndistortion, Undistort};
