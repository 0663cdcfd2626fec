use lanetrack_image::{ImageError, ImageSize};

/// Errors of the least-squares lane line fit.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FitError {
    /// Fewer than three distinct rows hold lane pixels.
    #[error("Not enough data to fit a parabola: {0} distinct rows")]
    InsufficientData(usize),

    /// The x and y coordinate lists differ in length.
    #[error("Mismatched coordinate lengths: {0} x values, {1} y values")]
    MismatchedLengths(usize, usize),

    /// The least-squares system has no finite solution.
    #[error("The least-squares system of the fit is singular")]
    Singular,
}

/// Errors of the curvature and deviation estimation.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Re-fitting the lane line in world units failed.
    #[error("Failed to refit the lane in world units. {0}")]
    Refit(#[from] FitError),

    /// A radius or the deviation is not a number or infinite.
    #[error("Non finite lane geometry: {0}")]
    NonFinite(&'static str),
}

/// An error type for the lane tracking pipeline.
#[derive(thiserror::Error, Debug)]
pub enum LaneError {
    /// Error from an image operation.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error fitting a lane line.
    #[error(transparent)]
    Fit(#[from] FitError),

    /// Error estimating the lane geometry.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// The frame size differs from the configured one.
    #[error("Frame size {actual} does not match the configured {expected}")]
    FrameSizeMismatch {
        /// The configured frame size.
        expected: ImageSize,
        /// The received frame size.
        actual: ImageSize,
    },

    /// A configuration value is out of its valid range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error reading or writing a configuration file.
    #[error("Failed to manipulate the file. {0}")]
    FileError(#[from] std::io::Error),

    /// Error encoding or decoding a configuration file.
    #[error("Invalid configuration file. {0}")]
    JsonError(#[from] serde_json::Error),
}
