/// An error type for the image and image processing crates.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when the data length does not match the image size.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when two images that must share a size do not.
    #[error("Image size mismatch: {0}x{1} vs {2}x{3}")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when an image has zero width or height.
    #[error("Image is empty")]
    EmptyImage,

    /// Error when the pixel index is out of bounds.
    #[error("Pixel index ({0}, {1}) out of bounds ({2}, {3})")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),

    /// Error when the channel index is out of bounds.
    #[error("Channel index {0} out of bounds ({1} channels)")]
    ChannelIndexOutOfBounds(usize, usize),

    /// Error when a value cannot be cast to the target type.
    #[error("Failed to cast image data")]
    CastError,

    /// Error when a transform matrix cannot be inverted.
    #[error("Cannot invert a matrix with zero determinant")]
    CannotComputeDeterminant,

    /// Error when a kernel size is not supported.
    #[error("Unsupported kernel size {0}")]
    InvalidKernelSize(usize),

    /// Error when a linear system has no unique solution.
    #[error("Linear system is singular")]
    SingularSystem,
}
