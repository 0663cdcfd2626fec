use std::ops::Bound;

use lanetrack_image::{BinaryMask, Frame, Image, ImageError};
use lanetrack_imgproc::{
    color::{gray_from_rgb_u8, ColorConversionFn, ColorSpace},
    filter::{gradient_direction, gradient_magnitude, sobel_gradients},
    parallel,
    threshold::{in_range, scale_abs_by_max},
};

use crate::config::ThresholdConfig;

/// Axis of a first order derivative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientAxis {
    /// Horizontal derivative, responds to vertical edges.
    X,
    /// Vertical derivative, responds to horizontal edges.
    Y,
}

/// Sobel derivatives of the grayscale version of a frame.
pub struct Gradients {
    /// Horizontal derivative.
    pub gx: Image<f32, 1>,
    /// Vertical derivative.
    pub gy: Image<f32, 1>,
}

impl Gradients {
    /// Compute the derivatives of a color frame.
    pub fn from_frame(frame: &Frame, kernel_size: usize) -> Result<Self, ImageError> {
        let mut gray = Image::from_size_val(frame.size(), 0.0)?;
        gray_from_rgb_u8(frame, &mut gray)?;

        let mut gx = Image::from_size_val(frame.size(), 0.0)?;
        let mut gy = Image::from_size_val(frame.size(), 0.0)?;
        sobel_gradients(&gray, &mut gx, &mut gy, kernel_size)?;

        Ok(Self { gx, gy })
    }

    /// Mask of the pixels whose scaled absolute derivative lies in `range`.
    pub fn abs_mask(&self, axis: GradientAxis, range: [u8; 2]) -> Result<BinaryMask, ImageError> {
        let gradient = match axis {
            GradientAxis::X => &self.gx,
            GradientAxis::Y => &self.gy,
        };
        scaled_mask(gradient, range)
    }

    /// Mask of the pixels whose scaled gradient magnitude lies in `range`.
    pub fn magnitude_mask(&self, range: [u8; 2]) -> Result<BinaryMask, ImageError> {
        let mut magnitude = Image::from_size_val(self.gx.size(), 0.0)?;
        gradient_magnitude(&self.gx, &self.gy, &mut magnitude)?;
        scaled_mask(&magnitude, range)
    }

    /// Mask of the pixels whose gradient direction lies in `range`, in radians.
    pub fn direction_mask(&self, range: [f32; 2]) -> Result<BinaryMask, ImageError> {
        let mut direction = Image::from_size_val(self.gx.size(), 0.0)?;
        gradient_direction(&self.gx, &self.gy, &mut direction)?;

        let mut mask = Image::from_size_val(self.gx.size(), 0)?;
        in_range(&direction, &mut mask, range[0]..=range[1])?;
        Ok(mask)
    }

    /// `(gx ∧ gy) ∨ (magnitude ∧ direction)` with the configured ranges.
    pub fn combined_mask(&self, config: &ThresholdConfig) -> Result<BinaryMask, ImageError> {
        let gx = self.abs_mask(GradientAxis::X, config.gradient_x)?;
        let gy = self.abs_mask(GradientAxis::Y, config.gradient_y)?;
        let magnitude = self.magnitude_mask(config.magnitude)?;
        let direction = self.direction_mask(config.direction)?;

        mask_or(&mask_and(&gx, &gy)?, &mask_and(&magnitude, &direction)?)
    }
}

fn scaled_mask(gradient: &Image<f32, 1>, range: [u8; 2]) -> Result<BinaryMask, ImageError> {
    let mut scaled = Image::from_size_val(gradient.size(), 0)?;
    scale_abs_by_max(gradient, &mut scaled)?;

    let mut mask = Image::from_size_val(gradient.size(), 0)?;
    in_range(&scaled, &mut mask, range[0]..=range[1])?;
    Ok(mask)
}

fn combine_masks(
    a: &BinaryMask,
    b: &BinaryMask,
    op: impl Fn(bool, bool) -> bool + Send + Sync,
) -> Result<BinaryMask, ImageError> {
    if a.size() != b.size() {
        return Err(ImageError::InvalidImageSize(
            a.width(),
            a.height(),
            b.width(),
            b.height(),
        ));
    }
    if a.is_empty() {
        return Err(ImageError::EmptyImage);
    }

    let mut dst = Image::from_size_val(a.size(), 0)?;
    parallel::par_iter_rows_val_two(a, b, &mut dst, |&pa, &pb, out| {
        *out = op(pa != 0, pb != 0) as u8;
    });
    Ok(dst)
}

/// Pixel-wise conjunction of two binary masks.
pub fn mask_and(a: &BinaryMask, b: &BinaryMask) -> Result<BinaryMask, ImageError> {
    combine_masks(a, b, |pa, pb| pa && pb)
}

/// Pixel-wise disjunction of two binary masks.
pub fn mask_or(a: &BinaryMask, b: &BinaryMask) -> Result<BinaryMask, ImageError> {
    combine_masks(a, b, |pa, pb| pa || pb)
}

/// Threshold the scaled absolute derivative of a frame along one axis.
pub fn abs_sobel_mask(
    frame: &Frame,
    axis: GradientAxis,
    kernel_size: usize,
    range: [u8; 2],
) -> Result<BinaryMask, ImageError> {
    Gradients::from_frame(frame, kernel_size)?.abs_mask(axis, range)
}

/// Threshold the scaled gradient magnitude of a frame.
pub fn magnitude_mask(
    frame: &Frame,
    kernel_size: usize,
    range: [u8; 2],
) -> Result<BinaryMask, ImageError> {
    Gradients::from_frame(frame, kernel_size)?.magnitude_mask(range)
}

/// Threshold the gradient direction of a frame, in radians.
pub fn direction_mask(
    frame: &Frame,
    kernel_size: usize,
    range: [f32; 2],
) -> Result<BinaryMask, ImageError> {
    Gradients::from_frame(frame, kernel_size)?.direction_mask(range)
}

/// Combined gradient criteria of a frame, without the color criterion.
pub fn gradient_mask(frame: &Frame, config: &ThresholdConfig) -> Result<BinaryMask, ImageError> {
    Gradients::from_frame(frame, config.kernel_size)?.combined_mask(config)
}

/// Threshold the saturation channel of a frame in the given color space, `lo < s ≤ hi`.
pub fn saturation_mask(
    frame: &Frame,
    color_space: ColorSpace,
    range: [f32; 2],
) -> Result<BinaryMask, ImageError> {
    saturation_mask_with(
        frame,
        color_space.converter(),
        color_space.saturation_channel(),
        range,
    )
}

fn saturation_mask_with(
    frame: &Frame,
    convert: ColorConversionFn,
    channel: usize,
    range: [f32; 2],
) -> Result<BinaryMask, ImageError> {
    let rgb = frame.cast::<f32>()?;
    let mut converted = Image::from_size_val(frame.size(), 0.0)?;
    convert(&rgb, &mut converted)?;

    let saturation = converted.channel(channel)?;
    let mut mask = Image::from_size_val(frame.size(), 0)?;
    in_range(
        &saturation,
        &mut mask,
        (Bound::Excluded(range[0]), Bound::Included(range[1])),
    )?;
    Ok(mask)
}

/// Turns color frames into binary lane pixel masks.
///
/// The color conversion is resolved once from the configured [`ColorSpace`].
///
/// # Example
///
/// ```
/// use lanetrack_image::{Frame, ImageSize};
/// use lanetrack_lanes::config::ThresholdConfig;
/// use lanetrack_lanes::threshold::LaneThresholder;
///
/// let thresholder = LaneThresholder::new(ThresholdConfig::default());
///
/// let frame = Frame::from_size_val(ImageSize { width: 8, height: 8 }, 0).unwrap();
/// let mask = thresholder.apply(&frame).unwrap();
///
/// assert_eq!(mask.count_nonzero(), 0);
/// ```
pub struct LaneThresholder {
    config: ThresholdConfig,
    convert: ColorConversionFn,
    saturation_channel: usize,
}

impl LaneThresholder {
    /// Create a thresholder from its configuration.
    pub fn new(config: ThresholdConfig) -> Self {
        Self {
            convert: config.color_space.converter(),
            saturation_channel: config.color_space.saturation_channel(),
            config,
        }
    }

    /// The thresholds in use.
    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    /// Compute `(gx ∧ gy) ∨ (magnitude ∧ direction) ∨ saturation` for a frame.
    ///
    /// # Errors
    ///
    /// [`ImageError::EmptyImage`] for an empty frame.
    pub fn apply(&self, frame: &Frame) -> Result<BinaryMask, ImageError> {
        if frame.is_empty() {
            return Err(ImageError::EmptyImage);
        }

        let gradients = Gradients::from_frame(frame, self.config.kernel_size)?;
        let gradient = gradients.combined_mask(&self.config)?;
        let color = saturation_mask_with(
            frame,
            self.convert,
            self.saturation_channel,
            self.config.saturation,
        )?;

        mask_or(&gradient, &color)
    }
}
