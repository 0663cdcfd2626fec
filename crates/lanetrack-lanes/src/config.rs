use std::path::Path;

use lanetrack_image::ImageSize;
use lanetrack_imgproc::{color::ColorSpace, interpolation::InterpolationMode};
use serde::{Deserialize, Serialize};

use crate::error::LaneError;

/// Gradient and color thresholds of the lane pixel mask.
///
/// Gradient ranges are inclusive. The saturation range excludes its lower bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Size of the sobel kernel, 3 or 5.
    pub kernel_size: usize,
    /// Range of the scaled absolute x derivative.
    pub gradient_x: [u8; 2],
    /// Range of the scaled absolute y derivative.
    pub gradient_y: [u8; 2],
    /// Range of the scaled gradient magnitude.
    pub magnitude: [u8; 2],
    /// Range of the gradient direction in radians.
    pub direction: [f32; 2],
    /// Range of the saturation channel, `(lo, hi]`.
    pub saturation: [f32; 2],
    /// The color space the saturation channel is taken from.
    pub color_space: ColorSpace,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            kernel_size: 3,
            gradient_x: [20, 100],
            gradient_y: [20, 100],
            magnitude: [20, 100],
            direction: [0.7, 1.3],
            saturation: [90.0, 255.0],
            color_space: ColorSpace::Hls,
        }
    }
}

/// The road trapezoid seen by the camera and how far its rectangle is inset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RectifierConfig {
    /// Source corners as `[x, y]`: top-left, top-right, bottom-left, bottom-right.
    pub src_points: [[f32; 2]; 4],
    /// Horizontal inset of the destination rectangle from the bottom corners.
    pub offset_x: f32,
    /// Interpolation used by both warp directions.
    pub interpolation: InterpolationMode,
}

impl Default for RectifierConfig {
    fn default() -> Self {
        Self {
            src_points: [[594.0, 451.0], [685.0, 451.0], [268.0, 677.0], [1037.0, 677.0]],
            offset_x: 100.0,
            interpolation: InterpolationMode::Nearest,
        }
    }
}

/// Parameters of the sliding window and continuation searches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of horizontal bands of the sliding window search.
    pub num_windows: usize,
    /// Half width of a sliding window in pixels.
    pub margin: i64,
    /// A window re-centers when it holds more than this many pixels.
    pub min_pixels: usize,
    /// Half width of the band around the previous fit in pixels.
    pub continuation_margin: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            num_windows: 9,
            margin: 100,
            min_pixels: 50,
            continuation_margin: 100.0,
        }
    }
}

/// Parameters of the convolution centroid search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvolutionConfig {
    /// Width of the box window in pixels.
    pub window_width: usize,
    /// Height of a layer in pixels.
    pub window_height: usize,
    /// How far a centroid may move between layers in pixels.
    pub margin: f64,
}

impl Default for ConvolutionConfig {
    fn default() -> Self {
        Self {
            window_width: 50,
            window_height: 80,
            margin: 100.0,
        }
    }
}

/// Conversion of the rectified view to world units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Meters per pixel along the road.
    pub ym_per_pix: f64,
    /// Meters per pixel across the road.
    pub xm_per_pix: f64,
    /// Lateral mounting offset of the camera in meters, added to the deviation.
    pub camera_offset: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            ym_per_pix: 30.0 / 720.0,
            xm_per_pix: 3.7 / 700.0,
            camera_offset: 0.10,
        }
    }
}

/// Appearance of the lane overlay and its annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Color of the lane area.
    pub lane_color: [u8; 3],
    /// Blend weight of the lane area over the frame.
    pub lane_weight: f32,
    /// Radii above this many meters are reported as straight.
    pub straight_radius: f64,
    /// Color of the text lines.
    pub text_color: [u8; 3],
    /// Bottom-left corners of the curvature and deviation lines.
    pub text_origins: [[i64; 2]; 2],
    /// Integer scale of the glyphs.
    pub text_scale: usize,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            lane_color: [0, 255, 0],
            lane_weight: 0.3,
            straight_radius: 2000.0,
            text_color: [255, 255, 255],
            text_origins: [[50, 80], [50, 100]],
            text_scale: 1,
        }
    }
}

/// Configuration of the whole lane tracking pipeline.
///
/// Every field falls back to its default when missing from a configuration file.
///
/// # Example
///
/// ```
/// use lanetrack_lanes::LaneConfig;
///
/// let config: LaneConfig = serde_json::from_str(r#"{ "search": { "margin": 80 } }"#).unwrap();
/// assert_eq!(config.search.margin, 80);
/// assert_eq!(config.search.num_windows, 9);
/// assert_eq!(config.frame_width, 1280);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneConfig {
    /// Width of the processed frames.
    pub frame_width: usize,
    /// Height of the processed frames.
    pub frame_height: usize,
    /// Thresholding parameters.
    pub threshold: ThresholdConfig,
    /// Rectification parameters.
    pub rectifier: RectifierConfig,
    /// Search parameters.
    pub search: SearchConfig,
    /// Convolution search parameters.
    pub convolution: ConvolutionConfig,
    /// World unit conversions.
    pub geometry: GeometryConfig,
    /// Overlay appearance.
    pub overlay: OverlayConfig,
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self {
            frame_width: 1280,
            frame_height: 720,
            threshold: ThresholdConfig::default(),
            rectifier: RectifierConfig::default(),
            search: SearchConfig::default(),
            convolution: ConvolutionConfig::default(),
            geometry: GeometryConfig::default(),
            overlay: OverlayConfig::default(),
        }
    }
}

fn invalid(msg: impl Into<String>) -> LaneError {
    LaneError::InvalidConfig(msg.into())
}

fn check_range<T: PartialOrd + std::fmt::Debug>(name: &str, range: &[T; 2]) -> Result<(), LaneError> {
    if range[0] > range[1] {
        return Err(invalid(format!("{name} range {range:?} is reversed")));
    }
    Ok(())
}

impl LaneConfig {
    /// The configured frame size.
    pub fn frame_size(&self) -> ImageSize {
        ImageSize {
            width: self.frame_width,
            height: self.frame_height,
        }
    }

    /// Load a configuration from a JSON file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LaneError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let config: LaneConfig = serde_json::from_str(&data)?;
        config.validate()?;

        log::info!("loaded lane configuration from {}", path.display());

        Ok(config)
    }

    /// Save the configuration as pretty printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LaneError> {
        let path = path.as_ref();
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;

        log::info!("saved lane configuration to {}", path.display());

        Ok(())
    }

    /// Check every parameter once, before any frame is processed.
    pub fn validate(&self) -> Result<(), LaneError> {
        if self.frame_size().is_empty() {
            return Err(invalid(format!("empty frame size {}", self.frame_size())));
        }

        let t = &self.threshold;
        if t.kernel_size != 3 && t.kernel_size != 5 {
            return Err(invalid(format!("sobel kernel size {}", t.kernel_size)));
        }
        check_range("gradient x", &t.gradient_x)?;
        check_range("gradient y", &t.gradient_y)?;
        check_range("magnitude", &t.magnitude)?;
        check_range("direction", &t.direction)?;
        check_range("saturation", &t.saturation)?;

        let r = &self.rectifier;
        if !r.src_points.iter().flatten().all(|v| v.is_finite()) || !r.offset_x.is_finite() {
            return Err(invalid("non finite rectifier parameters"));
        }

        let s = &self.search;
        if s.num_windows == 0 || s.num_windows > self.frame_height {
            return Err(invalid(format!("{} sliding windows", s.num_windows)));
        }
        if s.margin <= 0 || !(s.continuation_margin > 0.0) {
            return Err(invalid("search margins must be positive"));
        }
        if s.margin > self.frame_width as i64 {
            return Err(invalid(format!(
                "search margin {} wider than the frame",
                s.margin
            )));
        }

        let c = &self.convolution;
        if c.window_width == 0 || c.window_height == 0 || c.window_height > self.frame_height {
            return Err(invalid(format!(
                "convolution window {}x{}",
                c.window_width, c.window_height
            )));
        }
        if !(c.margin > 0.0) {
            return Err(invalid("convolution margin must be positive"));
        }

        let g = &self.geometry;
        if !(g.ym_per_pix > 0.0 && g.xm_per_pix > 0.0) || !g.camera_offset.is_finite() {
            return Err(invalid("world unit conversions must be positive"));
        }

        let o = &self.overlay;
        if !o.lane_weight.is_finite() || !(o.straight_radius > 0.0) {
            return Err(invalid("invalid overlay parameters"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() -> Result<(), LaneError> {
        let config = LaneConfig::default();
        config.validate()?;
        assert_eq!(config.frame_size(), ImageSize { width: 1280, height: 720 });
        Ok(())
    }

    #[test]
    fn save_load_roundtrip() -> Result<(), LaneError> {
        let tmp_dir = tempfile::tempdir()?;
        let path = tmp_dir.path().join("lanes.json");

        let mut config = LaneConfig::default();
        config.threshold.color_space = ColorSpace::Hsv;
        config.search.margin = 80;
        config.save(&path)?;

        assert_eq!(LaneConfig::load(&path)?, config);
        Ok(())
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut config = LaneConfig::default();
        config.threshold.kernel_size = 4;
        assert!(matches!(config.validate(), Err(LaneError::InvalidConfig(_))));

        let mut config = LaneConfig::default();
        config.threshold.direction = [1.3, 0.7];
        assert!(matches!(config.validate(), Err(LaneError::InvalidConfig(_))));

        let mut config = LaneConfig::default();
        config.search.num_windows = 0;
        assert!(matches!(config.validate(), Err(LaneError::InvalidConfig(_))));

        let mut config = LaneConfig::default();
        config.search.margin = i64::MAX;
        assert!(matches!(config.validate(), Err(LaneError::InvalidConfig(_))));

        // the margin may span the whole frame but no more
        let mut config = LaneConfig::default();
        config.search.margin = config.frame_width as i64;
        assert!(config.validate().is_ok());
        config.search.margin += 1;
        assert!(matches!(config.validate(), Err(LaneError::InvalidConfig(_))));

        let mut config = LaneConfig::default();
        config.geometry.xm_per_pix = f64::NAN;
        assert!(matches!(config.validate(), Err(LaneError::InvalidConfig(_))));
    }

    #[test]
    fn load_rejects_invalid_file() -> Result<(), LaneError> {
        let tmp_dir = tempfile::tempdir()?;
        let path = tmp_dir.path().join("lanes.json");
        std::fs::write(&path, r#"{ "frame_width": 0 }"#)?;

        assert!(matches!(
            LaneConfig::load(&path),
            Err(LaneError::InvalidConfig(_))
        ));
        Ok(())
    }
}
