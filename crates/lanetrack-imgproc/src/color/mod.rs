mod gray;
mod hls;
mod hsv;

pub use gray::gray_from_rgb_u8;
pub use hls::hls_from_rgb;
pub use hsv::hsv_from_rgb;

use lanetrack_image::{Image, ImageError};
use serde::{Deserialize, Serialize};

/// Signature shared by the RGB to cylindrical color space conversions.
pub type ColorConversionFn = fn(&Image<f32, 3>, &mut Image<f32, 3>) -> Result<(), ImageError>;

/// The color spaces a saturation channel can be extracted from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    /// Hue, lightness, saturation.
    #[default]
    Hls,
    /// Hue, saturation, value.
    Hsv,
}

impl ColorSpace {
    /// The conversion function from RGB into this color space.
    pub fn converter(self) -> ColorConversionFn {
        match self {
            ColorSpace::Hls => hls_from_rgb,
            ColorSpace::Hsv => hsv_from_rgb,
        }
    }

    /// Index of the saturation channel in the converted image.
    pub fn saturation_channel(self) -> usize {
        match self {
            ColorSpace::Hls => 2,
            ColorSpace::Hsv => 1,
        }
    }
}
