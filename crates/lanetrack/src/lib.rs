#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use lanetrack_image as image;

#[doc(inline)]
pub use lanetrack_imgproc as imgproc;

#[doc(inline)]
pub use lanetrack_lanes as lanes;
