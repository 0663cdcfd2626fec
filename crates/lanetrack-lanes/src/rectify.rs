use lanetrack_image::{Image, ImageError, ImageSize};
use lanetrack_imgproc::{
    interpolation::InterpolationMode,
    warp::{get_perspective_transform, inverse_perspective_matrix, transform_point, warp_perspective},
};

use crate::config::RectifierConfig;

/// A pair of perspective matrices between the camera view and the top-down view.
///
/// `inverse ∘ forward` is the identity within floating point tolerance.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveMapping {
    src: [[f32; 2]; 4],
    dst: [[f32; 2]; 4],
    forward: [f32; 9],
    inverse: [f32; 9],
}

impl PerspectiveMapping {
    /// Compute the mapping that sends each source corner onto its destination corner.
    ///
    /// # Errors
    ///
    /// [`ImageError::SingularSystem`] for degenerate corners.
    pub fn new(src: [[f32; 2]; 4], dst: [[f32; 2]; 4]) -> Result<Self, ImageError> {
        let forward = get_perspective_transform(&src, &dst)?;
        let inverse = inverse_perspective_matrix(&forward)?;
        Ok(Self {
            src,
            dst,
            forward,
            inverse,
        })
    }

    /// The camera view corners.
    pub fn src_points(&self) -> &[[f32; 2]; 4] {
        &self.src
    }

    /// The top-down view corners.
    pub fn dst_points(&self) -> &[[f32; 2]; 4] {
        &self.dst
    }

    /// Camera to top-down matrix.
    pub fn forward(&self) -> &[f32; 9] {
        &self.forward
    }

    /// Top-down to camera matrix.
    pub fn inverse(&self) -> &[f32; 9] {
        &self.inverse
    }

    /// Map a camera view point into the top-down view.
    pub fn map_point(&self, x: f32, y: f32) -> (f32, f32) {
        transform_point(x, y, &self.forward)
    }

    /// Map a top-down view point back into the camera view.
    pub fn unmap_point(&self, x: f32, y: f32) -> (f32, f32) {
        transform_point(x, y, &self.inverse)
    }
}

/// Destination rectangle for a road trapezoid.
///
/// The rectangle keeps the bottom corners inset by `offset_x`, and its top edge sits at
/// `offset_x · height / width`.
///
/// # Example
///
/// ```
/// use lanetrack_image::ImageSize;
/// use lanetrack_lanes::rectify::destination_points;
///
/// let src = [[594.0, 451.0], [685.0, 451.0], [268.0, 677.0], [1037.0, 677.0]];
/// let dst = destination_points(&src, 100.0, ImageSize { width: 1280, height: 720 });
///
/// assert_eq!(dst, [[368.0, 56.25], [937.0, 56.25], [368.0, 720.0], [937.0, 720.0]]);
/// ```
pub fn destination_points(src: &[[f32; 2]; 4], offset_x: f32, size: ImageSize) -> [[f32; 2]; 4] {
    let (width, height) = (size.width as f32, size.height as f32);
    let offset_y = offset_x * height / width;

    let [_, _, bottom_left, bottom_right] = *src;
    let left = bottom_left[0] + offset_x;
    let right = bottom_right[0] - offset_x;

    [
        [left, offset_y],
        [right, offset_y],
        [left, height],
        [right, height],
    ]
}

/// Warps images between the camera view and the rectified top-down view of the road.
///
/// Both views share the frame size. Pixels without a source read as zero.
#[derive(Debug, Clone)]
pub struct PerspectiveRectifier {
    mapping: PerspectiveMapping,
    size: ImageSize,
    interpolation: InterpolationMode,
}

impl PerspectiveRectifier {
    /// Build the rectifier for frames of the given size.
    pub fn new(config: &RectifierConfig, size: ImageSize) -> Result<Self, ImageError> {
        if size.is_empty() {
            return Err(ImageError::EmptyImage);
        }

        let dst = destination_points(&config.src_points, config.offset_x, size);
        let mapping = PerspectiveMapping::new(config.src_points, dst)?;

        log::debug!(
            "rectifier {} from {:?} to {:?}",
            size,
            mapping.src_points(),
            mapping.dst_points()
        );

        Ok(Self {
            mapping,
            size,
            interpolation: config.interpolation,
        })
    }

    /// The perspective mapping in use.
    pub fn mapping(&self) -> &PerspectiveMapping {
        &self.mapping
    }

    /// The frame size both views share.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Warp a camera view image into the top-down view.
    pub fn rectify<const C: usize>(&self, src: &Image<u8, C>) -> Result<Image<u8, C>, ImageError> {
        self.warp(src, self.mapping.forward())
    }

    /// Warp a top-down view image back into the camera view.
    pub fn unrectify<const C: usize>(&self, src: &Image<u8, C>) -> Result<Image<u8, C>, ImageError> {
        self.warp(src, self.mapping.inverse())
    }

    fn warp<const C: usize>(
        &self,
        src: &Image<u8, C>,
        m: &[f32; 9],
    ) -> Result<Image<u8, C>, ImageError> {
        if src.size() != self.size {
            return Err(ImageError::InvalidImageSize(
                src.width(),
                src.height(),
                self.size.width,
                self.size.height,
            ));
        }

        let mut dst = Image::from_size_val(self.size, 0)?;
        warp_perspective(src, &mut dst, m, self.interpolation)?;
        Ok(dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lanetrack_image::Frame;

    fn rectifier() -> Result<PerspectiveRectifier, ImageError> {
        PerspectiveRectifier::new(
            &RectifierConfig::default(),
            ImageSize {
                width: 1280,
                height: 720,
            },
        )
    }

    #[test]
    fn mapping_is_invertible() -> Result<(), ImageError> {
        let rectifier = rectifier()?;
        let mapping = rectifier.mapping();

        for (s, d) in mapping.src_points().iter().zip(mapping.dst_points().iter()) {
            let (x, y) = mapping.map_point(s[0], s[1]);
            approx::assert_abs_diff_eq!(x, d[0], epsilon = 1e-2);
            approx::assert_abs_diff_eq!(y, d[1], epsilon = 1e-2);
        }

        for (x, y) in [(640.0, 500.0), (400.0, 650.0), (900.0, 600.0)] {
            let (u, v) = mapping.map_point(x, y);
            let (xr, yr) = mapping.unmap_point(u, v);
            approx::assert_abs_diff_eq!(xr, x, epsilon = 1e-2);
            approx::assert_abs_diff_eq!(yr, y, epsilon = 1e-2);
        }
        Ok(())
    }

    #[test]
    fn roundtrip_is_identity_inside_the_trapezoid() -> Result<(), ImageError> {
        let rectifier = rectifier()?;
        let size = rectifier.size();

        // a horizontal ramp, so a one pixel shift changes the value by at most one
        let mut data = Vec::with_capacity(size.width * size.height * 3);
        for _ in 0..size.height {
            for x in 0..size.width {
                let v = (x / 6) as u8;
                data.extend_from_slice(&[v, v, v]);
            }
        }
        let frame = Frame::new(size, data)?;

        let restored = rectifier.unrectify(&rectifier.rectify(&frame)?)?;

        for (x, y) in [(640, 500), (640, 600), (450, 650), (800, 650), (640, 470)] {
            let expected = *frame.get_pixel(x, y, 0)? as i32;
            let actual = *restored.get_pixel(x, y, 0)? as i32;
            assert!(
                (expected - actual).abs() <= 2,
                "({x}, {y}): {expected} vs {actual}"
            );
        }

        // outside the trapezoid nothing survives
        assert_eq!(*restored.get_pixel(20, 20, 0)?, 0);
        Ok(())
    }

    #[test]
    fn size_mismatch_is_rejected() -> Result<(), ImageError> {
        let rectifier = rectifier()?;
        let frame = Frame::from_size_val([640, 360].into(), 0)?;
        assert_eq!(
            rectifier.rectify(&frame),
            Err(ImageError::InvalidImageSize(640, 360, 1280, 720))
        );
        Ok(())
    }
}
