use lanetrack_image::{BinaryMask, Frame, Image, ImageError};
use lanetrack_imgproc::{
    draw::{draw_rect, draw_text, fill_poly},
    enhance::add_weighted,
};

use crate::{
    config::OverlayConfig,
    fit::LaneFit,
    geometry::LaneGeometry,
    rectify::PerspectiveRectifier,
    search::SearchResult,
};

const LEFT_PIXEL_COLOR: [u8; 3] = [255, 0, 0];
const RIGHT_PIXEL_COLOR: [u8; 3] = [0, 0, 255];
const WINDOW_COLOR: [u8; 3] = [0, 255, 0];
const WINDOW_THICKNESS: usize = 2;
const BAND_WEIGHT: f32 = 0.3;

/// Format a radius of curvature, `straight` above the given limit.
pub fn format_radius(radius: f64, straight_radius: f64) -> String {
    if radius > straight_radius {
        "straight".to_string()
    } else {
        format!("{radius:.1}m")
    }
}

/// The curvature line of the annotation.
///
/// Without geometry both radii are written as zero.
pub fn curvature_text(geometry: Option<&LaneGeometry>, straight_radius: f64) -> String {
    match geometry {
        Some(g) => format!(
            "radius of curvature: {} (left), {} (right)",
            format_radius(g.left_radius, straight_radius),
            format_radius(g.right_radius, straight_radius)
        ),
        None => format!("radius of curvature: {:.1}m (left), {:.1}m (right)", 0.0, 0.0),
    }
}

/// The deviation line of the annotation, in centimeters.
///
/// Without geometry the deviation is zero and the side is left empty.
pub fn deviation_text(geometry: Option<&LaneGeometry>) -> String {
    match geometry {
        Some(g) => format!(
            "deviation from center: {:.1}cm (to the {})",
            g.deviation.abs() * 100.0,
            g.side()
        ),
        None => format!("deviation from center: {:.1}cm (to the )", 0.0),
    }
}

/// Polygon enclosing the lane between two fits over the rows `0..height`.
///
/// The left line runs top to bottom and the right line bottom to top.
pub fn lane_polygon(left: &LaneFit, right: &LaneFit, height: usize) -> Vec<(i64, i64)> {
    band_polygon(left, right, height, 0.0)
}

// polygon between `left - margin` and `right + margin`
fn band_polygon(left: &LaneFit, right: &LaneFit, height: usize, margin: f64) -> Vec<(i64, i64)> {
    let left_side = (0..height).map(|y| ((left.eval(y as f64) - margin) as i64, y as i64));
    let right_side = (0..height)
        .rev()
        .map(|y| ((right.eval(y as f64) + margin) as i64, y as i64));
    left_side.chain(right_side).collect()
}

/// Draws the detected lane and its geometry onto undistorted frames.
#[derive(Debug, Clone)]
pub struct OverlayRenderer {
    config: OverlayConfig,
}

impl OverlayRenderer {
    /// Create a renderer with the given colors, weights and text placement.
    pub fn new(config: OverlayConfig) -> Self {
        Self { config }
    }

    /// The renderer configuration.
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Fill the lane area in the rectified view, warp it back and blend it over the frame.
    ///
    /// # Arguments
    ///
    /// * `undistorted` - The undistorted camera frame.
    /// * `rectifier` - The rectifier that produced the top-down view of the frame.
    /// * `left` - The left lane line in the top-down view.
    /// * `right` - The right lane line in the top-down view.
    ///
    /// # Returns
    ///
    /// The frame with the lane area blended in.
    pub fn draw_lane(
        &self,
        undistorted: &Frame,
        rectifier: &PerspectiveRectifier,
        left: &LaneFit,
        right: &LaneFit,
    ) -> Result<Frame, ImageError> {
        let size = rectifier.size();

        let mut lane = Image::from_size_val(size, 0u8)?;
        fill_poly(
            &mut lane,
            &lane_polygon(left, right, size.height),
            self.config.lane_color,
        );

        let unwarped = rectifier.unrectify(&lane)?;

        let mut output = Image::from_size_val(undistorted.size(), 0u8)?;
        add_weighted(
            undistorted,
            1.0,
            &unwarped,
            self.config.lane_weight,
            0.0,
            &mut output,
        )?;

        Ok(output)
    }

    /// Write the curvature and deviation lines onto the frame.
    ///
    /// `None` writes the zeroed annotation used when the geometry could not be estimated.
    pub fn annotate(&self, frame: &mut Frame, geometry: Option<&LaneGeometry>) {
        let lines = [
            curvature_text(geometry, self.config.straight_radius),
            deviation_text(geometry),
        ];

        for (text, [x, y]) in lines.iter().zip(self.config.text_origins) {
            draw_text(
                frame,
                text,
                (x, y),
                self.config.text_scale,
                self.config.text_color,
            );
        }
    }
}

// expand the mask and color the pixels of both lane lines
fn paint_lane_pixels(mask: &BinaryMask, result: &SearchResult) -> Result<Frame, ImageError> {
    let mut output = mask.mask_to_rgb()?;

    for (pixels, color) in [
        (&result.left, LEFT_PIXEL_COLOR),
        (&result.right, RIGHT_PIXEL_COLOR),
    ] {
        for (&x, &y) in pixels.x.iter().zip(pixels.y.iter()) {
            for (ch, &value) in color.iter().enumerate() {
                output.set_pixel(x as usize, y as usize, ch, value)?;
            }
        }
    }

    Ok(output)
}

/// Render a sliding window search over its rectified mask.
///
/// Left lane pixels are painted red, right lane pixels blue and every window is outlined
/// in green.
pub fn render_search_windows(mask: &BinaryMask, result: &SearchResult) -> Result<Frame, ImageError> {
    let mut output = paint_lane_pixels(mask, result)?;

    for band in &result.windows {
        for w in [&band.left, &band.right] {
            draw_rect(
                &mut output,
                (w.x_low, w.y_low),
                (w.x_high, w.y_high),
                WINDOW_COLOR,
                WINDOW_THICKNESS,
            );
        }
    }

    Ok(output)
}

/// Render a continuation search over its rectified mask.
///
/// The lane pixels are colored as in [`render_search_windows`] and the band of `margin`
/// around each seed fit is blended in green.
pub fn render_continuation(
    mask: &BinaryMask,
    result: &SearchResult,
    left: &LaneFit,
    right: &LaneFit,
    margin: f64,
) -> Result<Frame, ImageError> {
    let base = paint_lane_pixels(mask, result)?;
    let height = mask.rows();

    let mut bands = Image::from_size_val(mask.size(), 0u8)?;
    for fit in [left, right] {
        fill_poly(&mut bands, &band_polygon(fit, fit, height, margin), WINDOW_COLOR);
    }

    let mut output = Image::from_size_val(mask.size(), 0u8)?;
    add_weighted(&base, 1.0, &bands, BAND_WEIGHT, 0.0, &mut output)?;
    Ok(output)
}
