use lanetrack_image::ImageSize;
use serde::{Deserialize, Serialize};

use crate::{config::GeometryConfig, error::GeometryError, fit::LaneFit};

/// Side of the lane center the vehicle is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Left of the lane center.
    Left,
    /// Right of the lane center.
    Right,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Curvature and lateral position of the lane in one frame.
///
/// The default value is the zeroed geometry reported when estimation fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LaneGeometry {
    /// Radius of curvature of the left lane line in meters.
    pub left_radius: f64,
    /// Radius of curvature of the right lane line in meters.
    pub right_radius: f64,
    /// Lateral deviation from the lane center in meters, positive to the left.
    pub deviation: f64,
}

impl LaneGeometry {
    /// Side of the lane center the vehicle is on.
    pub fn side(&self) -> Side {
        if self.deviation > 0.0 {
            Side::Left
        } else {
            Side::Right
        }
    }
}

/// Converts a pair of pixel space fits into world unit curvature and deviation.
#[derive(Debug, Clone)]
pub struct GeometryEstimator {
    config: GeometryConfig,
    size: ImageSize,
}

impl GeometryEstimator {
    /// Create the estimator for rectified views of the given size.
    pub fn new(config: GeometryConfig, size: ImageSize) -> Self {
        Self { config, size }
    }

    /// Radius of curvature in meters at the bottom row of the view.
    ///
    /// The fit is sampled at every row, re-fitted in meters and evaluated at
    /// `y_eval = height - 1`. A line without curvature has an infinite radius.
    ///
    /// # Errors
    ///
    /// [`GeometryError::Refit`] when the samples cannot be re-fitted, and
    /// [`GeometryError::NonFinite`] when the radius is not a number.
    pub fn radius_of_curvature(&self, fit: &LaneFit) -> Result<f64, GeometryError> {
        let (ym, xm) = (self.config.ym_per_pix, self.config.xm_per_pix);
        let height = self.size.height;

        let ys = (0..height).map(|y| y as f64 * ym).collect::<Vec<_>>();
        let xs = fit.sample(height).iter().map(|x| x * xm).collect::<Vec<_>>();
        let world = LaneFit::fit(&ys, &xs)?;

        let y_eval = height.saturating_sub(1) as f64 * ym;
        let slope = 2.0 * world.a * y_eval + world.b;
        let radius = (1.0 + slope * slope).powf(1.5) / (2.0 * world.a).abs();

        if radius.is_nan() {
            return Err(GeometryError::NonFinite("radius of curvature"));
        }

        Ok(radius)
    }

    /// Lateral deviation of the camera from the lane center in meters.
    ///
    /// Both fits are evaluated at `y = height`. Positive values put the vehicle left of
    /// the center. The camera mounting offset is added last.
    pub fn deviation(&self, left: &LaneFit, right: &LaneFit) -> Result<f64, GeometryError> {
        let y = self.size.height as f64;
        let center = (left.eval(y) + right.eval(y)) / 2.0;
        let deviation = (self.size.width as f64 / 2.0 - center) * self.config.xm_per_pix
            + self.config.camera_offset;

        if !deviation.is_finite() {
            return Err(GeometryError::NonFinite("deviation"));
        }

        Ok(deviation)
    }

    /// Estimate curvature and deviation from both lane lines.
    pub fn estimate(&self, left: &LaneFit, right: &LaneFit) -> Result<LaneGeometry, GeometryError> {
        let geometry = LaneGeometry {
            left_radius: self.radius_of_curvature(left)?,
            right_radius: self.radius_of_curvature(right)?,
            deviation: self.deviation(left, right)?,
        };

        log::debug!(
            "lane geometry: radii {:.1}m / {:.1}m, deviation {:.3}m",
            geometry.left_radius,
            geometry.right_radius,
            geometry.deviation
        );

        Ok(geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FitError;

    fn estimator() -> GeometryEstimator {
        GeometryEstimator::new(
            GeometryConfig::default(),
            ImageSize {
                width: 1280,
                height: 720,
            },
        )
    }

    #[test]
    fn straight_lines_have_a_large_radius() -> Result<(), GeometryError> {
        let estimator = estimator();
        let radius = estimator.radius_of_curvature(&LaneFit::new(0.0, 0.0, 300.0))?;
        assert!(radius > 2000.0);
        Ok(())
    }

    #[test]
    fn radius_of_a_known_curve() -> Result<(), GeometryError> {
        let estimator = estimator();
        let (ym, xm): (f64, f64) = (30.0 / 720.0, 3.7 / 700.0);

        // x = a·y² in pixels is x' = a·xm/ym²·y'² in meters
        let a: f64 = 5e-4;
        let aw = a * xm / (ym * ym);
        let y_eval = 719.0 * ym;
        let expected = (1.0 + (2.0 * aw * y_eval).powi(2)).powf(1.5) / (2.0 * aw).abs();

        let radius = estimator.radius_of_curvature(&LaneFit::new(a, 0.0, 300.0))?;
        approx::assert_relative_eq!(radius, expected, max_relative = 1e-6);
        Ok(())
    }

    #[test]
    fn deviation_sign_and_offset() -> Result<(), GeometryError> {
        let estimator = estimator();
        let xm = 3.7 / 700.0;

        // lane centered at 620, left of the image center
        let deviation =
            estimator.deviation(&LaneFit::new(0.0, 0.0, 320.0), &LaneFit::new(0.0, 0.0, 920.0))?;
        approx::assert_relative_eq!(deviation, 20.0 * xm + 0.10);
        assert!(deviation > 0.0);

        // centered lane leaves just the camera offset
        let deviation =
            estimator.deviation(&LaneFit::new(0.0, 0.0, 340.0), &LaneFit::new(0.0, 0.0, 940.0))?;
        approx::assert_relative_eq!(deviation, 0.10);

        let geometry = LaneGeometry {
            deviation: -0.2,
            ..Default::default()
        };
        assert_eq!(geometry.side(), Side::Right);
        Ok(())
    }

    #[test]
    fn degenerate_view_fails_to_refit() {
        let estimator = GeometryEstimator::new(
            GeometryConfig::default(),
            ImageSize {
                width: 1280,
                height: 2,
            },
        );
        assert_eq!(
            estimator.radius_of_curvature(&LaneFit::new(0.0, 0.0, 1.0)),
            Err(GeometryError::Refit(FitError::InsufficientData(2)))
        );
    }

    #[test]
    fn non_finite_fit_is_an_error() {
        let estimator = estimator();
        let fit = LaneFit::new(0.0, 0.0, f64::INFINITY);
        assert!(estimator.deviation(&fit, &fit).is_err());
        assert!(estimator.estimate(&fit, &fit).is_err());
    }
}
