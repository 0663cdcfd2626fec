use super::CameraIntrinsic;
use crate::interpolation::{grid::meshgrid_from_fn, remap, InterpolationMode};
use lanetrack_image::{Image, ImageDtype, ImageError, ImageSize};

/// Represents the polynomial distortion parameters of a camera
///
/// # Fields
///
/// * `k1` - The first radial distortion coefficient
/// * `k2` - The second radial distortion coefficient
/// * `k3` - The third radial distortion coefficient
/// * `k4` - The fourth radial distortion coefficient
/// * `k5` - The fifth radial distortion coefficient
/// * `k6` - The sixth radial distortion coefficient
/// * `p1` - The first tangential distortion coefficient
/// * `p2` - The second tangential distortion coefficient
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolynomialDistortion {
    /// The first radial distortion coefficient
    pub k1: f64,
    /// The second radial distortion coefficient
    pub k2: f64,
    /// The third radial distortion coefficient
    pub k3: f64,
    /// The fourth radial distortion coefficient
    pub k4: f64,
    /// The fifth radial distortion coefficient
    pub k5: f64,
    /// The sixth radial distortion coefficient
    pub k6: f64,
    /// The first tangential distortion coefficient
    pub p1: f64,
    /// The second tangential distortion coefficient
    pub p2: f64,
}

/// Distort a point using polynomial distortion
///
/// # Arguments
///
/// * `x` - The x coordinate of the point
/// * `y` - The y coordinate of the point
/// * `intrinsic` - The intrinsic parameters of the camera
/// * `distortion` - The distortion parameters of the camera
///
/// # Returns
///
/// * `x` - The x coordinate of the distorted point
/// * `y` - The y coordinate of the distorted point
pub fn distort_point_polynomial(
    x: f64,
    y: f64,
    intrinsic: &CameraIntrinsic,
    distortion: &PolynomialDistortion,
) -> (f64, f64) {
    let (fx, fy, cx, cy) = (intrinsic.fx, intrinsic.fy, intrinsic.cx, intrinsic.cy);
    let PolynomialDistortion {
        k1,
        k2,
        k3,
        k4,
        k5,
        k6,
        p1,
        p2,
    } = *distortion;

    // normalize the coordinates
    let x = (x - cx) / fx;
    let y = (y - cy) / fy;

    let r2 = x * x + y * y;

    // radial distortion
    let kr = (1.0 + k1 * r2 + k2 * r2 * r2 + k3 * r2 * r2 * r2)
        / (1.0 + k4 * r2 + k5 * r2 * r2 + k6 * r2 * r2 * r2);

    // tangential distortion
    let xd = x * kr + 2.0 * p1 * x * y + p2 * (r2 + 2.0 * x * x);
    let yd = y * kr + p1 * (r2 + 2.0 * y * y) + 2.0 * p2 * x * y;

    // denormalize the coordinates
    (fx * xd + cx, fy * yd + cy)
}

/// Generate the undistortion map for a polynomial distortion model
///
/// The new camera matrix equals the original one, so undistorted pixel `(x, y)` samples
/// the distorted image at `distort(x, y)`.
///
/// # Arguments
///
/// * `intrinsic` - The intrinsic parameters of the camera
/// * `distortion` - The distortion parameters of the camera
/// * `size` - The size of the image
///
/// # Returns
///
/// * `map_x` - The x map for undistorting the image
/// * `map_y` - The y map for undistorting the image
pub fn generate_correction_map_polynomial(
    intrinsic: &CameraIntrinsic,
    distortion: &PolynomialDistortion,
    size: &ImageSize,
) -> Result<(Image<f32, 1>, Image<f32, 1>), ImageError> {
    meshgrid_from_fn(size.width, size.height, |x, y| {
        let (xdst, ydst) = distort_point_polynomial(x as f64, y as f64, intrinsic, distortion);
        (xdst as f32, ydst as f32)
    })
}

/// Precomputed sampling maps that undo the lens distortion of frames of one size.
#[derive(Debug, Clone)]
pub struct CorrectionMap {
    map_x: Image<f32, 1>,
    map_y: Image<f32, 1>,
}

impl CorrectionMap {
    /// Compute the maps for images of the given size.
    pub fn new(
        intrinsic: &CameraIntrinsic,
        distortion: &PolynomialDistortion,
        size: ImageSize,
    ) -> Result<Self, ImageError> {
        let (map_x, map_y) = generate_correction_map_polynomial(intrinsic, distortion, &size)?;
        Ok(Self { map_x, map_y })
    }

    /// The image size the maps were computed for.
    pub fn size(&self) -> ImageSize {
        self.map_x.size()
    }
}

/// Remove lens distortion from an image with bilinear sampling.
///
/// Pixels that sample outside the source are set to zero.
///
/// # Arguments
///
/// * `src` - The distorted image, the size of `map`.
/// * `dst` - The undistorted image, same size as `src`.
/// * `map` - The correction maps of the camera.
pub fn undistort_image<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    map: &CorrectionMap,
) -> Result<(), ImageError> {
    crate::ensure_same_size(src.size(), map.size())?;
    crate::ensure_same_size(src.size(), dst.size())?;

    remap(src, dst, &map.map_x, &map.map_y, InterpolationMode::Bilinear)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intrinsic() -> CameraIntrinsic {
        CameraIntrinsic {
            fx: 100.0,
            fy: 100.0,
            cx: 4.0,
            cy: 2.0,
        }
    }

    fn no_distortion() -> PolynomialDistortion {
        PolynomialDistortion {
            k1: 0.0,
            k2: 0.0,
            k3: 0.0,
            k4: 0.0,
            k5: 0.0,
            k6: 0.0,
            p1: 0.0,
            p2: 0.0,
        }
    }

    #[test]
    fn test_distort_point_polynomial() {
        let distortion = PolynomialDistortion {
            k1: 0.5,
            ..no_distortion()
        };

        // one focal length away from the principal point r² = 1
        let (x, y) = distort_point_polynomial(104.0, 2.0, &intrinsic(), &distortion);
        approx::assert_relative_eq!(x, 4.0 + 100.0 * 1.5);
        approx::assert_relative_eq!(y, 2.0);

        // the principal point never moves
        let (x, y) = distort_point_polynomial(4.0, 2.0, &intrinsic(), &distortion);
        assert_eq!((x, y), (4.0, 2.0));
    }

    #[test]
    fn test_undistort_identity() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 8,
            height: 4,
        };
        let data = (0..size.width * size.height * 3)
            .map(|v| (v % 256) as u8)
            .collect::<Vec<_>>();
        let src = Image::<u8, 3>::new(size, data)?;
        let mut dst = Image::<u8, 3>::from_size_val(size, 0)?;

        let map = CorrectionMap::new(&intrinsic(), &no_distortion(), size)?;
        undistort_image(&src, &mut dst, &map)?;
        assert_eq!(dst, src);

        // the maps only fit images of their own size
        let other = Image::<u8, 3>::from_size_val(
            ImageSize {
                width: 4,
                height: 4,
            },
            0,
        )?;
        let mut other_dst = other.clone();
        assert!(matches!(
            undistort_image(&other, &mut other_dst, &map),
            Err(ImageError::InvalidImageSize(4, 4, 8, 4))
        ));

        Ok(())
    }

    #[test]
    fn test_correction_map_shape() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 8,
            height: 4,
        };
        let distortion = PolynomialDistortion {
            k1: -0.2,
            ..no_distortion()
        };
        let (map_x, map_y) = generate_correction_map_polynomial(&intrinsic(), &distortion, &size)?;
        assert_eq!(map_x.size(), size);
        assert_eq!(map_y.size(), size);

        // barrel distortion pulls samples towards the principal point
        let x = map_x.as_slice()[7];
        assert!(x < 7.0 && x > 4.0);

        Ok(())
    }
}
