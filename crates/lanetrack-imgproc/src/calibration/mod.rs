/// image distortion module.
pub mod distortion;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use distortion::PolynomialDistortion;

/// An error type for the calibration module.
#[derive(thiserror::Error, Debug)]
pub enum CalibrationError {
    /// Error when the file does not exist.
    #[error("File does not exist: {0}")]
    FileDoesNotExist(PathBuf),

    /// Error to open or write the file.
    #[error("Failed to manipulate the file. {0}")]
    FileError(#[from] std::io::Error),

    /// Error to encode or decode the calibration record.
    #[error("Invalid calibration record. {0}")]
    JsonError(#[from] serde_json::Error),

    /// The camera matrix has a non positive focal length or non finite entries.
    #[error("Invalid camera matrix: {0:?}")]
    InvalidCameraMatrix([[f64; 3]; 3]),
}

/// Represents the instrinsic parameters of a pinhole camera
///
/// # Fields
///
/// * `fx` - The focal length in the x direction
/// * `fy` - The focal length in the y direction
/// * `cx` - The x coordinate of the principal point
/// * `cy` - The y coordinate of the principal point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraIntrinsic {
    /// The focal length in the x direction
    pub fx: f64,
    /// The focal length in the y direction
    pub fy: f64,
    /// The x coordinate of the principal point
    pub cx: f64,
    /// The y coordinate of the principal point
    pub cy: f64,
}

/// Camera matrix and distortion coefficients estimated offline for one camera.
///
/// The distortion coefficients follow the `[k1, k2, p1, p2, k3]` ordering of the common
/// calibration toolchains. The record is loaded once and never changes afterwards.
///
/// # Example
///
/// ```
/// use lanetrack_imgproc::calibration::CameraCalibration;
///
/// let json = r#"{
///     "camera_matrix": [[1000.0, 0.0, 640.0], [0.0, 1000.0, 360.0], [0.0, 0.0, 1.0]],
///     "dist_coeffs": [-0.24, -0.02, 0.0, 0.0, 0.02]
/// }"#;
///
/// let calibration: CameraCalibration = serde_json::from_str(json).unwrap();
/// assert_eq!(calibration.intrinsic().cx, 640.0);
/// assert_eq!(calibration.distortion().k3, 0.02);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraCalibration {
    /// The 3x3 camera matrix, row-major.
    pub camera_matrix: [[f64; 3]; 3],
    /// The distortion coefficients `[k1, k2, p1, p2, k3]`.
    pub dist_coeffs: [f64; 5],
}

impl CameraCalibration {
    /// Create a calibration record from its camera matrix and distortion coefficients.
    pub fn new(
        camera_matrix: [[f64; 3]; 3],
        dist_coeffs: [f64; 5],
    ) -> Result<Self, CalibrationError> {
        let calibration = Self {
            camera_matrix,
            dist_coeffs,
        };
        calibration.validate()?;
        Ok(calibration)
    }

    /// Load a calibration record from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CalibrationError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CalibrationError::FileDoesNotExist(path.to_path_buf()));
        }

        let data = std::fs::read_to_string(path)?;
        let calibration: CameraCalibration = serde_json::from_str(&data)?;
        calibration.validate()?;

        log::info!("loaded camera calibration from {}", path.display());

        Ok(calibration)
    }

    /// Save the calibration record as pretty printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CalibrationError> {
        let path = path.as_ref();
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;

        log::info!("saved camera calibration to {}", path.display());

        Ok(())
    }

    /// The pinhole intrinsics stored in the camera matrix.
    pub fn intrinsic(&self) -> CameraIntrinsic {
        let k = &self.camera_matrix;
        CameraIntrinsic {
            fx: k[0][0],
            fy: k[1][1],
            cx: k[0][2],
            cy: k[1][2],
        }
    }

    /// The distortion model with the higher order rational terms set to zero.
    pub fn distortion(&self) -> PolynomialDistortion {
        let [k1, k2, p1, p2, k3] = self.dist_coeffs;
        PolynomialDistortion {
            k1,
            k2,
            k3,
            k4: 0.0,
            k5: 0.0,
            k6: 0.0,
            p1,
            p2,
        }
    }

    fn validate(&self) -> Result<(), CalibrationError> {
        let k = &self.camera_matrix;
        let finite = k.iter().flatten().all(|v| v.is_finite())
            && self.dist_coeffs.iter().all(|v| v.is_finite());
        if !finite || k[0][0] <= 0.0 || k[1][1] <= 0.0 {
            return Err(CalibrationError::InvalidCameraMatrix(*k));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calibration() -> Result<CameraCalibration, CalibrationError> {
        CameraCalibration::new(
            [[1156.9, 0.0, 665.9], [0.0, 1152.1, 388.7], [0.0, 0.0, 1.0]],
            [-0.2376, -0.0854, -0.0008, -0.0001, 0.1057],
        )
    }

    #[test]
    fn test_save_load_roundtrip() -> Result<(), CalibrationError> {
        let tmp_dir = tempfile::tempdir()?;
        let path = tmp_dir.path().join("calibration.json");

        let expected = calibration()?;
        expected.save(&path)?;
        let loaded = CameraCalibration::load(&path)?;

        assert_eq!(loaded, expected);
        Ok(())
    }

    #[test]
    fn test_load_missing_file() -> Result<(), CalibrationError> {
        let tmp_dir = tempfile::tempdir()?;
        let path = tmp_dir.path().join("missing.json");
        assert!(matches!(
            CameraCalibration::load(&path),
            Err(CalibrationError::FileDoesNotExist(_))
        ));
        Ok(())
    }

    #[test]
    fn test_load_malformed() -> Result<(), CalibrationError> {
        let tmp_dir = tempfile::tempdir()?;
        let path = tmp_dir.path().join("broken.json");
        std::fs::write(&path, r#"{ "camera_matrix": [[1.0]] }"#)?;
        assert!(matches!(
            CameraCalibration::load(&path),
            Err(CalibrationError::JsonError(_))
        ));
        Ok(())
    }

    #[test]
    fn test_invalid_focal_length() {
        let result = CameraCalibration::new(
            [[0.0, 0.0, 640.0], [0.0, 1000.0, 360.0], [0.0, 0.0, 1.0]],
            [0.0; 5],
        );
        assert!(matches!(
            result,
            Err(CalibrationError::InvalidCameraMatrix(_))
        ));
    }

    #[test]
    fn test_coefficient_order() -> Result<(), CalibrationError> {
        let calibration = calibration()?;
        let distortion = calibration.distortion();
        assert_eq!(distortion.k1, -0.2376);
        assert_eq!(distortion.p1, -0.0008);
        assert_eq!(distortion.p2, -0.0001);
        assert_eq!(distortion.k3, 0.1057);
        assert_eq!(calibration.intrinsic().fy, 1152.1);
        Ok(())
    }
}
