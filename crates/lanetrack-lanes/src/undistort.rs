use lanetrack_image::{Frame, Image, ImageError, ImageSize};
use lanetrack_imgproc::calibration::{
    distortion::{undistort_image, CorrectionMap},
    CameraCalibration,
};

/// Removes lens distortion from raw frames before they enter the pipeline.
pub trait Undistort {
    /// Return the undistorted version of `frame`, same size as the input.
    fn undistort(&self, frame: &Frame) -> Result<Frame, ImageError>;
}

/// Passes frames through unchanged, for inputs that are already undistorted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoUndistortion;

impl Undistort for NoUndistortion {
    fn undistort(&self, frame: &Frame) -> Result<Frame, ImageError> {
        Ok(frame.clone())
    }
}

/// Undistorts frames of a fixed size with a calibrated polynomial lens model.
///
/// The correction maps are computed once at construction and reused for every frame.
///
/// # Example
///
/// ```
/// use lanetrack_image::{Image, ImageSize};
/// use lanetrack_imgproc::calibration::CameraCalibration;
/// use lanetrack_lanes::{CalibratedUndistortion, Undistort};
///
/// let calibration = CameraCalibration::new(
///     [[128.0, 0.0, 8.0], [0.0, 128.0, 4.0], [0.0, 0.0, 1.0]],
///     [0.0; 5],
/// )
/// .unwrap();
///
/// let size = ImageSize { width: 16, height: 8 };
/// let undistort = CalibratedUndistortion::new(&calibration, size).unwrap();
///
/// let frame = Image::<u8, 3>::from_size_val(size, 7).unwrap();
/// let undistorted = undistort.undistort(&frame).unwrap();
/// assert_eq!(undistorted.as_slice(), frame.as_slice());
/// ```
#[derive(Debug, Clone)]
pub struct CalibratedUndistortion {
    map: CorrectionMap,
}

impl CalibratedUndistortion {
    /// Precompute the correction maps for frames of the given size.
    pub fn new(calibration: &CameraCalibration, size: ImageSize) -> Result<Self, ImageError> {
        let map = CorrectionMap::new(&calibration.intrinsic(), &calibration.distortion(), size)?;
        Ok(Self { map })
    }

    /// The frame size the maps were computed for.
    pub fn size(&self) -> ImageSize {
        self.map.size()
    }
}

impl Undistort for CalibratedUndistortion {
    fn undistort(&self, frame: &Frame) -> Result<Frame, ImageError> {
        let size = self.size();
        if frame.size() != size {
            return Err(ImageError::InvalidImageSize(
                frame.width(),
                frame.height(),
                size.width,
                size.height,
            ));
        }

        let mut dst = Image::from_size_val(size, 0u8)?;
        undistort_image(frame, &mut dst, &self.map)?;
        Ok(dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lanetrack_imgproc::calibration::CalibrationError;

    fn calibration(k1: f64) -> Result<CameraCalibration, CalibrationError> {
        CameraCalibration::new(
            [[200.0, 0.0, 32.0], [0.0, 200.0, 16.0], [0.0, 0.0, 1.0]],
            [k1, 0.0, 0.0, 0.0, 0.0],
        )
    }

    #[test]
    fn pass_through() -> Result<(), ImageError> {
        let frame = Image::new(
            ImageSize {
                width: 2,
                height: 1,
            },
            vec![1, 2, 3, 4, 5, 6],
        )?;
        let output = NoUndistortion.undistort(&frame)?;
        assert_eq!(output.as_slice(), frame.as_slice());
        Ok(())
    }

    #[test]
    fn rejects_other_sizes() -> Result<(), Box<dyn std::error::Error>> {
        let undistort = CalibratedUndistortion::new(
            &calibration(0.0)?,
            ImageSize {
                width: 64,
                height: 32,
            },
        )?;
        let frame = Image::from_size_val(
            ImageSize {
                width: 32,
                height: 32,
            },
            0u8,
        )?;
        assert!(matches!(
            undistort.undistort(&frame),
            Err(ImageError::InvalidImageSize(32, 32, 64, 32))
        ));
        Ok(())
    }

    #[test]
    fn distortion_keeps_the_principal_point() -> Result<(), Box<dyn std::error::Error>> {
        let size = ImageSize {
            width: 64,
            height: 32,
        };
        let undistort = CalibratedUndistortion::new(&calibration(-0.3)?, size)?;

        let mut frame = Image::from_size_val(size, 0u8)?;
        for ch in 0..3 {
            frame.set_pixel(32, 16, ch, 200)?;
        }

        let output = undistort.undistort(&frame)?;
        assert_eq!(output.size(), size);
        assert_eq!(*output.get_pixel(32, 16, 0)?, 200);
        // away from the principal point the frame is black
        assert_eq!(*output.get_pixel(0, 0, 0)?, 0);
        Ok(())
    }
}
