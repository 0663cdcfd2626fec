use std::borrow::Borrow;

use lanetrack_image::Frame;

use crate::{
    config::LaneConfig,
    error::LaneError,
    fit::LaneFit,
    geometry::{GeometryEstimator, LaneGeometry},
    overlay::OverlayRenderer,
    rectify::PerspectiveRectifier,
    search::{ContinuationSearch, LanePixelSearch, SlidingWindowSearch},
    threshold::LaneThresholder,
    undistort::{NoUndistortion, Undistort},
};

/// Lane fits carried from one frame to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum TrackerState {
    /// No usable fit, the next frame runs a sliding window search.
    #[default]
    Cold,
    /// The last frame was fitted, the next frame searches around these fits.
    Tracking {
        /// The left lane line of the last frame.
        left: LaneFit,
        /// The right lane line of the last frame.
        right: LaneFit,
    },
}

/// The search strategy used for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Histogram bases and stacked windows.
    SlidingWindow,
    /// Band around the fits of the previous frame.
    Continuation,
}

/// How far a frame got through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// Both lines were fitted and the geometry estimated.
    Tracked,
    /// The lane was fitted and drawn but its geometry could not be estimated.
    GeometryFailed,
    /// Not enough lane pixels to fit both lines. The output is the undistorted frame.
    SearchFailed,
    /// The frame could not be processed at all. The output is the input frame.
    InvalidFrame,
}

/// Result of processing one frame.
#[derive(Debug, Clone)]
pub struct FrameOutput {
    /// The annotated frame.
    pub frame: Frame,
    /// Curvature and deviation, zeroed unless the status is [`FrameStatus::Tracked`].
    pub geometry: LaneGeometry,
    /// The left and right fits in the rectified view, if the search succeeded.
    pub fits: Option<(LaneFit, LaneFit)>,
    /// The search strategy used for the frame.
    pub mode: SearchMode,
    /// How far the frame got through the pipeline.
    pub status: FrameStatus,
}

/// Tracks the lane boundaries over a sequence of frames.
///
/// A failed frame never aborts the sequence. Its output is degraded and the tracker goes
/// back to [`TrackerState::Cold`].
///
/// # Example
///
/// ```
/// use lanetrack_image::Frame;
/// use lanetrack_lanes::{FrameStatus, LaneConfig, LaneTracker, NoUndistortion, TrackerState};
///
/// let config = LaneConfig::default();
/// let mut tracker = LaneTracker::new(config.clone(), NoUndistortion).unwrap();
///
/// let frame = Frame::from_size_val(config.frame_size(), 0).unwrap();
/// let output = tracker.process_frame(&frame);
///
/// assert_eq!(output.status, FrameStatus::SearchFailed);
/// assert_eq!(output.frame.as_slice(), frame.as_slice());
/// assert_eq!(tracker.state(), &TrackerState::Cold);
/// ```
pub struct LaneTracker<U: Undistort = NoUndistortion> {
    config: LaneConfig,
    undistort: U,
    thresholder: LaneThresholder,
    rectifier: PerspectiveRectifier,
    sliding_window: SlidingWindowSearch,
    estimator: GeometryEstimator,
    overlay: OverlayRenderer,
    state: TrackerState,
}

impl<U: Undistort> LaneTracker<U> {
    /// Create a tracker in the [`TrackerState::Cold`] state.
    ///
    /// # Arguments
    ///
    /// * `config` - The pipeline configuration, validated here.
    /// * `undistort` - Lens correction applied to every frame first.
    pub fn new(config: LaneConfig, undistort: U) -> Result<Self, LaneError> {
        config.validate()?;

        let size = config.frame_size();
        let rectifier = PerspectiveRectifier::new(&config.rectifier, size)?;

        Ok(Self {
            thresholder: LaneThresholder::new(config.threshold.clone()),
            sliding_window: SlidingWindowSearch::new(config.search.clone()),
            estimator: GeometryEstimator::new(config.geometry.clone(), size),
            overlay: OverlayRenderer::new(config.overlay.clone()),
            rectifier,
            undistort,
            config,
            state: TrackerState::Cold,
        })
    }

    /// The pipeline configuration.
    pub fn config(&self) -> &LaneConfig {
        &self.config
    }

    /// The fits carried to the next frame.
    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    /// The rectifier between the camera view and the top-down view.
    pub fn rectifier(&self) -> &PerspectiveRectifier {
        &self.rectifier
    }

    /// Drop the carried fits, the next frame starts cold.
    pub fn reset(&mut self) {
        self.state = TrackerState::Cold;
    }

    fn mode(&self) -> SearchMode {
        match self.state {
            TrackerState::Cold => SearchMode::SlidingWindow,
            TrackerState::Tracking { .. } => SearchMode::Continuation,
        }
    }

    /// Process the next frame of the sequence.
    ///
    /// Every failure is absorbed here and reported through [`FrameOutput::status`].
    pub fn process_frame(&mut self, frame: &Frame) -> FrameOutput {
        let mode = self.mode();

        match self.track(frame, mode) {
            Ok(output) => output,
            Err(err) => {
                log::warn!("invalid frame: {err}");
                self.reset();
                FrameOutput {
                    frame: frame.clone(),
                    geometry: LaneGeometry::default(),
                    fits: None,
                    mode,
                    status: FrameStatus::InvalidFrame,
                }
            }
        }
    }

    /// Process frames lazily, in order, with the state carried between them.
    pub fn process_sequence<'a, I>(
        &'a mut self,
        frames: I,
    ) -> impl Iterator<Item = FrameOutput> + 'a
    where
        I: IntoIterator,
        I::IntoIter: 'a,
        I::Item: Borrow<Frame>,
    {
        frames
            .into_iter()
            .map(move |frame| self.process_frame(frame.borrow()))
    }

    fn track(&mut self, frame: &Frame, mode: SearchMode) -> Result<FrameOutput, LaneError> {
        let expected = self.config.frame_size();
        if frame.size() != expected {
            return Err(LaneError::FrameSizeMismatch {
                expected,
                actual: frame.size(),
            });
        }

        let undistorted = self.undistort.undistort(frame)?;
        let mask = self.thresholder.apply(&undistorted)?;
        let warped = self.rectifier.rectify(&mask)?;

        let pixels = match self.state {
            TrackerState::Cold => self.sliding_window.search(&warped)?,
            TrackerState::Tracking { left, right } => {
                ContinuationSearch::new(left, right, self.config.search.continuation_margin)
                    .search(&warped)?
            }
        };

        log::debug!(
            "{mode:?} search: {} left and {} right lane pixels",
            pixels.left.len(),
            pixels.right.len()
        );

        let (left, right) = match pixels.fit() {
            Ok(fits) => fits,
            Err(err) => {
                log::warn!("lane fit failed: {err}");
                self.reset();
                return Ok(FrameOutput {
                    frame: undistorted,
                    geometry: LaneGeometry::default(),
                    fits: None,
                    mode,
                    status: FrameStatus::SearchFailed,
                });
            }
        };

        self.state = TrackerState::Tracking { left, right };

        let mut output = self
            .overlay
            .draw_lane(&undistorted, &self.rectifier, &left, &right)?;

        let (geometry, status) = match self.estimator.estimate(&left, &right) {
            Ok(geometry) => {
                self.overlay.annotate(&mut output, Some(&geometry));
                (geometry, FrameStatus::Tracked)
            }
            Err(err) => {
                log::warn!("lane geometry failed: {err}");
                self.overlay.annotate(&mut output, None);
                (LaneGeometry::default(), FrameStatus::GeometryFailed)
            }
        };

        Ok(FrameOutput {
            frame: output,
            geometry,
            fits: Some((left, right)),
            mode,
            status,
        })
    }
}
