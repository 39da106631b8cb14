//! Per-frame pipeline: observation in, pointer actions out.

use facecursor_calibration::ActiveCalibration;
use facecursor_common::config::AppConfig;
use facecursor_common::error::{FacecursorError, FacecursorResult};
use facecursor_model::action::PointerAction;
use facecursor_model::geometry::Point2D;
use facecursor_model::observation::{FrameObservation, TimestampNs};

use crate::aggregate::LandmarkSubset;
use crate::blink::{BlinkEvent, BlinkStateMachine};
use crate::mapper::{MapperConfig, MappingMode, MotionMapper};

/// What one frame produced.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameOutput {
    /// New cursor position, `None` when the frame had no usable input.
    pub cursor: Option<Point2D>,
    /// Actions in dispatch order: the move first, then any button events.
    pub actions: Vec<PointerAction>,
}

/// Owns the tracking state for one session.
#[derive(Debug, Clone)]
pub struct FramePipeline {
    subset: LandmarkSubset,
    mapper: MotionMapper,
    blink: BlinkStateMachine,
    calibration: Option<ActiveCalibration>,
}

impl FramePipeline {
    pub fn new(
        subset: LandmarkSubset,
        mapper_config: MapperConfig,
        long_press_secs: f64,
    ) -> FacecursorResult<Self> {
        if !(long_press_secs.is_finite() && long_press_secs >= 0.0) {
            return Err(FacecursorError::config(format!(
                "long-press threshold must be a non-negative number of seconds, got {long_press_secs}"
            )));
        }
        Ok(Self {
            subset,
            mapper: MotionMapper::new(mapper_config)?,
            blink: BlinkStateMachine::new(long_press_secs),
            calibration: None,
        })
    }

    pub fn from_config(config: &AppConfig) -> FacecursorResult<Self> {
        Self::new(
            LandmarkSubset::from_setting(&config.pointer.landmarks),
            MapperConfig::from_defaults(&config.pointer),
            config.blink.long_press_secs,
        )
    }

    /// Read calibrated parameters from `calibration` on every frame.
    pub fn with_calibration(mut self, calibration: ActiveCalibration) -> Self {
        self.calibration = Some(calibration);
        self
    }

    pub fn process(&mut self, observation: &FrameObservation) -> FrameOutput {
        let mut output = FrameOutput::default();
        let t = observation.timestamp_ns;

        if let Some(cursor) = self.track(observation) {
            output.cursor = Some(cursor);
            output.actions.push(PointerAction::move_to(t, cursor.x, cursor.y));
        }

        let events = self
            .blink
            .update(observation.blinking, observation.timestamp_secs());
        let at = self.mapper.cursor();
        output
            .actions
            .extend(events.into_iter().map(|event| button_action(event, t, at)));

        output
    }

    /// Move the cursor for this frame, if the frame carries usable input.
    fn track(&mut self, observation: &FrameObservation) -> Option<Point2D> {
        match self.mapper.config().mode {
            MappingMode::AnchorCumulative | MappingMode::SmoothedBaseline => {
                let landmarks = observation.landmarks.as_ref()?;
                let position = self.subset.position(
                    landmarks,
                    observation.frame_width,
                    observation.frame_height,
                )?;
                position
                    .is_finite()
                    .then(|| self.mapper.update(position, observation.gaze))
            }
            MappingMode::AbsoluteGaze => {
                let target = self.gaze_target(observation)?;
                target
                    .is_finite()
                    .then(|| self.mapper.update_absolute(target, observation.gaze))
            }
        }
    }

    /// Calibrated prediction from the eye position when a model is active,
    /// otherwise the detector's own gaze point.
    fn gaze_target(&self, observation: &FrameObservation) -> Option<Point2D> {
        let calibrated = self
            .calibration
            .as_ref()
            .and_then(ActiveCalibration::snapshot)
            .and_then(|params| params.model)
            .zip(observation.eye_position)
            .map(|(model, eye)| model.predict(eye));
        calibrated.or(observation.gaze_point)
    }

    pub fn reset_anchor(&mut self) {
        self.mapper.reset_anchor();
    }

    /// Release a held press, e.g. when the session ends mid-drag.
    pub fn release_held(&mut self, timestamp_ns: TimestampNs) -> Option<PointerAction> {
        let at = self.mapper.cursor();
        self.blink
            .reset()
            .map(|event| button_action(event, timestamp_ns, at))
    }

    pub fn cursor(&self) -> Point2D {
        self.mapper.cursor()
    }

    pub fn mapper(&self) -> &MotionMapper {
        &self.mapper
    }

    pub fn blink(&self) -> &BlinkStateMachine {
        &self.blink
    }
}

fn button_action(event: BlinkEvent, t: TimestampNs, at: Point2D) -> PointerAction {
    match event {
        BlinkEvent::Click => PointerAction::click(t, at.x, at.y),
        BlinkEvent::Press => PointerAction::down(t, at.x, at.y),
        BlinkEvent::Release => PointerAction::up(t, at.x, at.y),
    }
}
