//! Head motion to cursor position.
//!
//! The mapper keeps a raw target that accumulates scaled head displacement
//! and an exponentially smoothed cursor that chases it. Only the smoothed
//! cursor is clamped to the screen; the raw target may drift past the edges.

use facecursor_common::config::{MappingModeSetting, PointerDefaults};
use facecursor_common::error::{FacecursorError, FacecursorResult};
use facecursor_model::geometry::{Point2D, ScreenBounds};
use facecursor_model::observation::GazeDirection;

/// How a frame's input turns into a raw cursor target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MappingMode {
    /// Displacement from a fixed anchor, latched on the first frame and
    /// added to the raw target every frame.
    #[default]
    AnchorCumulative,

    /// Like `AnchorCumulative`, but the anchor follows the head with the
    /// same smoothing factor, so a held offset decays instead of drifting.
    SmoothedBaseline,

    /// The raw target is an absolute screen point supplied per frame.
    AbsoluteGaze,
}

impl MappingMode {
    pub fn from_setting(setting: MappingModeSetting) -> Self {
        match setting {
            MappingModeSetting::AnchorCumulative => MappingMode::AnchorCumulative,
            MappingModeSetting::SmoothedBaseline => MappingMode::SmoothedBaseline,
            MappingModeSetting::AbsoluteGaze => MappingMode::AbsoluteGaze,
        }
    }

    /// Whether this mode consumes aggregated landmark positions.
    pub fn uses_anchor(&self) -> bool {
        !matches!(self, MappingMode::AbsoluteGaze)
    }
}

/// Mapper parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct MapperConfig {
    pub mode: MappingMode,

    /// Screen pixels per pixel of head displacement.
    pub sensitivity: f64,

    /// Weight of the new target in the moving average, in (0, 1].
    pub smoothing_alpha: f64,

    /// Per-frame bias toward a non-center gaze direction, in pixels.
    pub nudge_step_px: f64,

    pub screen: ScreenBounds,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self::from_defaults(&PointerDefaults::default())
    }
}

impl MapperConfig {
    pub fn from_defaults(defaults: &PointerDefaults) -> Self {
        Self {
            mode: MappingMode::from_setting(defaults.mode),
            sensitivity: defaults.sensitivity,
            smoothing_alpha: defaults.smoothing_alpha,
            nudge_step_px: defaults.nudge_step_px,
            screen: ScreenBounds::new(defaults.screen_width, defaults.screen_height),
        }
    }

    pub fn validate(&self) -> FacecursorResult<()> {
        if !(self.smoothing_alpha > 0.0 && self.smoothing_alpha <= 1.0) {
            return Err(FacecursorError::config(format!(
                "smoothing alpha must be in (0, 1], got {}",
                self.smoothing_alpha
            )));
        }
        if !self.sensitivity.is_finite() {
            return Err(FacecursorError::config(format!(
                "sensitivity must be finite, got {}",
                self.sensitivity
            )));
        }
        if !self.nudge_step_px.is_finite() {
            return Err(FacecursorError::config(format!(
                "nudge step must be finite, got {}",
                self.nudge_step_px
            )));
        }
        if self.screen.is_empty() {
            return Err(FacecursorError::config(format!(
                "screen must have a non-zero size, got {}x{}",
                self.screen.width, self.screen.height
            )));
        }
        Ok(())
    }
}

/// Raw and smoothed cursor positions in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorState {
    /// Accumulated, unclamped target.
    pub raw_target: Point2D,
    /// Smoothed, clamped position sent to the pointer.
    pub smoothed: Point2D,
}

impl CursorState {
    fn at(point: Point2D) -> Self {
        Self {
            raw_target: point,
            smoothed: point,
        }
    }
}

/// Stateful head-motion to cursor mapper. Starts with the cursor at the
/// screen center and no anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionMapper {
    config: MapperConfig,
    anchor: Option<Point2D>,
    state: CursorState,
}

impl MotionMapper {
    pub fn new(config: MapperConfig) -> FacecursorResult<Self> {
        config.validate()?;
        let state = CursorState::at(config.screen.center());
        Ok(Self {
            config,
            anchor: None,
            state,
        })
    }

    /// Feed one aggregated head position; returns the new cursor position.
    /// Only meaningful in the anchor modes; `AbsoluteGaze` is driven through
    /// [`update_absolute`](Self::update_absolute).
    ///
    /// The first call after construction or [`reset_anchor`](Self::reset_anchor)
    /// latches the anchor and contributes zero displacement.
    pub fn update(&mut self, position: Point2D, gaze: Option<GazeDirection>) -> Point2D {
        debug_assert!(
            self.config.mode.uses_anchor(),
            "MotionMapper::update called in {:?} mode",
            self.config.mode
        );
        let anchor = match self.anchor {
            Some(anchor) => anchor,
            None => {
                tracing::debug!(x = position.x, y = position.y, "Anchor latched");
                self.anchor = Some(position);
                position
            }
        };

        let displacement = position.offset_from(&anchor);
        let raw = self.state.raw_target;
        let sensitivity = self.config.sensitivity;
        self.state.raw_target = Point2D::new(
            saturate(raw.x + displacement.x * sensitivity, raw.x),
            saturate(raw.y + displacement.y * sensitivity, raw.y),
        );

        if self.config.mode == MappingMode::SmoothedBaseline {
            self.anchor = Some(Point2D::lerp(
                &anchor,
                &position,
                self.config.smoothing_alpha,
            ));
        }

        self.advance(gaze)
    }

    /// Feed an absolute screen-space target (calibrated or raw gaze point).
    pub fn update_absolute(&mut self, target: Point2D, gaze: Option<GazeDirection>) -> Point2D {
        self.state.raw_target = target;
        self.advance(gaze)
    }

    /// Smooth toward the raw target, apply the gaze nudge, clamp.
    fn advance(&mut self, gaze: Option<GazeDirection>) -> Point2D {
        let alpha = self.config.smoothing_alpha;
        let target = self.state.raw_target;
        let previous = self.state.smoothed;
        let mut next = Point2D::new(
            alpha * target.x + (1.0 - alpha) * previous.x,
            alpha * target.y + (1.0 - alpha) * previous.y,
        );

        if let Some(direction) = gaze {
            let (dx, dy) = direction.unit_step();
            next.x += dx * self.config.nudge_step_px;
            next.y += dy * self.config.nudge_step_px;
        }

        if !next.x.is_finite() {
            next.x = previous.x;
        }
        if !next.y.is_finite() {
            next.y = previous.y;
        }

        self.state.smoothed = self.config.screen.clamp(next);
        self.state.smoothed
    }

    /// Forget the anchor; the next frame re-latches it. The raw target is
    /// re-seated on the current cursor so the pointer does not jump.
    pub fn reset_anchor(&mut self) {
        self.anchor = None;
        self.state.raw_target = self.state.smoothed;
        tracing::info!(
            x = self.state.smoothed.x,
            y = self.state.smoothed.y,
            "Anchor reset"
        );
    }

    pub fn cursor(&self) -> Point2D {
        self.state.smoothed
    }

    pub fn anchor(&self) -> Option<Point2D> {
        self.anchor
    }

    pub fn state(&self) -> &CursorState {
        &self.state
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }
}

/// Keep an accumulated coordinate finite: overflow pins to the largest
/// finite value, NaN keeps the previous one.
fn saturate(value: f64, previous: f64) -> f64 {
    if value.is_nan() {
        previous
    } else {
        value.clamp(f64::MIN, f64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper(mode: MappingMode, alpha: f64) -> MotionMapper {
        MotionMapper::new(MapperConfig {
            mode,
            sensitivity: 2.0,
            smoothing_alpha: alpha,
            nudge_step_px: 10.0,
            screen: ScreenBounds::new(1000, 800),
        })
        .unwrap()
    }

    #[test]
    fn test_starts_at_screen_center() {
        let m = mapper(MappingMode::AnchorCumulative, 0.5);
        assert_eq!(m.cursor(), Point2D::new(500.0, 400.0));
        assert!(m.anchor().is_none());
    }

    #[test]
    fn test_first_frame_latches_anchor_without_motion() {
        let mut m = mapper(MappingMode::AnchorCumulative, 0.5);
        let p = m.update(Point2D::new(320.0, 240.0), None);
        assert_eq!(p, Point2D::new(500.0, 400.0));
        assert_eq!(m.anchor(), Some(Point2D::new(320.0, 240.0)));
    }

    #[test]
    fn test_held_offset_accumulates() {
        let mut m = mapper(MappingMode::AnchorCumulative, 1.0);
        m.update(Point2D::new(100.0, 100.0), None);
        // 10px right, sensitivity 2: +20 per frame while held.
        assert_eq!(m.update(Point2D::new(110.0, 100.0), None).x, 520.0);
        assert_eq!(m.update(Point2D::new(110.0, 100.0), None).x, 540.0);
    }

    #[test]
    fn test_smoothing_moves_part_way() {
        let mut m = mapper(MappingMode::AnchorCumulative, 0.5);
        m.update(Point2D::new(100.0, 100.0), None);
        let p = m.update(Point2D::new(150.0, 100.0), None);
        // raw target 600, smoothed halfway from 500.
        assert_eq!(m.state().raw_target.x, 600.0);
        assert_eq!(p.x, 550.0);
    }

    #[test]
    fn test_raw_target_unclamped_but_cursor_clamped() {
        let mut m = mapper(MappingMode::AnchorCumulative, 1.0);
        m.update(Point2D::new(0.0, 0.0), None);
        let p = m.update(Point2D::new(1000.0, -1000.0), None);
        assert_eq!(p, Point2D::new(1000.0, 0.0));
        assert_eq!(m.state().raw_target, Point2D::new(2500.0, -1600.0));
    }

    #[test]
    fn test_gaze_nudge_direction() {
        let mut m = mapper(MappingMode::AnchorCumulative, 1.0);
        m.update(Point2D::new(0.0, 0.0), None);
        assert_eq!(
            m.update(Point2D::new(0.0, 0.0), Some(GazeDirection::Left)),
            Point2D::new(490.0, 400.0)
        );

        let mut m = mapper(MappingMode::AnchorCumulative, 1.0);
        m.update(Point2D::new(0.0, 0.0), None);
        assert_eq!(
            m.update(Point2D::new(0.0, 0.0), Some(GazeDirection::Down)),
            Point2D::new(500.0, 410.0)
        );
        assert_eq!(
            m.update(Point2D::new(0.0, 0.0), Some(GazeDirection::Center)),
            Point2D::new(500.0, 400.0)
        );
    }

    #[test]
    fn test_reset_anchor_reseats_target() {
        let mut m = mapper(MappingMode::AnchorCumulative, 0.5);
        m.update(Point2D::new(100.0, 100.0), None);
        let before = m.update(Point2D::new(150.0, 100.0), None);
        m.reset_anchor();
        assert!(m.anchor().is_none());
        assert_eq!(m.state().raw_target, before);

        // New anchor at the current head position: no jump.
        let after = m.update(Point2D::new(150.0, 100.0), None);
        assert_eq!(after, before);
    }

    #[test]
    fn test_smoothed_baseline_anchor_follows_head() {
        let mut m = mapper(MappingMode::SmoothedBaseline, 0.5);
        m.update(Point2D::new(100.0, 100.0), None);
        m.update(Point2D::new(200.0, 100.0), None);
        assert_eq!(m.anchor(), Some(Point2D::new(150.0, 100.0)));
    }

    #[test]
    fn test_absolute_target() {
        let mut m = mapper(MappingMode::AbsoluteGaze, 0.5);
        let p = m.update_absolute(Point2D::new(700.0, 200.0), None);
        assert_eq!(p, Point2D::new(600.0, 300.0));
        assert!(m.anchor().is_none());
    }

    #[test]
    fn test_huge_sensitivity_keeps_cursor_on_screen() {
        let screen = ScreenBounds::new(1920, 1080);
        let mut m = MotionMapper::new(MapperConfig {
            mode: MappingMode::AnchorCumulative,
            sensitivity: 1e308,
            smoothing_alpha: 0.5,
            nudge_step_px: 0.0,
            screen,
        })
        .unwrap();

        m.update(Point2D::new(0.0, 0.0), None);
        let right = m.update(Point2D::new(10.0, 0.0), None);
        assert_eq!(right, Point2D::new(1920.0, 540.0));
        assert!(m.state().raw_target.is_finite());

        let back = m.update(Point2D::new(-10.0, 0.0), None);
        assert!(screen.contains(&back));
        assert!(m.state().raw_target.is_finite());
        for _ in 0..5 {
            assert!(screen.contains(&m.update(Point2D::new(-10.0, 0.0), None)));
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "AbsoluteGaze")]
    fn test_update_rejected_in_absolute_mode() {
        let mut m = mapper(MappingMode::AbsoluteGaze, 0.5);
        m.update(Point2D::new(1.0, 1.0), None);
    }

    #[test]
    fn test_validate_rejects_bad_config() {
        let base = MapperConfig::default();
        for alpha in [0.0, -0.1, 1.5, f64::NAN] {
            let config = MapperConfig {
                smoothing_alpha: alpha,
                ..base.clone()
            };
            assert!(matches!(
                config.validate(),
                Err(FacecursorError::Config { .. })
            ));
        }
        let config = MapperConfig {
            screen: ScreenBounds::new(0, 1080),
            ..base.clone()
        };
        assert!(MotionMapper::new(config).is_err());
        assert!(base.validate().is_ok());
    }

    #[test]
    fn test_default_config_matches_app_defaults() {
        let config = MapperConfig::default();
        assert_eq!(config.mode, MappingMode::AnchorCumulative);
        assert_eq!(config.sensitivity, 2.0);
        assert_eq!(config.smoothing_alpha, 0.1);
        assert_eq!(config.screen, ScreenBounds::new(1920, 1080));
    }
}
