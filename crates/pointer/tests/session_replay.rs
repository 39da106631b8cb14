use facecursor_calibration::{ActiveCalibration, CalibrationParams, RegressionModel};
use facecursor_common::error::{FacecursorError, FacecursorResult};
use facecursor_model::action::{parse_actions, ActionKind, ActionStreamHeader};
use facecursor_model::geometry::{Point2D, ScreenBounds};
use facecursor_model::observation::{serialize_observations, FrameObservation, LandmarkSet};
use facecursor_pointer::{
    ActionWriter, LogSink, PointerSink, RecordingSink, ReplaySource, TrackingSession,
};
use facecursor_tracking::{FramePipeline, LandmarkSubset, MapperConfig, MappingMode};

const FRAME_NS: u64 = 100_000_000;

fn face_at(x: f64) -> LandmarkSet {
    vec![Point2D::new(x, 0.5); 3].into_iter().collect()
}

fn pipeline() -> FramePipeline {
    let config = MapperConfig {
        mode: MappingMode::AnchorCumulative,
        sensitivity: 1.0,
        smoothing_alpha: 1.0,
        nudge_step_px: 0.0,
        screen: ScreenBounds::new(1000, 1000),
    };
    FramePipeline::new(LandmarkSubset::All, config, 1.0).unwrap()
}

/// Head still for three frames, a short blink, then a long blink that is
/// still held when the stream ends.
fn recorded_frames() -> Vec<FrameObservation> {
    let mut frames = Vec::new();
    let mut t = 0;
    let mut push = |frames: &mut Vec<FrameObservation>, x: Option<f64>, blinking: bool| {
        let mut frame = FrameObservation::empty(t, 100, 100).with_blinking(blinking);
        if let Some(x) = x {
            frame = frame.with_landmarks(face_at(x));
        }
        frames.push(frame);
        t += FRAME_NS;
    };

    push(&mut frames, Some(0.5), false);
    push(&mut frames, Some(0.5), false);
    push(&mut frames, Some(0.75), false);
    push(&mut frames, None, true);
    push(&mut frames, None, false);
    for _ in 0..12 {
        push(&mut frames, None, true);
    }
    frames
}

#[tokio::test]
async fn replay_dispatches_moves_clicks_and_releases_held_press() {
    let sink = RecordingSink::new();
    let recorded = sink.handle();
    let source = ReplaySource::new(recorded_frames());
    let mut session = TrackingSession::new(Box::new(source), pipeline(), Box::new(sink));

    let stats = session.run().await.unwrap();

    assert_eq!(stats.frames, 17);
    assert_eq!(stats.frames_without_input, 14);
    // Frame two repeats frame one's position.
    assert_eq!(stats.moves, 2);
    assert_eq!(stats.skipped_moves, 1);
    assert_eq!(stats.clicks, 1);
    assert_eq!(stats.presses, 1);
    assert_eq!(stats.releases, 1);

    assert_eq!(
        recorded.calls(),
        vec![
            ActionKind::Move { x: 500.0, y: 500.0 },
            ActionKind::Move { x: 525.0, y: 500.0 },
            ActionKind::Click { x: 525.0, y: 500.0 },
            ActionKind::Down { x: 525.0, y: 500.0 },
            ActionKind::Up { x: 525.0, y: 500.0 },
        ]
    );
}

#[tokio::test]
async fn replay_from_file_writes_action_log() {
    let dir = std::env::temp_dir().join("facecursor_test_session_replay");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();

    let input = dir.join("observations.jsonl");
    let body = serialize_observations(&recorded_frames()).unwrap();
    std::fs::write(&input, format!("# test stream\n{body}")).unwrap();

    let output = dir.join("actions.jsonl");
    let header = ActionStreamHeader {
        schema_version: "1.0".to_string(),
        epoch_wall: "2026-01-01T00:00:00Z".to_string(),
        screen_width: 1000,
        screen_height: 1000,
    };
    let writer = ActionWriter::new(output.clone(), &header).unwrap();

    let source = ReplaySource::from_path(&input).unwrap();
    let mut session =
        TrackingSession::new(Box::new(source), pipeline(), Box::new(LogSink)).with_writer(writer);
    let stats = session.run().await.unwrap();
    drop(session);

    let actions = parse_actions(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(actions.len() as u64, stats.moves + stats.clicks + stats.presses + stats.releases);
    assert!(matches!(actions.last().unwrap().kind, ActionKind::Up { .. }));

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn stop_flag_ends_session_before_first_frame() {
    let source = ReplaySource::new(recorded_frames());
    let mut session = TrackingSession::new(Box::new(source), pipeline(), Box::new(LogSink));
    session.stop_flag().store(true, std::sync::atomic::Ordering::SeqCst);
    let stats = session.run().await.unwrap();
    assert_eq!(stats.frames, 0);
}

struct FailingSink;

impl PointerSink for FailingSink {
    fn move_to(&mut self, _x: f64, _y: f64) -> FacecursorResult<()> {
        Err(FacecursorError::pointer("display unavailable"))
    }

    fn click(&mut self, _x: f64, _y: f64) -> FacecursorResult<()> {
        Err(FacecursorError::pointer("display unavailable"))
    }

    fn mouse_down(&mut self, _x: f64, _y: f64) -> FacecursorResult<()> {
        Err(FacecursorError::pointer("display unavailable"))
    }

    fn mouse_up(&mut self, _x: f64, _y: f64) -> FacecursorResult<()> {
        Err(FacecursorError::pointer("display unavailable"))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

#[tokio::test]
async fn sink_failures_do_not_stop_the_session() {
    let source = ReplaySource::new(recorded_frames());
    let mut session = TrackingSession::new(Box::new(source), pipeline(), Box::new(FailingSink));
    let stats = session.run().await.unwrap();
    assert_eq!(stats.frames, 17);
    assert_eq!(stats.moves, 0);
    assert!(stats.dispatch_errors > 0);
}

#[tokio::test]
async fn absolute_gaze_session_follows_published_calibration() {
    let active = ActiveCalibration::new();
    active.publish(CalibrationParams {
        left_threshold: Some(40),
        right_threshold: Some(40),
        model: Some(RegressionModel {
            x_coefficients: [0.0, 1000.0, 0.0],
            y_coefficients: [0.0, 1000.0, 0.0],
        }),
    });

    let config = MapperConfig {
        mode: MappingMode::AbsoluteGaze,
        smoothing_alpha: 1.0,
        screen: ScreenBounds::new(1000, 1000),
        ..MapperConfig::default()
    };
    let pipeline = FramePipeline::new(LandmarkSubset::All, config, 1.0)
        .unwrap()
        .with_calibration(active);

    let frames = vec![
        FrameObservation::empty(0, 100, 100).with_eye_position(Point2D::new(0.25, 0.5)),
        FrameObservation::empty(FRAME_NS, 100, 100).with_eye_position(Point2D::new(0.5, 0.5)),
    ];
    let sink = RecordingSink::new();
    let recorded = sink.handle();
    let mut session =
        TrackingSession::new(Box::new(ReplaySource::new(frames)), pipeline, Box::new(sink));
    session.run().await.unwrap();

    assert_eq!(
        recorded.calls(),
        vec![
            ActionKind::Move { x: 250.0, y: 500.0 },
            ActionKind::Move { x: 500.0, y: 500.0 },
        ]
    );
}

/// Accepts everything except presses.
struct PressRejectingSink(RecordingSink);

impl PointerSink for PressRejectingSink {
    fn move_to(&mut self, x: f64, y: f64) -> FacecursorResult<()> {
        self.0.move_to(x, y)
    }

    fn click(&mut self, x: f64, y: f64) -> FacecursorResult<()> {
        self.0.click(x, y)
    }

    fn mouse_down(&mut self, _x: f64, _y: f64) -> FacecursorResult<()> {
        Err(FacecursorError::pointer("button busy"))
    }

    fn mouse_up(&mut self, x: f64, y: f64) -> FacecursorResult<()> {
        self.0.mouse_up(x, y)
    }

    fn name(&self) -> &str {
        "press-rejecting"
    }
}

#[tokio::test]
async fn failed_press_is_not_followed_by_release() {
    let inner = RecordingSink::new();
    let recorded = inner.handle();
    let source = ReplaySource::new(recorded_frames());
    let mut session = TrackingSession::new(
        Box::new(source),
        pipeline(),
        Box::new(PressRejectingSink(inner)),
    );

    let stats = session.run().await.unwrap();

    assert_eq!(stats.dispatch_errors, 1);
    assert_eq!(stats.presses, 0);
    assert_eq!(stats.releases, 0);
    assert_eq!(stats.skipped_releases, 1);
    assert!(!recorded
        .calls()
        .iter()
        .any(|call| matches!(call, ActionKind::Up { .. })));
}
