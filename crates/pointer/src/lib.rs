//! facecursor pointer
//!
//! Drives a tracking session: pulls frames from an observation source, runs
//! them through the tracking pipeline, and hands the resulting actions to a
//! pointer sink. Pluggable on both ends:
//!
//! - **Sources:** replayed JSONL observation streams, or any live detector
//!   implementing [`ObservationSource`]
//! - **Sinks:** an OS pointer-injection backend implementing [`PointerSink`],
//!   or the bundled recording and logging sinks
//!
//! Actions can be logged in append-only JSONL format alongside.

pub mod session;
pub mod sinks;
pub mod sources;
pub mod writer;

use facecursor_common::error::FacecursorResult;
use facecursor_model::action::{ActionKind, PointerAction};
use facecursor_model::observation::FrameObservation;

pub use session::{SessionStats, TrackingSession};
pub use sinks::{LogSink, RecordingSink};
pub use sources::ReplaySource;
pub use writer::ActionWriter;

/// Trait for per-frame observation producers.
pub trait ObservationSource: Send {
    /// Next frame, blocking until one is available. `None` ends the stream.
    fn next_frame(&mut self) -> FacecursorResult<Option<FrameObservation>>;

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Trait for pointer-injection backends. Coordinates are screen pixels.
pub trait PointerSink: Send {
    fn move_to(&mut self, x: f64, y: f64) -> FacecursorResult<()>;

    fn click(&mut self, x: f64, y: f64) -> FacecursorResult<()>;

    fn mouse_down(&mut self, x: f64, y: f64) -> FacecursorResult<()>;

    fn mouse_up(&mut self, x: f64, y: f64) -> FacecursorResult<()>;

    /// Sink name for logging.
    fn name(&self) -> &str;
}

/// Forwards actions to a sink, dropping moves to the position the cursor
/// was last sent to and releases whose press the sink never accepted.
pub struct PointerDriver {
    sink: Box<dyn PointerSink>,
    last_move: Option<(f64, f64)>,
    button_down: bool,
    skipped_moves: u64,
}

impl PointerDriver {
    pub fn new(sink: Box<dyn PointerSink>) -> Self {
        Self {
            sink,
            last_move: None,
            button_down: false,
            skipped_moves: 0,
        }
    }

    /// Send one action. Returns `false` if it was dropped: a repeated move,
    /// or a release with no accepted press to pair with.
    pub fn dispatch(&mut self, action: &PointerAction) -> FacecursorResult<bool> {
        match action.kind {
            ActionKind::Move { x, y } => {
                if self.last_move == Some((x, y)) {
                    self.skipped_moves += 1;
                    return Ok(false);
                }
                self.sink.move_to(x, y)?;
                self.last_move = Some((x, y));
            }
            ActionKind::Click { x, y } => self.sink.click(x, y)?,
            ActionKind::Down { x, y } => {
                self.sink.mouse_down(x, y)?;
                self.button_down = true;
            }
            ActionKind::Up { x, y } => {
                if !self.button_down {
                    return Ok(false);
                }
                self.button_down = false;
                self.sink.mouse_up(x, y)?;
            }
        }
        Ok(true)
    }

    /// Whether the sink holds a press that has not been released yet.
    pub fn is_button_down(&self) -> bool {
        self.button_down
    }

    pub fn skipped_moves(&self) -> u64 {
        self.skipped_moves
    }

    pub fn sink_name(&self) -> &str {
        self.sink.name()
    }
}
