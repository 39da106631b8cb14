//! Bundled pointer sinks.

use std::sync::{Arc, Mutex, PoisonError};

use facecursor_common::error::FacecursorResult;
use facecursor_model::action::ActionKind;

use crate::PointerSink;

/// Shared view of the calls a [`RecordingSink`] received.
#[derive(Debug, Clone, Default)]
pub struct RecordedCalls {
    calls: Arc<Mutex<Vec<ActionKind>>>,
}

impl RecordedCalls {
    pub fn calls(&self) -> Vec<ActionKind> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&self, call: ActionKind) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

/// Keeps every call in memory. Used for dry runs and tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    recorded: RecordedCalls,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle that stays readable after the sink is boxed into a driver.
    pub fn handle(&self) -> RecordedCalls {
        self.recorded.clone()
    }
}

impl PointerSink for RecordingSink {
    fn move_to(&mut self, x: f64, y: f64) -> FacecursorResult<()> {
        self.recorded.push(ActionKind::Move { x, y });
        Ok(())
    }

    fn click(&mut self, x: f64, y: f64) -> FacecursorResult<()> {
        self.recorded.push(ActionKind::Click { x, y });
        Ok(())
    }

    fn mouse_down(&mut self, x: f64, y: f64) -> FacecursorResult<()> {
        self.recorded.push(ActionKind::Down { x, y });
        Ok(())
    }

    fn mouse_up(&mut self, x: f64, y: f64) -> FacecursorResult<()> {
        self.recorded.push(ActionKind::Up { x, y });
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Emits every call as a tracing event. Moves log at trace level.
#[derive(Debug, Default)]
pub struct LogSink;

impl PointerSink for LogSink {
    fn move_to(&mut self, x: f64, y: f64) -> FacecursorResult<()> {
        tracing::trace!(x, y, "move_to");
        Ok(())
    }

    fn click(&mut self, x: f64, y: f64) -> FacecursorResult<()> {
        tracing::info!(x, y, "click");
        Ok(())
    }

    fn mouse_down(&mut self, x: f64, y: f64) -> FacecursorResult<()> {
        tracing::info!(x, y, "mouse_down");
        Ok(())
    }

    fn mouse_up(&mut self, x: f64, y: f64) -> FacecursorResult<()> {
        tracing::info!(x, y, "mouse_up");
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
