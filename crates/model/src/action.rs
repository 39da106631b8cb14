//! Pointer actions emitted by the tracking pipeline.
//!
//! Actions are what the pointer-injection collaborator receives:
//! `moveTo`, `click`, `mouseDown`, and `mouseUp`. Action logs use the same
//! append-only JSONL layout as observation streams.

use serde::{Deserialize, Serialize};

use crate::observation::TimestampNs;

/// A single pointer command with the frame timestamp that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerAction {
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,

    #[serde(flatten)]
    pub kind: ActionKind,
}

/// Discriminated union of pointer commands. Coordinates are screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    /// Move the cursor to an absolute position.
    Move { x: f64, y: f64 },

    /// Press and release the primary button.
    Click { x: f64, y: f64 },

    /// Press the primary button and hold it.
    Down { x: f64, y: f64 },

    /// Release the held primary button.
    Up { x: f64, y: f64 },
}

/// Metadata written as the first (comment) line of an action log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionStreamHeader {
    pub schema_version: String,

    /// Wall-clock time at session start (ISO 8601).
    pub epoch_wall: String,

    pub screen_width: u32,
    pub screen_height: u32,
}

impl PointerAction {
    pub fn move_to(timestamp_ns: TimestampNs, x: f64, y: f64) -> Self {
        Self {
            timestamp_ns,
            kind: ActionKind::Move { x, y },
        }
    }

    pub fn click(timestamp_ns: TimestampNs, x: f64, y: f64) -> Self {
        Self {
            timestamp_ns,
            kind: ActionKind::Click { x, y },
        }
    }

    pub fn down(timestamp_ns: TimestampNs, x: f64, y: f64) -> Self {
        Self {
            timestamp_ns,
            kind: ActionKind::Down { x, y },
        }
    }

    pub fn up(timestamp_ns: TimestampNs, x: f64, y: f64) -> Self {
        Self {
            timestamp_ns,
            kind: ActionKind::Up { x, y },
        }
    }

    /// Cursor position carried by the action.
    pub fn position(&self) -> (f64, f64) {
        match self.kind {
            ActionKind::Move { x, y }
            | ActionKind::Click { x, y }
            | ActionKind::Down { x, y }
            | ActionKind::Up { x, y } => (x, y),
        }
    }

    pub fn is_move(&self) -> bool {
        matches!(self.kind, ActionKind::Move { .. })
    }
}

/// Parse actions from JSONL content, skipping `#` header lines.
pub fn parse_actions(jsonl: &str) -> Result<Vec<PointerAction>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}
