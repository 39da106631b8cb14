//! Observation sources.

use std::collections::VecDeque;
use std::path::Path;

use facecursor_common::error::{FacecursorError, FacecursorResult};
use facecursor_model::observation::{parse_observations, FrameObservation};

use crate::ObservationSource;

/// Replays a recorded observation stream in order.
pub struct ReplaySource {
    name: String,
    frames: VecDeque<FrameObservation>,
}

impl ReplaySource {
    pub fn new(frames: Vec<FrameObservation>) -> Self {
        Self {
            name: "replay".to_string(),
            frames: frames.into(),
        }
    }

    /// Parse a JSONL observation stream; `#` lines are skipped.
    pub fn from_jsonl(jsonl: &str) -> FacecursorResult<Self> {
        Ok(Self::new(parse_observations(jsonl)?))
    }

    pub fn from_path(path: &Path) -> FacecursorResult<Self> {
        if !path.exists() {
            return Err(FacecursorError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let mut source = Self::from_jsonl(&content)?;
        source.name = format!("replay:{}", path.display());
        tracing::debug!(path = %path.display(), frames = source.remaining(), "Loaded observation stream");
        Ok(source)
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl ObservationSource for ReplaySource {
    fn next_frame(&mut self) -> FacecursorResult<Option<FrameObservation>> {
        Ok(self.frames.pop_front())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
