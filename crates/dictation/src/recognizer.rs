//! Collaborator contracts for dictation: audio in, text out.

use std::sync::{Arc, Mutex, PoisonError};

use facecursor_common::error::FacecursorResult;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One utterance-sized chunk of mono PCM audio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioChunk {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

impl AudioChunk {
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Microphone or other audio capture.
pub trait AudioSource: Send {
    /// Block until a chunk is captured. `Ok(None)` means the capture timed
    /// out with nothing heard; the caller simply retries.
    fn capture(&mut self) -> FacecursorResult<Option<AudioChunk>>;

    fn name(&self) -> &str;
}

/// Why a chunk produced no text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecognitionError {
    /// Audio was heard but no words could be made out.
    #[error("speech was unintelligible")]
    Unintelligible,

    /// The recognition backend itself failed (network, service, model).
    #[error("recognition backend failed: {0}")]
    Backend(String),
}

/// Speech-to-text engine.
pub trait SpeechRecognizer: Send {
    fn recognize(&mut self, chunk: &AudioChunk) -> Result<String, RecognitionError>;

    fn name(&self) -> &str;
}

/// Where recognized text goes, usually keystroke injection.
pub trait TextSink: Send {
    fn emit(&mut self, text: &str) -> FacecursorResult<()>;
}

/// Appends emitted text to a shared buffer.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    text: Arc<Mutex<String>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything emitted so far.
    pub fn text(&self) -> String {
        self.text
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TextSink for CollectingSink {
    fn emit(&mut self, text: &str) -> FacecursorResult<()> {
        self.text
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_str(text);
        Ok(())
    }
}
