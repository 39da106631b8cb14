//! facecursor dictation
//!
//! Hands-free text entry as a producer/consumer pair:
//! - **Producer:** captures audio chunks into a bounded queue
//! - **Consumer:** recognizes each chunk and emits the text, watching for
//!   the spoken stop phrase
//!
//! Audio capture, recognition, and text injection are collaborators behind
//! the [`AudioSource`], [`SpeechRecognizer`], and [`TextSink`] traits.

pub mod processor;
pub mod queue;
pub mod recognizer;
pub mod stop;

pub use processor::{DictationConfig, DictationHandle, DictationProcessor, DictationStats};
pub use queue::ChunkQueue;
pub use recognizer::{
    AudioChunk, AudioSource, CollectingSink, RecognitionError, SpeechRecognizer, TextSink,
};
pub use stop::StopPhraseDetector;
