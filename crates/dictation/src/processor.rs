//! Dictation producer/consumer threads.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use facecursor_common::config::DictationDefaults;
use facecursor_common::error::{FacecursorError, FacecursorResult};
use serde::Serialize;

use crate::queue::ChunkQueue;
use crate::recognizer::{AudioChunk, AudioSource, RecognitionError, SpeechRecognizer, TextSink};
use crate::stop::StopPhraseDetector;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictationConfig {
    pub queue_capacity: usize,
    pub stop_phrase: String,
    pub stop_repeat: usize,
    /// Upper bound on how long either thread waits before rechecking the
    /// stop flag.
    pub poll_interval: Duration,
}

impl Default for DictationConfig {
    fn default() -> Self {
        Self::from_defaults(&DictationDefaults::default())
    }
}

impl DictationConfig {
    pub fn from_defaults(defaults: &DictationDefaults) -> Self {
        Self {
            queue_capacity: defaults.queue_capacity,
            stop_phrase: defaults.stop_phrase.clone(),
            stop_repeat: defaults.stop_repeat,
            poll_interval: Duration::from_millis(defaults.poll_interval_ms),
        }
    }
}

/// Counters reported when dictation ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DictationStats {
    pub chunks_captured: u64,
    pub chunks_dropped: u64,
    pub utterances_emitted: u64,
    pub unintelligible: u64,
    pub backend_errors: u64,
}

#[derive(Debug, Default)]
struct Counters {
    chunks_captured: AtomicU64,
    utterances_emitted: AtomicU64,
    unintelligible: AtomicU64,
    backend_errors: AtomicU64,
}

/// Starts dictation threads.
#[derive(Debug, Clone, Default)]
pub struct DictationProcessor {
    config: DictationConfig,
}

impl DictationProcessor {
    pub fn new(config: DictationConfig) -> Self {
        Self { config }
    }

    /// Spawn the capture and recognition threads.
    pub fn start(
        &self,
        source: Box<dyn AudioSource>,
        recognizer: Box<dyn SpeechRecognizer>,
        sink: Box<dyn TextSink>,
    ) -> FacecursorResult<DictationHandle> {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let queue = Arc::new(ChunkQueue::new(self.config.queue_capacity));
        let counters = Arc::new(Counters::default());

        tracing::info!(
            source = %source.name(),
            recognizer = %recognizer.name(),
            queue_capacity = queue.capacity(),
            "Dictation started"
        );

        let producer = {
            let producer = Producer {
                source,
                queue: queue.clone(),
                stop_flag: stop_flag.clone(),
                counters: counters.clone(),
                retry_delay: self.config.poll_interval,
            };
            std::thread::Builder::new()
                .name("dictation-capture".to_string())
                .spawn(move || producer.run())?
        };

        let consumer = {
            let consumer = Consumer {
                recognizer,
                sink,
                detector: StopPhraseDetector::new(
                    &self.config.stop_phrase,
                    self.config.stop_repeat,
                ),
                queue: queue.clone(),
                stop_flag: stop_flag.clone(),
                counters: counters.clone(),
                poll_interval: self.config.poll_interval,
            };
            let spawned = std::thread::Builder::new()
                .name("dictation-recognize".to_string())
                .spawn(move || consumer.run());
            match spawned {
                Ok(handle) => handle,
                Err(e) => {
                    stop_flag.store(true, Ordering::SeqCst);
                    let _ = producer.join();
                    return Err(e.into());
                }
            }
        };

        Ok(DictationHandle {
            stop_flag,
            queue,
            counters,
            producer: Some(producer),
            consumer: Some(consumer),
        })
    }
}

struct Producer {
    source: Box<dyn AudioSource>,
    queue: Arc<ChunkQueue<AudioChunk>>,
    stop_flag: Arc<AtomicBool>,
    counters: Arc<Counters>,
    retry_delay: Duration,
}

impl Producer {
    fn run(mut self) {
        while !self.stop_flag.load(Ordering::Relaxed) {
            match self.source.capture() {
                Ok(Some(chunk)) => {
                    self.counters.chunks_captured.fetch_add(1, Ordering::Relaxed);
                    if self.queue.push(chunk).is_some() {
                        tracing::warn!(
                            dropped = self.queue.dropped(),
                            "Recognizer is behind, dropped oldest audio chunk"
                        );
                    }
                }
                // Nothing heard before the capture timeout.
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Audio capture failed");
                    std::thread::sleep(self.retry_delay);
                }
            }
        }
        tracing::debug!("Dictation capture thread stopped");
    }
}

struct Consumer {
    recognizer: Box<dyn SpeechRecognizer>,
    sink: Box<dyn TextSink>,
    detector: StopPhraseDetector,
    queue: Arc<ChunkQueue<AudioChunk>>,
    stop_flag: Arc<AtomicBool>,
    counters: Arc<Counters>,
    poll_interval: Duration,
}

impl Consumer {
    fn run(mut self) {
        while !self.stop_flag.load(Ordering::Relaxed) {
            let Some(chunk) = self.queue.pop_timeout(self.poll_interval) else {
                continue;
            };
            self.handle(&chunk);
        }
        tracing::debug!("Dictation recognition thread stopped");
    }

    fn handle(&mut self, chunk: &AudioChunk) {
        let text = match self.recognizer.recognize(chunk) {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) | Err(RecognitionError::Unintelligible) => {
                self.counters.unintelligible.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Could not make out speech");
                return;
            }
            Err(RecognitionError::Backend(message)) => {
                self.counters.backend_errors.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(error = %message, "Speech recognition backend failed");
                return;
            }
        };

        if self.detector.observe(&text) {
            tracing::info!(phrase = %self.detector.phrase(), "Stop phrase heard, ending dictation");
            self.stop_flag.store(true, Ordering::SeqCst);
            return;
        }

        match self.sink.emit(&format!("{text} ")) {
            Ok(()) => {
                self.counters
                    .utterances_emitted
                    .fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => tracing::warn!(error = %e, "Failed to emit dictated text"),
        }
    }
}

/// Control handle for running dictation threads.
pub struct DictationHandle {
    stop_flag: Arc<AtomicBool>,
    queue: Arc<ChunkQueue<AudioChunk>>,
    counters: Arc<Counters>,
    producer: Option<JoinHandle<()>>,
    consumer: Option<JoinHandle<()>>,
}

impl DictationHandle {
    /// Ask both threads to stop at their next boundary.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    /// Whether a stop was requested, by the caller or the stop phrase.
    pub fn is_stopped(&self) -> bool {
        self.stop_flag.load(Ordering::SeqCst)
    }

    /// Get the stop flag for external coordination.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Wait for both threads to exit and collect the counters.
    ///
    /// Does not request a stop itself; call [`stop`](Self::stop) first unless
    /// the stop phrase is expected to end the session.
    pub fn join(mut self) -> FacecursorResult<DictationStats> {
        let mut panicked = Vec::new();
        if let Some(producer) = self.producer.take() {
            if producer.join().is_err() {
                panicked.push("capture");
            }
        }
        if let Some(consumer) = self.consumer.take() {
            if consumer.join().is_err() {
                panicked.push("recognition");
            }
        }
        if !panicked.is_empty() {
            return Err(FacecursorError::dictation(format!(
                "dictation {} thread panicked",
                panicked.join(" and ")
            )));
        }

        let stats = DictationStats {
            chunks_captured: self.counters.chunks_captured.load(Ordering::Relaxed),
            chunks_dropped: self.queue.dropped(),
            utterances_emitted: self.counters.utterances_emitted.load(Ordering::Relaxed),
            unintelligible: self.counters.unintelligible.load(Ordering::Relaxed),
            backend_errors: self.counters.backend_errors.load(Ordering::Relaxed),
        };
        tracing::info!(
            captured = stats.chunks_captured,
            emitted = stats.utterances_emitted,
            dropped = stats.chunks_dropped,
            "Dictation stopped"
        );
        Ok(stats)
    }
}

impl Drop for DictationHandle {
    fn drop(&mut self) {
        if self.producer.is_some() || self.consumer.is_some() {
            self.stop();
        }
    }
}
