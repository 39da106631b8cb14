//! The tracking session loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use facecursor_common::error::FacecursorResult;
use facecursor_model::action::{ActionKind, PointerAction};
use facecursor_model::observation::{FrameObservation, TimestampNs};
use facecursor_tracking::{FrameOutput, FramePipeline};
use serde::Serialize;

use crate::writer::ActionWriter;
use crate::{ObservationSource, PointerDriver, PointerSink};

/// Counters reported when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub frames: u64,
    /// Frames with no face (or no usable gaze target).
    pub frames_without_input: u64,
    pub moves: u64,
    /// Moves dropped because the cursor was already there.
    pub skipped_moves: u64,
    /// Releases dropped because the sink never accepted their press.
    pub skipped_releases: u64,
    pub clicks: u64,
    pub presses: u64,
    pub releases: u64,
    pub dispatch_errors: u64,
}

impl SessionStats {
    fn count(&mut self, kind: &ActionKind) {
        match kind {
            ActionKind::Move { .. } => self.moves += 1,
            ActionKind::Click { .. } => self.clicks += 1,
            ActionKind::Down { .. } => self.presses += 1,
            ActionKind::Up { .. } => self.releases += 1,
        }
    }
}

/// Runs frames from a source through a pipeline into a pointer sink.
pub struct TrackingSession {
    source: Box<dyn ObservationSource>,
    pipeline: FramePipeline,
    driver: PointerDriver,
    writer: Option<ActionWriter>,
    stop_flag: Arc<AtomicBool>,
    paced: bool,
    last_timestamp: Option<TimestampNs>,
    stats: SessionStats,
}

impl TrackingSession {
    pub fn new(
        source: Box<dyn ObservationSource>,
        pipeline: FramePipeline,
        sink: Box<dyn PointerSink>,
    ) -> Self {
        Self {
            source,
            pipeline,
            driver: PointerDriver::new(sink),
            writer: None,
            stop_flag: Arc::new(AtomicBool::new(false)),
            paced: false,
            last_timestamp: None,
            stats: SessionStats::default(),
        }
    }

    /// Log every dispatched action to `writer`.
    pub fn with_writer(mut self, writer: ActionWriter) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Sleep between frames for the gap between their timestamps, so a
    /// replay runs at recording speed.
    pub fn with_pacing(mut self, paced: bool) -> Self {
        self.paced = paced;
        self
    }

    /// Run until the source ends or the stop flag is set.
    pub async fn run(&mut self) -> FacecursorResult<SessionStats> {
        tracing::info!(
            source = %self.source.name(),
            sink = %self.driver.sink_name(),
            "Tracking session started"
        );

        while !self.stop_flag.load(Ordering::Relaxed) {
            let frame = match self.source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Observation source error");
                    continue;
                }
            };

            if self.paced {
                if let Some(previous) = self.last_timestamp {
                    let gap = frame.timestamp_ns.saturating_sub(previous);
                    tokio::time::sleep(Duration::from_nanos(gap)).await;
                }
            } else {
                tokio::task::yield_now().await;
            }

            self.step(&frame)?;
        }

        self.finish()?;
        tracing::info!(
            frames = self.stats.frames,
            moves = self.stats.moves,
            clicks = self.stats.clicks,
            presses = self.stats.presses,
            "Tracking session stopped"
        );
        Ok(self.stats)
    }

    /// Process and dispatch a single frame.
    pub fn step(&mut self, frame: &FrameObservation) -> FacecursorResult<FrameOutput> {
        self.stats.frames += 1;
        self.last_timestamp = Some(frame.timestamp_ns);

        let output = self.pipeline.process(frame);
        if output.cursor.is_none() {
            self.stats.frames_without_input += 1;
        }
        for action in &output.actions {
            self.dispatch(action)?;
        }
        Ok(output)
    }

    /// Release a press left held when the stream ends, then flush the log.
    fn finish(&mut self) -> FacecursorResult<()> {
        let t = self.last_timestamp.unwrap_or(0);
        if let Some(release) = self.pipeline.release_held(t) {
            tracing::info!("Releasing held button at session end");
            self.dispatch(&release)?;
        }
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    /// Sink failures are logged and counted; log-file failures are fatal.
    fn dispatch(&mut self, action: &PointerAction) -> FacecursorResult<()> {
        match self.driver.dispatch(action) {
            Ok(true) => {
                self.stats.count(&action.kind);
                if let Some(writer) = self.writer.as_mut() {
                    writer.write_action(action)?;
                }
            }
            Ok(false) => match action.kind {
                ActionKind::Up { .. } => {
                    self.stats.skipped_releases += 1;
                    tracing::debug!("Dropping release with no accepted press");
                }
                _ => self.stats.skipped_moves += 1,
            },
            Err(e) => {
                self.stats.dispatch_errors += 1;
                tracing::warn!(error = %e, action = ?action.kind, "Pointer dispatch failed");
            }
        }
        Ok(())
    }

    /// Re-latch the head anchor on the next frame.
    pub fn reset_anchor(&mut self) {
        self.pipeline.reset_anchor();
    }

    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    /// Get the stop flag for external coordination.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn pipeline(&self) -> &FramePipeline {
        &self.pipeline
    }
}
