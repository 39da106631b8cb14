//! Replay a recorded observation stream.

use std::path::PathBuf;
use std::sync::atomic::Ordering;

use anyhow::Context;
use facecursor_common::clock::SessionClock;
use facecursor_common::config::AppConfig;
use facecursor_model::action::ActionStreamHeader;
use facecursor_pointer::{ActionWriter, LogSink, ReplaySource, TrackingSession};
use facecursor_tracking::FramePipeline;

pub async fn run(
    config: &AppConfig,
    path: PathBuf,
    output: Option<PathBuf>,
    realtime: bool,
) -> anyhow::Result<()> {
    let pipeline = FramePipeline::from_config(config).context("Invalid pointer configuration")?;
    let source = ReplaySource::from_path(&path)
        .with_context(|| format!("Failed to load observations from {}", path.display()))?;

    println!("Replaying: {}", path.display());
    println!("  Frames: {}", source.remaining());
    println!("  Mode: {:?}", config.pointer.mode);
    println!(
        "  Screen: {}x{}",
        config.pointer.screen_width, config.pointer.screen_height
    );
    println!();

    let mut session = TrackingSession::new(Box::new(source), pipeline, Box::new(LogSink))
        .with_pacing(realtime);

    if let Some(output) = &output {
        let clock = SessionClock::start();
        let header = ActionStreamHeader {
            schema_version: "1.0".to_string(),
            epoch_wall: clock.epoch_wall().to_string(),
            screen_width: config.pointer.screen_width,
            screen_height: config.pointer.screen_height,
        };
        let writer = ActionWriter::new(output.clone(), &header)
            .with_context(|| format!("Failed to create {}", output.display()))?;
        tracing::debug!(path = %output.display(), "Action log enabled");
        session = session.with_writer(writer);
    }

    let stop_flag = session.stop_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop_flag.store(true, Ordering::SeqCst);
        }
    });

    let stats = session.run().await?;

    println!("Session finished:");
    println!(
        "  Frames: {} ({} without input)",
        stats.frames, stats.frames_without_input
    );
    println!(
        "  Moves: {} ({} redundant skipped)",
        stats.moves, stats.skipped_moves
    );
    println!("  Clicks: {}", stats.clicks);
    println!("  Presses: {} / releases: {}", stats.presses, stats.releases);
    if stats.skipped_releases > 0 {
        println!("  Releases dropped (press rejected): {}", stats.skipped_releases);
    }
    if stats.dispatch_errors > 0 {
        println!("  Dispatch errors: {}", stats.dispatch_errors);
    }
    if let Some(output) = output {
        println!("  Actions written to: {}", output.display());
    }

    Ok(())
}
