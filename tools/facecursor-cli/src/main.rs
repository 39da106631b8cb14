//! facecursor CLI: replay tracking sessions, calibrate, and manage configuration.
//!
//! Usage:
//!   facecursor replay <OBSERVATIONS>          Run recorded detector output through the tracker
//!   facecursor fit <SAMPLES>                  Fit the eye-to-screen regression
//!   facecursor threshold --side <SIDE> <IMG>  Calibrate the pupil threshold for one eye
//!   facecursor config                         Show the effective configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use facecursor_common::config::{AppConfig, LandmarkSubsetSetting, MappingModeSetting};

mod commands;

#[derive(Parser)]
#[command(
    name = "facecursor",
    about = "Hands-free pointer control from head motion and blinks",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded observation stream through the tracking pipeline
    Replay {
        /// Observation stream (JSONL)
        path: PathBuf,

        /// Write dispatched pointer actions to this JSONL file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Cursor mapping mode
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        /// Screen pixels per pixel of head displacement
        #[arg(long)]
        sensitivity: Option<f64>,

        /// Smoothing factor in (0, 1]; lower is smoother
        #[arg(long)]
        alpha: Option<f64>,

        /// Per-frame gaze nudge in pixels
        #[arg(long)]
        nudge: Option<f64>,

        /// Blink duration (seconds) that becomes press-and-hold
        #[arg(long)]
        long_press_secs: Option<f64>,

        /// Landmarks feeding the head position
        #[arg(long, value_enum)]
        landmarks: Option<LandmarksArg>,

        #[arg(long)]
        screen_width: Option<u32>,

        #[arg(long)]
        screen_height: Option<u32>,

        /// Replay at recording speed instead of as fast as possible
        #[arg(long)]
        realtime: bool,
    },

    /// Fit the eye-to-screen regression from calibration samples
    Fit {
        /// JSON array of {"eye_position": {x, y}, "screen_point": {x, y}}
        path: PathBuf,
    },

    /// Find the pupil binarization threshold for one eye
    Threshold {
        /// Which eye the images show
        #[arg(long, value_enum)]
        side: SideArg,

        /// Grayscale (or color) eye crops
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Skip erosion before thresholding
        #[arg(long)]
        no_erode: bool,
    },

    /// Show the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        save: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Anchor,
    Baseline,
    Gaze,
}

#[derive(Clone, Copy, ValueEnum)]
enum LandmarksArg {
    All,
    Head,
}

#[derive(Clone, Copy, ValueEnum)]
enum SideArg {
    Left,
    Right,
}

impl From<ModeArg> for MappingModeSetting {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Anchor => MappingModeSetting::AnchorCumulative,
            ModeArg::Baseline => MappingModeSetting::SmoothedBaseline,
            ModeArg::Gaze => MappingModeSetting::AbsoluteGaze,
        }
    }
}

impl From<LandmarksArg> for LandmarkSubsetSetting {
    fn from(arg: LandmarksArg) -> Self {
        match arg {
            LandmarksArg::All => LandmarkSubsetSetting::All,
            LandmarksArg::Head => LandmarkSubsetSetting::HeadAnchors,
        }
    }
}

impl From<SideArg> for facecursor_calibration::EyeSide {
    fn from(arg: SideArg) -> Self {
        match arg {
            SideArg::Left => facecursor_calibration::EyeSide::Left,
            SideArg::Right => facecursor_calibration::EyeSide::Right,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load();
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    facecursor_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Replay {
            path,
            output,
            mode,
            sensitivity,
            alpha,
            nudge,
            long_press_secs,
            landmarks,
            screen_width,
            screen_height,
            realtime,
        } => {
            let pointer = &mut config.pointer;
            if let Some(mode) = mode {
                pointer.mode = mode.into();
            }
            if let Some(sensitivity) = sensitivity {
                pointer.sensitivity = sensitivity;
            }
            if let Some(alpha) = alpha {
                pointer.smoothing_alpha = alpha;
            }
            if let Some(nudge) = nudge {
                pointer.nudge_step_px = nudge;
            }
            if let Some(landmarks) = landmarks {
                pointer.landmarks = landmarks.into();
            }
            if let Some(width) = screen_width {
                pointer.screen_width = width;
            }
            if let Some(height) = screen_height {
                pointer.screen_height = height;
            }
            if let Some(secs) = long_press_secs {
                config.blink.long_press_secs = secs;
            }
            commands::replay::run(&config, path, output, realtime).await
        }
        Commands::Fit { path } => commands::fit::run(&config, path),
        Commands::Threshold {
            side,
            images,
            no_erode,
        } => {
            if no_erode {
                config.calibration.erode_iterations = 0;
            }
            commands::threshold::run(&config, side.into(), images)
        }
        Commands::Config { save } => commands::config::run(&config, save),
    }
}
