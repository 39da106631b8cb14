//! facecursor tracking core
//!
//! Turns per-frame detector observations into pointer actions:
//! - **Aggregation:** mean position of a landmark subset, in pixels
//! - **Mapping:** head motion to a smoothed, clamped cursor position
//! - **Blink detection:** eye-closure episodes to click or press/release
//!
//! This crate is pure computation. Frames come in as data and actions go
//! out as data; driving a real pointer is the caller's job.

pub mod aggregate;
pub mod blink;
pub mod mapper;
pub mod pipeline;

pub use aggregate::{aggregate, LandmarkSubset};
pub use blink::{BlinkEvent, BlinkPhase, BlinkStateMachine};
pub use mapper::{CursorState, MapperConfig, MappingMode, MotionMapper};
pub use pipeline::{FrameOutput, FramePipeline};
