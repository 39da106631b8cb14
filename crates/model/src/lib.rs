//! facecursor model
//!
//! Defines the data contracts exchanged between the detector, the
//! tracking pipeline, and the pointer collaborator:
//! - **Geometry:** points and screen bounds
//! - **Observations:** one detector output per frame (landmarks, blink flag, gaze)
//! - **Actions:** timestamped pointer commands (move, click, press, release)
//!
//! Landmark coordinates are normalized image fractions; everything
//! downstream of the aggregator is in pixels.

pub mod action;
pub mod geometry;
pub mod observation;

pub use action::*;
pub use geometry::*;
pub use observation::*;
