//! Points and screen bounds.

use serde::{Deserialize, Serialize};

/// A 2D point. Normalized for landmarks, pixels everywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const ORIGIN: Point2D = Point2D { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Component-wise difference `self - other`.
    pub fn offset_from(&self, other: &Point2D) -> Point2D {
        Point2D::new(self.x - other.x, self.y - other.y)
    }

    /// Linear interpolation between two points.
    pub fn lerp(a: &Point2D, b: &Point2D, t: f64) -> Point2D {
        let t = t.clamp(0.0, 1.0);
        Point2D {
            x: a.x + (b.x - a.x) * t,
            y: a.y + (b.y - a.y) * t,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Screen dimensions in pixels. The cursor lives in `[0, width] x [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenBounds {
    pub width: u32,
    pub height: u32,
}

impl ScreenBounds {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Center of the screen (integer-divided, like the cursor's start position).
    pub fn center(&self) -> Point2D {
        Point2D::new((self.width / 2) as f64, (self.height / 2) as f64)
    }

    /// Clamp a point into the screen rectangle. NaN coordinates land on 0.
    pub fn clamp(&self, point: Point2D) -> Point2D {
        Point2D::new(
            clamp_axis(point.x, self.width),
            clamp_axis(point.y, self.height),
        )
    }

    pub fn contains(&self, point: &Point2D) -> bool {
        (0.0..=self.width as f64).contains(&point.x) && (0.0..=self.height as f64).contains(&point.y)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

fn clamp_axis(v: f64, extent: u32) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, extent as f64)
    }
}

impl Default for ScreenBounds {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}
