//! Point and blob types.

use serde::{Deserialize, Serialize};

/// Floating-point pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    /// Column, growing rightwards.
    pub x: f64,
    /// Row, growing downwards.
    pub y: f64,
}

impl Point2D {
    /// Creates a point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(&self, other: &Point2D) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// True if both per-axis differences are strictly below `tolerance`.
    #[inline]
    pub fn within_tolerance(&self, other: &Point2D, tolerance: f64) -> bool {
        (self.x - other.x).abs() < tolerance && (self.y - other.y).abs() < tolerance
    }

    /// Nearest integer pixel, halves rounded away from zero.
    #[inline]
    pub fn rounded(&self) -> (i64, i64) {
        (self.x.round() as i64, self.y.round() as i64)
    }
}

/// A bright region found in one frame, described by its enclosing circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrightBlob {
    /// Center of the minimal enclosing circle.
    pub centroid: Point2D,
    /// Radius of the minimal enclosing circle.
    pub radius: f64,
}
