//! Bright spot detection.
//!
//! This module finds lit LEDs in a single frame. It knows nothing about
//! previous frames; accumulation across frames happens in calibration.

mod annotate;
mod blob;
mod circle;
mod detector;

pub use annotate::annotate;
pub use blob::{BrightBlob, Point2D};
pub use circle::{convex_hull, min_enclosing_circle, Circle};
pub use detector::{BrightSpotDetector, Rejection, SpotVerdict};
