//! LED calibration.
//!
//! Discovers the pixel position of every LED from the first pass over
//! the video, then fixes the ring geometry once by splitting the LEDs
//! into six angularly ordered sides.

mod registry;
mod sides;

pub use registry::{DuplicateMatch, IngestOutcome, LedPosition, LedRegistry};
pub use sides::{normalized_angle, HexagonLayout, Side, SideLed};
