//! Frame input.
//!
//! This module provides the frame source abstraction the decoding
//! pipeline reads from. Video container decoding is out of scope; a
//! source yields raster frames, for example from a directory of frames
//! extracted from a recording.

mod frame;
mod mock;
mod source;

pub use frame::{Frame, PixelFormat};
pub use mock::{MockSource, RingGeometry};
pub use source::{FrameSkip, FrameSource, ImageSequenceSource, MemorySource, SourceError, SourceInfo};
