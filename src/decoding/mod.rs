//! Message extraction.
//!
//! This module turns frames into message bytes once the ring geometry
//! is fixed: each frame is sampled into a six-byte vector, transition
//! frames are filtered out, and the surviving message frames are read
//! under all six side rotations.

mod bytes;
mod decoder;
mod rotation;
mod stability;

pub use bytes::{ByteVector, MessageFrame};
pub use decoder::{FrameDecoder, SampleOutOfBounds};
pub use rotation::{Candidate, RotationResolver};
pub use stability::{StabilityState, StabilityStateMachine};
