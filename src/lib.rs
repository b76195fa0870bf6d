//! LED Ring Message Decoder Library
//!
//! Recovers text transmitted by a hexagonal ring of LEDs from a recording
//! of the ring. Each of the six sides carries eight LEDs, so every stable
//! pattern shown by the ring encodes six bytes.
//!
//! # Architecture
//!
//! The system follows an explicit data flow:
//!
//! ```text
//! capture → detection → calibration → decoding
//!                                        ↓
//!              session (phases, progress, report)
//! ```
//!
//! # Design Principles
//!
//! - **Two passes**: LED positions are learned from the video before any
//!   frame is decoded, and never change afterwards
//! - **Transitions are noise**: only patterns held for several frames count
//! - **No guessing the orientation**: all six side rotations are reported
//!
//! # Example
//!
//! ```no_run
//! use ledring_decoder::{
//!     capture::{FrameSkip, ImageSequenceSource},
//!     config::DecoderConfig,
//!     session::{CancelToken, DecodingSession, TracingSink},
//! };
//!
//! let source = ImageSequenceSource::open("frames/", 30.0).unwrap();
//! let mut source = FrameSkip::new(source, 1);
//!
//! let mut session = DecodingSession::new(DecoderConfig::default()).unwrap();
//! let report = session
//!     .run(&mut source, &mut TracingSink::default(), &CancelToken::new())
//!     .unwrap();
//!
//! for candidate in &report.candidates {
//!     println!("rotation {}: {}", candidate.rotation, candidate.text);
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod calibration;
pub mod capture;
pub mod config;
pub mod decoding;
pub mod detection;
pub mod metrics;
pub mod session;

// Re-export commonly used types at crate root
pub use calibration::{HexagonLayout, LedRegistry};
pub use capture::{Frame, FrameSource, ImageSequenceSource, MockSource};
pub use config::DecoderConfig;
pub use decoding::{ByteVector, Candidate, FrameDecoder, MessageFrame, RotationResolver};
pub use detection::{BrightBlob, BrightSpotDetector};
pub use session::{DecodeReport, DecodingSession, ProgressSink};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
