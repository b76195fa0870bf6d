//! Prometheus metrics for decoding runs.
//!
//! # Metrics Exposed
//!
//! ## Calibration Metrics
//! - `ledring_leds_registered` - LEDs registered so far
//! - `ledring_led_target` - LEDs expected on the ring
//! - `ledring_calibration_complete` - 1 once the registry reached its target
//! - `ledring_calibration_frames_total` - Frames read while calibrating
//! - `ledring_duplicate_matches_total` - Blobs that matched several registered LEDs
//!
//! ## Decoding Metrics
//! - `ledring_decoding_frames_total` - Frames read while decoding
//! - `ledring_message_frames_total` - Message frames accepted
//! - `ledring_transitions_discarded_total` - Candidate patterns dropped as transition noise
//! - `ledring_warnings` - Warnings raised by the run
//!
//! # Example
//!
//! ```no_run
//! use ledring_decoder::config::DecoderConfig;
//! use ledring_decoder::metrics::{MetricsRegistry, MetricsSnapshot};
//! use ledring_decoder::session::DecodingSession;
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//! let session = DecodingSession::new(DecoderConfig::default()).expect("valid config");
//!
//! registry.update(&MetricsSnapshot::from_session(&session));
//! println!("{}", registry.encode().expect("encodable"));
//! ```

mod collector;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
