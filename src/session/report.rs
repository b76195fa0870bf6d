//! End-of-run summary.

use super::{DecodingSession, Phase};
use crate::config::SIDE_COUNT;
use crate::decoding::{Candidate, MessageFrame};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Everything a host needs to present the outcome of a run.
#[derive(Debug, Clone, Serialize)]
pub struct DecodeReport {
    /// When the report was taken.
    pub finished_at: DateTime<Utc>,
    /// Phase the session was in.
    pub phase: Phase,
    /// True if the registry reached its LED target.
    pub calibration_complete: bool,
    /// LEDs registered.
    pub leds_registered: usize,
    /// LEDs expected.
    pub led_target: usize,
    /// Frames read while calibrating.
    pub calibration_frames: u64,
    /// Frames read while decoding.
    pub decoding_frames: u64,
    /// Candidate patterns dropped as transition noise.
    pub transitions_discarded: u64,
    /// LEDs per side, once sides were assigned.
    pub side_sizes: Option<[usize; SIDE_COUNT]>,
    /// Warnings, rendered as text.
    pub warnings: Vec<String>,
    /// Accepted message frames.
    pub message_frames: Vec<MessageFrame>,
    /// One candidate per rotation, rotation 0 first.
    pub candidates: Vec<Candidate>,
}

impl DecodeReport {
    /// Captures the current state of `session`.
    pub fn from_session(session: &DecodingSession) -> Self {
        let registry = session.registry();
        Self {
            finished_at: Utc::now(),
            phase: session.phase(),
            calibration_complete: registry.is_complete(),
            leds_registered: registry.len(),
            led_target: registry.target(),
            calibration_frames: session.calibration_frames(),
            decoding_frames: session.decoding_frames(),
            transitions_discarded: session.transitions_discarded(),
            side_sizes: session
                .layout()
                .map(|layout| std::array::from_fn(|i| layout.sides()[i].len())),
            warnings: session.warnings().iter().map(|w| w.to_string()).collect(),
            message_frames: session.message_frames().to_vec(),
            candidates: session.candidates().to_vec(),
        }
    }

    /// The candidate at `rotation`, if any.
    pub fn candidate(&self, rotation: usize) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.rotation == rotation)
    }

    /// Serializes the report as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
