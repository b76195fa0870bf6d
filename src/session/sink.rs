//! Progress and output sinks.
//!
//! The host that displays decoding progress implements [`ProgressSink`].
//! Every method has an empty default so a host only overrides what it
//! renders.

use super::SessionWarning;
use crate::calibration::HexagonLayout;
use crate::config::{LEDS_PER_SIDE, SIDE_COUNT};
use crate::decoding::{Candidate, MessageFrame};

/// Per-side on/off state of a message frame, least significant bit first.
pub type BitRendering = [[bool; LEDS_PER_SIDE]; SIDE_COUNT];

/// Receives progress and results from a decoding session.
pub trait ProgressSink {
    /// LEDs registered so far out of the target.
    fn calibration_progress(&mut self, _found: usize, _target: usize) {}

    /// The side geometry, once fixed.
    fn sides_assigned(&mut self, _layout: &HexagonLayout) {}

    /// A newly accepted message frame with its bit rendering.
    fn message_frame(&mut self, _frame: &MessageFrame, _bits: &BitRendering) {}

    /// The six rotation candidates at the end of a run.
    fn candidates(&mut self, _candidates: &[Candidate]) {}

    /// A non-fatal condition.
    fn warning(&mut self, _warning: &SessionWarning) {}
}

impl<S: ProgressSink + ?Sized> ProgressSink for &mut S {
    fn calibration_progress(&mut self, found: usize, target: usize) {
        (**self).calibration_progress(found, target)
    }

    fn sides_assigned(&mut self, layout: &HexagonLayout) {
        (**self).sides_assigned(layout)
    }

    fn message_frame(&mut self, frame: &MessageFrame, bits: &BitRendering) {
        (**self).message_frame(frame, bits)
    }

    fn candidates(&mut self, candidates: &[Candidate]) {
        (**self).candidates(candidates)
    }

    fn warning(&mut self, warning: &SessionWarning) {
        (**self).warning(warning)
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {}

/// Forwards progress to `tracing`.
#[derive(Debug, Clone, Default)]
pub struct TracingSink {
    last_found: usize,
}

impl ProgressSink for TracingSink {
    fn calibration_progress(&mut self, found: usize, target: usize) {
        if found != self.last_found {
            self.last_found = found;
            tracing::info!(found, target, "Calibration progress");
        }
    }

    fn sides_assigned(&mut self, layout: &HexagonLayout) {
        for side in layout.sides() {
            tracing::debug!(side = side.index(), leds = side.len(), "Side geometry");
        }
    }

    fn message_frame(&mut self, frame: &MessageFrame, bits: &BitRendering) {
        let pattern: Vec<String> = bits
            .iter()
            .map(|side| side.iter().map(|&on| if on { '#' } else { '.' }).collect())
            .collect();
        tracing::info!(
            index = frame.index,
            first_frame = frame.first_frame,
            bytes = %frame.bytes,
            pattern = %pattern.join(" "),
            "Message frame"
        );
    }

    fn warning(&mut self, warning: &SessionWarning) {
        tracing::warn!(%warning, "Decoding warning");
    }
}

/// Records everything it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    /// Every calibration progress report.
    pub progress: Vec<(usize, usize)>,
    /// Side sizes reported when the geometry was fixed.
    pub side_sizes: Option<[usize; SIDE_COUNT]>,
    /// Accepted message frames in order.
    pub frames: Vec<MessageFrame>,
    /// Final candidates.
    pub candidates: Vec<Candidate>,
    /// Warnings in order.
    pub warnings: Vec<SessionWarning>,
}

impl ProgressSink for RecordingSink {
    fn calibration_progress(&mut self, found: usize, target: usize) {
        self.progress.push((found, target));
    }

    fn sides_assigned(&mut self, layout: &HexagonLayout) {
        self.side_sizes = Some(std::array::from_fn(|i| layout.sides()[i].len()));
    }

    fn message_frame(&mut self, frame: &MessageFrame, _bits: &BitRendering) {
        self.frames.push(*frame);
    }

    fn candidates(&mut self, candidates: &[Candidate]) {
        self.candidates = candidates.to_vec();
    }

    fn warning(&mut self, warning: &SessionWarning) {
        self.warnings.push(warning.clone());
    }
}
