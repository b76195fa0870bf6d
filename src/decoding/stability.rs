//! Transition filtering.
//!
//! Every physical pattern change produces one or more frames where the
//! camera catches LEDs mid-switch. Only a pattern that holds for
//! `min_stable_frames` consecutive frames is accepted as a message frame.
//!
//! The first frame of a stream is accepted without confirmation, even
//! when it was captured mid-transition.

use super::{ByteVector, MessageFrame};
use crate::config::StabilityConfig;

/// Filter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StabilityState {
    /// No frame observed yet.
    Idle,
    /// The current pattern is confirmed.
    Stable {
        /// Last accepted pattern.
        last_stable: ByteVector,
    },
    /// A different pattern is waiting for confirmation.
    Changing {
        /// Last accepted pattern.
        last_stable: ByteVector,
        /// Pattern being confirmed.
        candidate: ByteVector,
        /// Consecutive observations of `candidate`, including the first.
        match_run: u32,
        /// Frame where `candidate` was first seen.
        since: u64,
    },
}

/// Collapses a per-frame byte vector stream into stable message frames.
#[derive(Debug, Clone)]
pub struct StabilityStateMachine {
    state: StabilityState,
    min_stable_frames: u32,
    emitted: usize,
    observed: u64,
    discarded: u64,
}

impl StabilityStateMachine {
    pub fn new(config: &StabilityConfig) -> Self {
        Self {
            state: StabilityState::Idle,
            min_stable_frames: config.min_stable_frames.max(1),
            emitted: 0,
            observed: 0,
            discarded: 0,
        }
    }

    /// Feeds the byte vector decoded from source frame `frame`.
    ///
    /// Returns the message frame accepted by this observation, if any.
    pub fn observe(&mut self, frame: u64, vector: ByteVector) -> Option<MessageFrame> {
        self.observed += 1;

        match self.state {
            StabilityState::Idle => {
                self.state = StabilityState::Stable {
                    last_stable: vector,
                };
                Some(self.emit(frame, vector))
            }
            StabilityState::Stable { last_stable } => {
                if vector == last_stable {
                    return None;
                }
                self.begin_candidate(last_stable, frame, vector);
                self.confirm_if_ready()
            }
            StabilityState::Changing {
                last_stable,
                candidate,
                match_run,
                since,
            } => {
                if vector != candidate {
                    self.discarded += 1;
                    tracing::trace!(
                        frame,
                        abandoned = %candidate,
                        run = match_run,
                        "Candidate pattern abandoned"
                    );
                    self.begin_candidate(last_stable, frame, vector);
                    return self.confirm_if_ready();
                }

                self.state = StabilityState::Changing {
                    last_stable,
                    candidate,
                    match_run: match_run + 1,
                    since,
                };
                self.confirm_if_ready()
            }
        }
    }

    fn begin_candidate(&mut self, last_stable: ByteVector, frame: u64, candidate: ByteVector) {
        self.state = StabilityState::Changing {
            last_stable,
            candidate,
            match_run: 1,
            since: frame,
        };
    }

    fn confirm_if_ready(&mut self) -> Option<MessageFrame> {
        match self.state {
            StabilityState::Changing {
                candidate,
                match_run,
                since,
                ..
            } if match_run >= self.min_stable_frames => {
                self.state = StabilityState::Stable {
                    last_stable: candidate,
                };
                Some(self.emit(since, candidate))
            }
            _ => None,
        }
    }

    fn emit(&mut self, first_frame: u64, bytes: ByteVector) -> MessageFrame {
        let message = MessageFrame {
            index: self.emitted,
            first_frame,
            bytes,
        };
        self.emitted += 1;
        tracing::debug!(
            index = message.index,
            first_frame,
            bytes = %bytes,
            "Accepted message frame"
        );
        message
    }

    /// Ends the stream, dropping any unconfirmed candidate.
    ///
    /// Returns the dropped candidate.
    pub fn finish(&mut self) -> Option<ByteVector> {
        match self.state {
            StabilityState::Changing {
                last_stable,
                candidate,
                match_run,
                ..
            } => {
                self.discarded += 1;
                tracing::debug!(
                    pending = %candidate,
                    run = match_run,
                    "Stream ended before candidate was confirmed"
                );
                self.state = StabilityState::Stable { last_stable };
                Some(candidate)
            }
            _ => None,
        }
    }

    /// Current filter state.
    pub fn state(&self) -> StabilityState {
        self.state
    }

    /// Number of message frames accepted so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Number of byte vectors observed.
    pub fn observed(&self) -> u64 {
        self.observed
    }

    /// Number of candidate patterns dropped without confirmation.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }
}

impl Default for StabilityStateMachine {
    fn default() -> Self {
        Self::new(&StabilityConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: ByteVector = ByteVector::new([0x48, 0x65, 0x6c, 0x6c, 0x6f, 0x20]);
    const B: ByteVector = ByteVector::new([0x77, 0x6f, 0x72, 0x6c, 0x64, 0x21]);
    const N: ByteVector = ByteVector::new([0x7f, 0x6f, 0x7e, 0x6c, 0x6f, 0x21]);

    fn run(stream: &[ByteVector]) -> Vec<MessageFrame> {
        let mut machine = StabilityStateMachine::default();
        let out: Vec<MessageFrame> = stream
            .iter()
            .enumerate()
            .filter_map(|(i, &v)| machine.observe(i as u64, v))
            .collect();
        machine.finish();
        out
    }

    fn bytes(frames: &[MessageFrame]) -> Vec<ByteVector> {
        frames.iter().map(|f| f.bytes).collect()
    }

    #[test]
    fn test_four_repeats_confirm() {
        let frames = run(&[A, B, B, B, B, A, A, A, A, A]);

        assert_eq!(bytes(&frames), vec![A, B, A]);
        assert_eq!(frames[1].first_frame, 1);
        assert_eq!(frames[2].first_frame, 5);
        assert_eq!(
            frames.iter().map(|f| f.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_three_repeats_do_not_confirm() {
        let frames = run(&[A, B, B, B, A, A, A, A, A]);
        assert_eq!(bytes(&frames), vec![A, A]);
    }

    #[test]
    fn test_transition_noise_is_filtered() {
        let frames = run(&[A, A, A, N, B, B, B, B, B, N, A, A, A, A]);
        assert_eq!(bytes(&frames), vec![A, B, A]);
    }

    #[test]
    fn test_first_frame_accepted_unconditionally() {
        let frames = run(&[N, A, A, A, A]);
        assert_eq!(bytes(&frames), vec![N, A]);
    }

    #[test]
    fn test_unconfirmed_tail_is_dropped() {
        let mut machine = StabilityStateMachine::default();
        for (i, v) in [A, B, B].into_iter().enumerate() {
            machine.observe(i as u64, v);
        }

        assert_eq!(machine.finish(), Some(B));
        assert_eq!(machine.emitted(), 1);
        assert_eq!(machine.state(), StabilityState::Stable { last_stable: A });
    }

    #[test]
    fn test_configurable_confirmation() {
        let mut machine = StabilityStateMachine::new(&StabilityConfig {
            min_stable_frames: 1,
        });
        let accepted: Vec<_> = [A, N, B]
            .into_iter()
            .enumerate()
            .filter_map(|(i, v)| machine.observe(i as u64, v))
            .map(|f| f.bytes)
            .collect();

        assert_eq!(accepted, vec![A, N, B]);
    }

    #[test]
    fn test_empty_stream() {
        assert!(run(&[]).is_empty());
    }
}
