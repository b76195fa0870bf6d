//! Side rotation candidates.
//!
//! The video alone cannot tell which physical side carries byte 0, so
//! the message is rendered once for each of the six possible offsets.

use super::MessageFrame;
use crate::config::SIDE_COUNT;
use serde::{Deserialize, Serialize};

/// The message read under one side rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Offset applied to every side index, 0 to 5.
    pub rotation: usize,
    /// Rotated bytes of every message frame, sides 0 to 5 in turn.
    pub bytes: Vec<u8>,
    /// `bytes` read as Latin-1 characters.
    pub text: String,
}

impl Candidate {
    /// Share of bytes that are printable ASCII or whitespace.
    ///
    /// A hint for the consumer; candidates are never ranked by it.
    pub fn printable_ratio(&self) -> f64 {
        if self.bytes.is_empty() {
            return 0.0;
        }
        let printable = self
            .bytes
            .iter()
            .filter(|b| b.is_ascii_graphic() || b.is_ascii_whitespace())
            .count();
        printable as f64 / self.bytes.len() as f64
    }
}

/// Builds the six rotation candidates for a message.
#[derive(Debug, Clone, Copy, Default)]
pub struct RotationResolver;

impl RotationResolver {
    /// Returns one candidate per rotation, in rotation order.
    pub fn resolve(frames: &[MessageFrame]) -> [Candidate; SIDE_COUNT] {
        std::array::from_fn(|rotation| Self::candidate(frames, rotation))
    }

    /// Returns the candidate for a single rotation.
    pub fn candidate(frames: &[MessageFrame], rotation: usize) -> Candidate {
        let bytes: Vec<u8> = frames
            .iter()
            .flat_map(|frame| frame.bytes.rotated(rotation).0)
            .collect();
        let text = bytes.iter().map(|&b| char::from(b)).collect();
        Candidate {
            rotation,
            bytes,
            text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoding::ByteVector;
    use proptest::prelude::*;

    fn frames(chunks: &[[u8; 6]]) -> Vec<MessageFrame> {
        chunks
            .iter()
            .enumerate()
            .map(|(index, &bytes)| MessageFrame {
                index,
                first_frame: index as u64 * 10,
                bytes: ByteVector::new(bytes),
            })
            .collect()
    }

    #[test]
    fn test_rotation_zero_reads_sides_in_order() {
        let message = frames(&[*b"Hello ", *b"world!"]);
        let candidates = RotationResolver::resolve(&message);

        assert_eq!(candidates[0].text, "Hello world!");
        assert_eq!(candidates[0].rotation, 0);
        assert!((candidates[0].printable_ratio() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_all_six_candidates_produced() {
        let message = frames(&[*b"abcdef"]);
        let candidates = RotationResolver::resolve(&message);

        let texts: Vec<&str> = candidates.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["abcdef", "fabcde", "efabcd", "defabc", "cdefab", "bcdefa"]);
    }

    #[test]
    fn test_high_bytes_map_to_latin1() {
        let message = frames(&[[0xff, 0xe9, 0x41, 0x00, 0x20, 0x7e]]);
        let candidate = RotationResolver::candidate(&message, 0);

        assert_eq!(candidate.text, "\u{ff}\u{e9}A\u{0} ~");
        assert_eq!(candidate.text.chars().count(), 6);
    }

    #[test]
    fn test_empty_message() {
        let candidates = RotationResolver::resolve(&[]);
        assert!(candidates.iter().all(|c| c.bytes.is_empty() && c.text.is_empty()));
    }

    proptest! {
        #[test]
        fn prop_rotation_round_trip(
            chunks in prop::collection::vec(any::<[u8; 6]>(), 0..20),
            rotation in 0usize..6
        ) {
            for chunk in &chunks {
                let v = ByteVector::new(*chunk);
                prop_assert_eq!(v.rotated(rotation).rotated((6 - rotation) % 6), v);
            }

            let message = frames(&chunks);
            let forward = RotationResolver::candidate(&message, rotation);
            let rotated: Vec<MessageFrame> = forward
                .bytes
                .chunks_exact(6)
                .enumerate()
                .map(|(index, chunk)| {
                    let mut bytes = [0u8; 6];
                    bytes.copy_from_slice(chunk);
                    MessageFrame { index, first_frame: 0, bytes: ByteVector::new(bytes) }
                })
                .collect();
            let back = RotationResolver::candidate(&rotated, (6 - rotation) % 6);
            prop_assert_eq!(back.bytes, chunks.concat());
        }
    }
}
