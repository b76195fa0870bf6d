//! Per-frame byte vectors and confirmed message frames.

use crate::config::{LEDS_PER_SIDE, SIDE_COUNT};
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// One byte per side: the optical state of the ring in a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ByteVector(pub [u8; SIDE_COUNT]);

impl ByteVector {
    /// Wraps six side bytes.
    #[inline]
    pub const fn new(bytes: [u8; SIDE_COUNT]) -> Self {
        Self(bytes)
    }

    /// Side bytes in side order.
    #[inline]
    pub fn bytes(&self) -> &[u8; SIDE_COUNT] {
        &self.0
    }

    /// Relabels side `i` as side `(i + rotation) mod 6`.
    pub fn rotated(&self, rotation: usize) -> Self {
        let mut out = [0u8; SIDE_COUNT];
        for (i, &byte) in self.0.iter().enumerate() {
            out[(i + rotation) % SIDE_COUNT] = byte;
        }
        Self(out)
    }

    /// Per-side bits, least significant first, for on/off rendering.
    pub fn bits(&self) -> [[bool; LEDS_PER_SIDE]; SIDE_COUNT] {
        self.0
            .map(|byte| std::array::from_fn(|bit| byte & (1 << bit) != 0))
    }
}

impl Index<usize> for ByteVector {
    type Output = u8;

    fn index(&self, side: usize) -> &u8 {
        &self.0[side]
    }
}

impl From<[u8; SIDE_COUNT]> for ByteVector {
    fn from(bytes: [u8; SIDE_COUNT]) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Display for ByteVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// A byte vector accepted as a stable message state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageFrame {
    /// Position in the decoded message, starting at 0.
    pub index: usize,
    /// Source frame where this state was first observed.
    pub first_frame: u64,
    /// The six side bytes.
    pub bytes: ByteVector,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_moves_bytes_forward() {
        let v = ByteVector::new([1, 2, 3, 4, 5, 6]);
        assert_eq!(v.rotated(0), v);
        assert_eq!(v.rotated(1).bytes(), &[6, 1, 2, 3, 4, 5]);
        assert_eq!(v.rotated(6), v);
    }

    #[test]
    fn test_bits_lsb_first() {
        let bits = ByteVector::new([0b0000_0101, 0, 0, 0, 0, 0x80]).bits();
        assert_eq!(bits[0], [true, false, true, false, false, false, false, false]);
        assert!(bits[5][7]);
        assert!(bits[1].iter().all(|b| !b));
    }

    #[test]
    fn test_display_hex() {
        let v = ByteVector::new([0x48, 0x65, 0x6c, 0x6c, 0x6f, 0x00]);
        assert_eq!(v.to_string(), "48 65 6c 6c 6f 00");
    }
}
