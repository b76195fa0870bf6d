//! Per-frame sampling of the LED ring.

use super::ByteVector;
use crate::calibration::HexagonLayout;
use crate::capture::Frame;
use crate::config::{LEDS_PER_SIDE, SIDE_COUNT};
use crate::detection::Point2D;
use thiserror::Error;

/// A registered LED lies outside the sampled frame.
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "LED {led} of side {side} at ({x}, {y}) lies outside frame {frame} ({width}x{height})"
)]
pub struct SampleOutOfBounds {
    /// Offending frame's sequence number.
    pub frame: u64,
    /// Side index.
    pub side: usize,
    /// LED index within the side.
    pub led: usize,
    /// Rounded sample column.
    pub x: i64,
    /// Rounded sample row.
    pub y: i64,
    /// Frame width.
    pub width: u32,
    /// Frame height.
    pub height: u32,
}

/// Samples each side's LEDs and packs them into one byte per side.
///
/// The i-th LED of a side sets bit `1 << i` when its luminance exceeds
/// the threshold. Only the first eight LEDs of a side are sampled.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    points: [Vec<Point2D>; SIDE_COUNT],
    threshold: u8,
}

impl FrameDecoder {
    /// Builds a decoder for a fixed layout.
    pub fn new(layout: &HexagonLayout, threshold: u8) -> Self {
        let points = std::array::from_fn(|i| {
            let side = &layout.sides()[i];
            if side.len() > LEDS_PER_SIDE {
                tracing::warn!(
                    side = i,
                    leds = side.len(),
                    "Side has more LEDs than bits; extra LEDs are not sampled"
                );
            }
            side.leds()
                .iter()
                .take(LEDS_PER_SIDE)
                .map(|led| led.position)
                .collect()
        });
        Self { points, threshold }
    }

    /// Luminance a sample must exceed to read as a set bit.
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Decodes one frame.
    pub fn decode(&self, frame: &Frame) -> Result<ByteVector, SampleOutOfBounds> {
        let mut bytes = [0u8; SIDE_COUNT];
        for (side, points) in self.points.iter().enumerate() {
            let mut byte = 0u8;
            for (led, point) in points.iter().enumerate() {
                let (x, y) = point.rounded();
                let luma = frame.luma_at(x, y).ok_or_else(|| SampleOutOfBounds {
                    frame: frame.sequence(),
                    side,
                    led,
                    x,
                    y,
                    width: frame.width(),
                    height: frame.height(),
                })?;
                if luma > self.threshold {
                    byte |= 1 << led;
                }
            }
            bytes[side] = byte;
        }

        let vector = ByteVector::new(bytes);
        tracing::trace!(frame = frame.sequence(), bytes = %vector, "Decoded frame");
        Ok(vector)
    }
}
