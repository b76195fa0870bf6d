//! Synthetic LED ring source.
//!
//! Renders a hexagonal ring of LEDs blinking a scripted message. Used
//! for tests, benches and the `demo` command; NOT a model of any real
//! camera's optics.

use super::{Frame, FrameSource, SourceError, SourceInfo};
use crate::config::{LEDS_PER_SIDE, SIDE_COUNT};
use crate::detection::Point2D;

/// Luminance of the frame background.
const BACKGROUND: u8 = 20;
/// Luminance of an unlit LED.
const LED_OFF: u8 = 70;
/// Luminance of a lit LED.
const LED_ON: u8 = 250;

/// Placement of the rendered ring.
#[derive(Debug, Clone, PartialEq)]
pub struct RingGeometry {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Ring center.
    pub center: Point2D,
    /// Distance from the center to each hexagon corner.
    pub circumradius: f64,
    /// Radius of each rendered LED.
    pub led_radius: f64,
}

impl Default for RingGeometry {
    fn default() -> Self {
        Self {
            width: 660,
            height: 660,
            center: Point2D::new(330.0, 330.0),
            circumradius: 280.0,
            led_radius: 12.0,
        }
    }
}

impl RingGeometry {
    /// LED centers, side by side, each side in bit order.
    ///
    /// Side `k` is the hexagon edge facing `k · 60°`; its LEDs run from
    /// the corner at `k · 60° - 30°` to the corner at `k · 60° + 30°`.
    pub fn led_positions(&self) -> Vec<Point2D> {
        let corner = |deg: f64| {
            let rad = deg.to_radians();
            Point2D::new(
                self.center.x + self.circumradius * rad.cos(),
                self.center.y + self.circumradius * rad.sin(),
            )
        };

        let mut positions = Vec::with_capacity(SIDE_COUNT * LEDS_PER_SIDE);
        for side in 0..SIDE_COUNT {
            let from = corner(side as f64 * 60.0 - 30.0);
            let to = corner(side as f64 * 60.0 + 30.0);
            for led in 0..LEDS_PER_SIDE {
                let t = (led as f64 + 0.5) / LEDS_PER_SIDE as f64;
                positions.push(Point2D::new(
                    from.x + t * (to.x - from.x),
                    from.y + t * (to.y - from.y),
                ));
            }
        }
        positions
    }

    /// Renders one grayscale frame showing `bytes`.
    pub fn render(&self, bytes: &[u8; SIDE_COUNT], sequence: u64) -> Frame {
        let (w, h) = (self.width as usize, self.height as usize);
        let mut pixels = vec![BACKGROUND; w * h];
        let r = self.led_radius;

        for (i, center) in self.led_positions().iter().enumerate() {
            let (side, bit) = (i / LEDS_PER_SIDE, i % LEDS_PER_SIDE);
            let value = if bytes[side] & (1 << bit) != 0 {
                LED_ON
            } else {
                LED_OFF
            };

            let x0 = (center.x - r).floor().max(0.0) as usize;
            let x1 = ((center.x + r).ceil() as usize).min(w.saturating_sub(1));
            let y0 = (center.y - r).floor().max(0.0) as usize;
            let y1 = ((center.y + r).ceil() as usize).min(h.saturating_sub(1));
            for y in y0..=y1 {
                for x in x0..=x1 {
                    let dx = x as f64 - center.x;
                    let dy = y as f64 - center.y;
                    if dx * dx + dy * dy <= r * r {
                        pixels[y * w + x] = value;
                    }
                }
            }
        }

        Frame::new(pixels, self.width, self.height, sequence)
    }
}

/// Mock frame source replaying a scripted sequence of ring states.
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    geometry: RingGeometry,
    script: Vec<[u8; SIDE_COUNT]>,
    cursor: usize,
}

impl MockSource {
    /// Replays `script`, one state per frame.
    pub fn new(geometry: RingGeometry, script: Vec<[u8; SIDE_COUNT]>) -> Self {
        Self {
            geometry,
            script,
            cursor: 0,
        }
    }

    /// Scripts `text` the way a transmitter would show it.
    ///
    /// All LEDs light first so calibration can see every one. Each
    /// six-byte chunk (space padded) is then held for `hold` frames,
    /// with a single transition frame between states in which the LEDs
    /// of both states appear lit.
    pub fn message(geometry: RingGeometry, text: &str, hold: usize) -> Self {
        let mut states = vec![[0xff; SIDE_COUNT]];
        for chunk in text.as_bytes().chunks(SIDE_COUNT) {
            let mut state = [b' '; SIDE_COUNT];
            state[..chunk.len()].copy_from_slice(chunk);
            states.push(state);
        }

        let mut script: Vec<[u8; SIDE_COUNT]> = Vec::with_capacity(states.len() * (hold + 1));
        for (i, state) in states.iter().enumerate() {
            if let Some(previous) = i.checked_sub(1).map(|p| states[p]) {
                let blended: [u8; SIDE_COUNT] = std::array::from_fn(|side| previous[side] | state[side]);
                script.push(blended);
            }
            script.extend(std::iter::repeat(*state).take(hold.max(1)));
        }

        Self::new(geometry, script)
    }

    /// Returns the rendering geometry.
    pub fn geometry(&self) -> &RingGeometry {
        &self.geometry
    }

    /// Returns the scripted states.
    pub fn script(&self) -> &[[u8; SIDE_COUNT]] {
        &self.script
    }
}

impl FrameSource for MockSource {
    fn read(&mut self) -> Result<Option<Frame>, SourceError> {
        let Some(state) = self.script.get(self.cursor) else {
            return Ok(None);
        };
        let frame = self.geometry.render(state, self.cursor as u64);
        self.cursor += 1;
        Ok(Some(frame))
    }

    fn seek_to_start(&mut self) -> Result<(), SourceError> {
        self.cursor = 0;
        Ok(())
    }

    fn info(&self) -> SourceInfo {
        SourceInfo {
            frame_count: Some(self.script.len() as u64),
            frame_rate: Some(30.0),
            width: self.geometry.width,
            height: self.geometry.height,
        }
    }
}
