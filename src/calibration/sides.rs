//! Hexagon side assignment.
//!
//! Partitions the registered LEDs into six 60° sectors around their
//! centroid. Angles are shifted by π/6 so that sector boundaries fall on
//! the hexagon's corners rather than through the middle of a side.

use super::LedPosition;
use crate::config::SIDE_COUNT;
use crate::detection::Point2D;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_3, FRAC_PI_6, TAU};

/// One LED of a side with the angle it was sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SideLed {
    /// Registered pixel position.
    pub position: LedPosition,
    /// Phase-shifted angle around the centroid, in [0, 2π).
    pub angle: f64,
}

/// LEDs of one sector, in ascending angle. The first LED carries the
/// least significant bit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Side {
    index: usize,
    leds: Vec<SideLed>,
}

impl Side {
    /// Sector index, 0 to 5.
    pub fn index(&self) -> usize {
        self.index
    }

    /// LEDs in bit order.
    pub fn leds(&self) -> &[SideLed] {
        &self.leds
    }

    /// Number of LEDs on this side.
    pub fn len(&self) -> usize {
        self.leds.len()
    }

    /// True if no LED fell into this sector.
    pub fn is_empty(&self) -> bool {
        self.leds.is_empty()
    }
}

/// The six sides of the ring, fixed for a decoding session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HexagonLayout {
    centroid: Point2D,
    sides: [Side; SIDE_COUNT],
}

impl HexagonLayout {
    /// Partitions `leds` into six angularly ordered sides.
    ///
    /// The result depends only on the set of positions, apart from the
    /// relative order of LEDs at exactly equal angles.
    pub fn assign(leds: &[LedPosition]) -> Self {
        let centroid = centroid(leds);
        let mut sides: [Side; SIDE_COUNT] = std::array::from_fn(|index| Side {
            index,
            leds: Vec::new(),
        });

        for &position in leds {
            let angle = normalized_angle(&centroid, &position);
            sides[sector_of(angle)].leds.push(SideLed { position, angle });
        }

        for side in &mut sides {
            side.leds.sort_by(|a, b| a.angle.total_cmp(&b.angle));
        }

        tracing::info!(
            leds = leds.len(),
            centroid_x = centroid.x,
            centroid_y = centroid.y,
            sizes = ?sides.iter().map(Side::len).collect::<Vec<_>>(),
            "Assigned LEDs to hexagon sides"
        );

        Self { centroid, sides }
    }

    /// Mean of all LED positions.
    pub fn centroid(&self) -> Point2D {
        self.centroid
    }

    /// All six sides, indexed by sector.
    pub fn sides(&self) -> &[Side; SIDE_COUNT] {
        &self.sides
    }

    /// Total LEDs across all sides.
    pub fn led_count(&self) -> usize {
        self.sides.iter().map(Side::len).sum()
    }
}

/// Arithmetic mean of the points; the origin for an empty set.
fn centroid(points: &[Point2D]) -> Point2D {
    if points.is_empty() {
        return Point2D::default();
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Point2D::new(sx / n, sy / n)
}

/// Angle of `point` around `centroid`, shifted by π/6 into [0, 2π).
pub fn normalized_angle(centroid: &Point2D, point: &Point2D) -> f64 {
    let raw = (point.y - centroid.y).atan2(point.x - centroid.x);
    let angle = (raw + FRAC_PI_6).rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU.
    if angle >= TAU {
        0.0
    } else {
        angle
    }
}

fn sector_of(angle: f64) -> usize {
    ((angle / FRAC_PI_3).floor() as usize).min(SIDE_COUNT - 1)
}
