//! LED position registry.
//!
//! Accumulates blob centroids over successive frames into a stable set
//! of physical LED positions. A blob is the same LED as a registered
//! entry when both axis differences are below the tolerance.

use crate::capture::Frame;
use crate::config::CalibrationConfig;
use crate::detection::{BrightBlob, BrightSpotDetector, Point2D};

/// A registered LED; identity is its position.
pub type LedPosition = Point2D;

/// A blob that matched more than one registered LED.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateMatch {
    /// Centroid of the offending blob.
    pub blob: Point2D,
    /// Indices of every registered LED it matched.
    pub matches: Vec<usize>,
}

/// Result of ingesting one frame's blobs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestOutcome {
    /// Number of LEDs appended.
    pub added: usize,
    /// Blobs that matched several registered LEDs; none of them were added.
    pub duplicates: Vec<DuplicateMatch>,
}

/// Registered LED positions in insertion order.
#[derive(Debug, Clone)]
pub struct LedRegistry {
    leds: Vec<LedPosition>,
    target: usize,
    tolerance: f64,
    frames_ingested: u64,
}

impl LedRegistry {
    /// Creates an empty registry.
    pub fn new(config: &CalibrationConfig) -> Self {
        Self {
            leds: Vec::with_capacity(config.target_leds),
            target: config.target_leds,
            tolerance: config.tolerance_px,
            frames_ingested: 0,
        }
    }

    /// Detects blobs in `frame` and registers the new ones.
    pub fn ingest(&mut self, frame: &Frame, detector: &BrightSpotDetector) -> IngestOutcome {
        let blobs = detector.detect(frame);
        let outcome = self.ingest_blobs(&blobs);
        tracing::trace!(
            frame = frame.sequence(),
            blobs = blobs.len(),
            added = outcome.added,
            total = self.leds.len(),
            "Ingested calibration frame"
        );
        outcome
    }

    /// Registers every blob that matches no existing LED.
    ///
    /// Blobs registered earlier in the same call count as existing.
    pub fn ingest_blobs(&mut self, blobs: &[BrightBlob]) -> IngestOutcome {
        let mut outcome = IngestOutcome::default();
        self.frames_ingested += 1;

        for blob in blobs {
            let matches: Vec<usize> = self
                .leds
                .iter()
                .enumerate()
                .filter(|(_, led)| led.within_tolerance(&blob.centroid, self.tolerance))
                .map(|(i, _)| i)
                .collect();

            match matches.len() {
                0 => {
                    self.leds.push(blob.centroid);
                    outcome.added += 1;
                    tracing::debug!(
                        x = blob.centroid.x,
                        y = blob.centroid.y,
                        radius = blob.radius,
                        count = self.leds.len(),
                        "Registered LED"
                    );
                }
                1 => {}
                _ => outcome.duplicates.push(DuplicateMatch {
                    blob: blob.centroid,
                    matches,
                }),
            }
        }

        if self.leds.len() > self.target && outcome.added > 0 {
            tracing::warn!(
                count = self.leds.len(),
                target = self.target,
                "Registered more LEDs than the ring holds"
            );
        }

        outcome
    }

    /// Returns true once the target count is reached.
    pub fn is_complete(&self) -> bool {
        self.leds.len() >= self.target
    }

    /// Returns `(registered, target)`.
    pub fn progress(&self) -> (usize, usize) {
        (self.leds.len(), self.target)
    }

    /// Returns the registered positions in insertion order.
    pub fn leds(&self) -> &[LedPosition] {
        &self.leds
    }

    /// Returns the number of registered LEDs.
    pub fn len(&self) -> usize {
        self.leds.len()
    }

    /// Returns true if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.leds.is_empty()
    }

    /// Returns the target LED count.
    pub fn target(&self) -> usize {
        self.target
    }

    /// Returns how many frames were ingested.
    pub fn frames_ingested(&self) -> u64 {
        self.frames_ingested
    }
}

impl Default for LedRegistry {
    fn default() -> Self {
        Self::new(&CalibrationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn blob(x: f64, y: f64) -> BrightBlob {
        BrightBlob {
            centroid: Point2D::new(x, y),
            radius: 12.0,
        }
    }

    fn grid_blobs(count: usize) -> Vec<BrightBlob> {
        (0..count)
            .map(|i| blob(50.0 + (i % 8) as f64 * 40.0, 50.0 + (i / 8) as f64 * 40.0))
            .collect()
    }

    #[test]
    fn test_registers_48_distinct_leds() {
        let mut registry = LedRegistry::default();
        let blobs = grid_blobs(48);

        // Spread over three calibration frames.
        for chunk in blobs.chunks(16) {
            registry.ingest_blobs(chunk);
        }

        assert_eq!(registry.len(), 48);
        assert!(registry.is_complete());
        assert_eq!(registry.progress(), (48, 48));
    }

    #[test]
    fn test_jittered_blob_matches_existing() {
        let mut registry = LedRegistry::default();
        registry.ingest_blobs(&[blob(100.0, 100.0)]);

        let outcome = registry.ingest_blobs(&[blob(104.0, 97.0)]);
        assert_eq!(outcome.added, 0);
        assert!(outcome.duplicates.is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_match_is_reported_not_added() {
        let mut registry = LedRegistry::default();
        registry.ingest_blobs(&[blob(100.0, 100.0), blob(112.0, 100.0)]);
        assert_eq!(registry.len(), 2);

        let outcome = registry.ingest_blobs(&[blob(106.0, 100.0)]);
        assert_eq!(outcome.added, 0);
        assert_eq!(outcome.duplicates.len(), 1);
        assert_eq!(outcome.duplicates[0].matches, vec![0, 1]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_same_frame_blobs_dedup_against_each_other() {
        let mut registry = LedRegistry::default();
        let outcome = registry.ingest_blobs(&[blob(10.0, 10.0), blob(12.0, 11.0)]);

        assert_eq!(outcome.added, 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_incomplete_is_not_an_error() {
        let mut registry = LedRegistry::default();
        registry.ingest_blobs(&grid_blobs(30));

        assert!(!registry.is_complete());
        assert_eq!(registry.progress(), (30, 48));
    }

    proptest! {
        #[test]
        fn prop_second_ingest_adds_nothing(
            coords in prop::collection::vec((0.0f64..2000.0, 0.0f64..1400.0), 0..80)
        ) {
            let blobs: Vec<BrightBlob> = coords.iter().map(|&(x, y)| blob(x, y)).collect();
            let mut registry = LedRegistry::default();

            registry.ingest_blobs(&blobs);
            let before = registry.len();
            let outcome = registry.ingest_blobs(&blobs);

            prop_assert_eq!(outcome.added, 0);
            prop_assert_eq!(registry.len(), before);
        }
    }
}
