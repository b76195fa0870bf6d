//! Bright spot detection.
//!
//! Binarizes a frame by luminance, groups lit pixels into 8-connected
//! regions and describes each region by its minimal enclosing circle.
//! Small regions and regions below the ring's visible area are rejected.

use super::circle::min_enclosing_circle;
use super::{BrightBlob, Point2D};
use crate::capture::Frame;
use crate::config::DetectionConfig;
use image::GrayImage;
use std::collections::BTreeMap;

/// Why a bright region was not accepted as an LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Enclosing radius not above the minimum.
    TooSmall,
    /// Centroid at or below the vertical bound.
    OutsideVisibleArea,
}

/// A bright region together with the detector's verdict on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotVerdict {
    /// The region's enclosing circle.
    pub blob: BrightBlob,
    /// `None` when the region is accepted.
    pub rejection: Option<Rejection>,
}

impl SpotVerdict {
    /// True if the region counts as an LED.
    #[inline]
    pub fn is_accepted(&self) -> bool {
        self.rejection.is_none()
    }
}

/// Per-frame bright spot detector. Stateless apart from its settings.
#[derive(Debug, Clone)]
pub struct BrightSpotDetector {
    config: DetectionConfig,
}

impl BrightSpotDetector {
    /// Creates a detector with the given settings.
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    /// Luminance a pixel must exceed to count as lit.
    #[inline]
    pub fn threshold(&self) -> u8 {
        self.config.threshold
    }

    /// Returns the accepted blobs of a frame.
    pub fn detect(&self, frame: &Frame) -> Vec<BrightBlob> {
        self.classify(frame)
            .into_iter()
            .filter(SpotVerdict::is_accepted)
            .map(|verdict| verdict.blob)
            .collect()
    }

    /// Returns every bright region of a frame with its verdict.
    pub fn classify(&self, frame: &Frame) -> Vec<SpotVerdict> {
        let luma = frame.to_luma();
        let verdicts: Vec<SpotVerdict> = bright_regions(&luma, self.config.threshold)
            .into_iter()
            .filter_map(|region| min_enclosing_circle(&region))
            .map(|circle| {
                let blob = BrightBlob {
                    centroid: circle.center,
                    radius: circle.radius,
                };
                SpotVerdict {
                    blob,
                    rejection: self.judge(&blob),
                }
            })
            .collect();

        tracing::trace!(
            frame = frame.sequence(),
            regions = verdicts.len(),
            accepted = verdicts.iter().filter(|v| v.is_accepted()).count(),
            "Classified bright regions"
        );

        verdicts
    }

    fn judge(&self, blob: &BrightBlob) -> Option<Rejection> {
        if blob.radius <= self.config.min_radius {
            Some(Rejection::TooSmall)
        } else if blob.centroid.y >= self.config.max_y {
            Some(Rejection::OutsideVisibleArea)
        } else {
            None
        }
    }
}

impl Default for BrightSpotDetector {
    fn default() -> Self {
        Self::new(DetectionConfig::default())
    }
}

/// Outline points of each 8-connected region of pixels above `threshold`.
///
/// Each region is reduced to the leftmost and rightmost pixel center of
/// every row it spans, which keeps its convex hull intact.
fn bright_regions(luma: &GrayImage, threshold: u8) -> Vec<Vec<Point2D>> {
    let (width, height) = luma.dimensions();
    let (w, h) = (width as usize, height as usize);
    let lit: Vec<bool> = luma.as_raw().iter().map(|&v| v > threshold).collect();
    let mut visited = vec![false; w * h];
    let mut regions = Vec::new();
    let mut stack: Vec<usize> = Vec::new();

    for start in 0..lit.len() {
        if !lit[start] || visited[start] {
            continue;
        }

        let mut extents: BTreeMap<usize, (usize, usize)> = BTreeMap::new();
        visited[start] = true;
        stack.push(start);

        while let Some(idx) = stack.pop() {
            let (x, y) = (idx % w, idx / w);
            let span = extents.entry(y).or_insert((x, x));
            span.0 = span.0.min(x);
            span.1 = span.1.max(x);

            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
                        continue;
                    }
                    let nidx = ny as usize * w + nx as usize;
                    if lit[nidx] && !visited[nidx] {
                        visited[nidx] = true;
                        stack.push(nidx);
                    }
                }
            }
        }

        let mut outline = Vec::with_capacity(extents.len() * 2);
        for (row, (lo, hi)) in extents {
            outline.push(Point2D::new(lo as f64, row as f64));
            if hi != lo {
                outline.push(Point2D::new(hi as f64, row as f64));
            }
        }
        regions.push(outline);
    }

    regions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_disks(width: u32, height: u32, disks: &[(i64, i64, i64)]) -> Frame {
        let mut pixels = vec![30u8; (width * height) as usize];
        for &(cx, cy, r) in disks {
            for y in (cy - r)..=(cy + r) {
                for x in (cx - r)..=(cx + r) {
                    if (x - cx).pow(2) + (y - cy).pow(2) <= r * r {
                        pixels[(y as u32 * width + x as u32) as usize] = 250;
                    }
                }
            }
        }
        Frame::new(pixels, width, height, 0)
    }

    #[test]
    fn test_detects_large_disks_only() {
        let frame = frame_with_disks(200, 100, &[(40, 50, 12), (120, 50, 4)]);
        let detector = BrightSpotDetector::default();

        let blobs = detector.detect(&frame);
        assert_eq!(blobs.len(), 1);
        assert!((blobs[0].centroid.x - 40.0).abs() < 0.5);
        assert!((blobs[0].centroid.y - 50.0).abs() < 0.5);
        assert!((blobs[0].radius - 12.0).abs() < 0.5);

        let verdicts = detector.classify(&frame);
        assert_eq!(verdicts.len(), 2);
        assert!(verdicts
            .iter()
            .any(|v| v.rejection == Some(Rejection::TooSmall)));
    }

    #[test]
    fn test_rejects_spots_below_visible_area() {
        let frame = frame_with_disks(100, 100, &[(50, 70, 15)]);
        let detector = BrightSpotDetector::new(DetectionConfig {
            max_y: 60.0,
            ..Default::default()
        });

        assert!(detector.detect(&frame).is_empty());
        assert_eq!(
            detector.classify(&frame)[0].rejection,
            Some(Rejection::OutsideVisibleArea)
        );
    }

    #[test]
    fn test_threshold_is_strict() {
        let frame = Frame::new(vec![220u8; 40 * 40], 40, 40, 0);
        assert!(BrightSpotDetector::default().classify(&frame).is_empty());

        let lower = BrightSpotDetector::new(DetectionConfig {
            threshold: 219,
            ..Default::default()
        });
        let verdicts = lower.classify(&frame);
        assert_eq!(verdicts.len(), 1);
        assert!(verdicts[0].is_accepted());
    }

    #[test]
    fn test_diagonal_pixels_join_one_region() {
        let mut pixels = vec![0u8; 16];
        pixels[0] = 255;
        pixels[5] = 255;
        pixels[10] = 255;
        let luma = GrayImage::from_raw(4, 4, pixels).unwrap();

        assert_eq!(bright_regions(&luma, 220).len(), 1);
    }
}
