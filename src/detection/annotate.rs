//! Diagnostic rendering of detected bright spots.

use super::SpotVerdict;
use crate::capture::{Frame, PixelFormat};
use image::{Rgb, RgbImage};

const ACCEPTED: Rgb<u8> = Rgb([0, 255, 0]);
const REJECTED: Rgb<u8> = Rgb([255, 0, 0]);

/// Copies a frame to RGB and outlines each spot: accepted LEDs in green,
/// rejected regions in red.
pub fn annotate(frame: &Frame, verdicts: &[SpotVerdict]) -> RgbImage {
    let mut canvas = to_rgb(frame);
    for verdict in verdicts {
        let color = if verdict.is_accepted() {
            ACCEPTED
        } else {
            REJECTED
        };
        let center = verdict.blob.centroid;
        let radius = verdict.blob.radius.max(1.0);
        // Two pixel outline.
        draw_circle(&mut canvas, center.x, center.y, radius, color);
        draw_circle(&mut canvas, center.x, center.y, radius + 1.0, color);
    }
    canvas
}

fn to_rgb(frame: &Frame) -> RgbImage {
    let (width, height) = (frame.width(), frame.height());
    let raw = match frame.format() {
        PixelFormat::Rgb8 => frame.pixels().to_vec(),
        PixelFormat::Gray8 => frame.pixels().iter().flat_map(|&v| [v, v, v]).collect(),
    };
    RgbImage::from_raw(width, height, raw).unwrap_or_else(|| RgbImage::new(width, height))
}

fn draw_circle(canvas: &mut RgbImage, cx: f64, cy: f64, radius: f64, color: Rgb<u8>) {
    let steps = ((std::f64::consts::TAU * radius).ceil() as usize * 2).max(16);
    for step in 0..steps {
        let theta = std::f64::consts::TAU * step as f64 / steps as f64;
        let x = (cx + radius * theta.cos()).round();
        let y = (cy + radius * theta.sin()).round();
        if x >= 0.0 && y >= 0.0 && (x as u32) < canvas.width() && (y as u32) < canvas.height() {
            canvas.put_pixel(x as u32, y as u32, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{BrightBlob, Point2D, Rejection};

    #[test]
    fn test_outline_colors() {
        let frame = Frame::new(vec![0u8; 100 * 50], 100, 50, 0);
        let verdicts = [
            SpotVerdict {
                blob: BrightBlob {
                    centroid: Point2D::new(25.0, 25.0),
                    radius: 12.0,
                },
                rejection: None,
            },
            SpotVerdict {
                blob: BrightBlob {
                    centroid: Point2D::new(75.0, 25.0),
                    radius: 5.0,
                },
                rejection: Some(Rejection::TooSmall),
            },
        ];

        let canvas = annotate(&frame, &verdicts);
        assert_eq!(canvas.dimensions(), (100, 50));
        assert_eq!(*canvas.get_pixel(37, 25), ACCEPTED);
        assert_eq!(*canvas.get_pixel(80, 25), REJECTED);
        assert_eq!(*canvas.get_pixel(25, 25), Rgb([0, 0, 0]));
    }
}
