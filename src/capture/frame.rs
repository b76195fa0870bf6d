//! Frame type representing one decoded raster image from a video.

use image::{DynamicImage, GrayImage, RgbImage};

/// Pixel layout of a frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// One luminance byte per pixel.
    Gray8,
    /// Three bytes per pixel in R, G, B order.
    Rgb8,
}

impl PixelFormat {
    /// Bytes used by a single pixel.
    #[inline]
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Rgb8 => 3,
        }
    }
}

/// A single raster frame read from a frame source.
///
/// Holds raw pixel data along with the frame's position in the
/// source so that emitted message frames can be traced back to video time.
#[derive(Clone)]
pub struct Frame {
    /// Raw pixel data, row-major.
    pixels: Vec<u8>,
    /// Frame width in pixels.
    width: u32,
    /// Frame height in pixels.
    height: u32,
    /// Buffer layout.
    format: PixelFormat,
    /// Zero-based index of the frame within its source.
    sequence: u64,
}

impl Frame {
    /// Creates a grayscale frame.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, sequence: u64) -> Self {
        Self::with_format(pixels, width, height, PixelFormat::Gray8, sequence)
    }

    /// Creates a frame with an explicit pixel layout.
    pub fn with_format(
        pixels: Vec<u8>,
        width: u32,
        height: u32,
        format: PixelFormat,
        sequence: u64,
    ) -> Self {
        Self {
            pixels,
            width,
            height,
            format,
            sequence,
        }
    }

    /// Converts a decoded image into a frame, keeping gray images single-channel.
    pub fn from_image(image: DynamicImage, sequence: u64) -> Self {
        match image {
            DynamicImage::ImageLuma8(gray) => {
                let (width, height) = gray.dimensions();
                Self::new(gray.into_raw(), width, height, sequence)
            }
            other => {
                let rgb: RgbImage = other.into_rgb8();
                let (width, height) = rgb.dimensions();
                Self::with_format(rgb.into_raw(), width, height, PixelFormat::Rgb8, sequence)
            }
        }
    }

    /// Returns a reference to the raw pixel data.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns the frame width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the frame height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the pixel layout.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Returns the sequence number.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns the total number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Validates that the pixel buffer size matches dimensions and layout.
    pub fn is_valid(&self) -> bool {
        self.pixels.len() == self.pixel_count() * self.format.channels()
    }

    /// Luminance of the pixel at `(x, y)`, or `None` outside the frame.
    ///
    /// Color frames use the ITU-R BT.601 weights.
    pub fn luma_at(&self, x: i64, y: i64) -> Option<u8> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        let idx = y as usize * self.width as usize + x as usize;
        match self.format {
            PixelFormat::Gray8 => self.pixels.get(idx).copied(),
            PixelFormat::Rgb8 => {
                let base = idx * 3;
                let px = self.pixels.get(base..base + 3)?;
                Some(bt601_luma(px[0], px[1], px[2]))
            }
        }
    }

    /// Returns a single-channel luminance copy of the frame.
    pub fn to_luma(&self) -> GrayImage {
        let data = match self.format {
            PixelFormat::Gray8 => self.pixels.clone(),
            PixelFormat::Rgb8 => self
                .pixels
                .chunks_exact(3)
                .map(|px| bt601_luma(px[0], px[1], px[2]))
                .collect(),
        };
        // A mismatched buffer yields an empty image rather than a panic.
        GrayImage::from_raw(self.width, self.height, data)
            .unwrap_or_else(|| GrayImage::new(0, 0))
    }
}

#[inline]
fn bt601_luma(r: u8, g: u8, b: u8) -> u8 {
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500) / 1000) as u8
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("sequence", &self.sequence)
            .field("pixel_bytes", &self.pixels.len())
            .finish()
    }
}
