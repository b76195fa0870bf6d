//! Frame source abstraction.
//!
//! A trait-based abstraction over sequential frame retrieval, allowing
//! extracted image sequences, in-memory frames and synthetic mock
//! sources to drive the same decoding pipeline.

use super::Frame;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File extensions recognised as frames in an image sequence directory.
const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Errors that can occur while reading frames.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot open frame source {path}: {reason}")]
    CannotOpen { path: PathBuf, reason: String },
    #[error("failed to read frame {index}: {reason}")]
    ReadFailed { index: u64, reason: String },
}

/// Informational properties of a frame source.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SourceInfo {
    /// Total frames, when known up front.
    pub frame_count: Option<u64>,
    /// Nominal frames per second.
    pub frame_rate: Option<f64>,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
}

/// Trait for sequential frame sources.
///
/// `read` returns `Ok(None)` once the source is exhausted; a later
/// `seek_to_start` rewinds it for another full pass.
pub trait FrameSource {
    /// Reads the next frame.
    fn read(&mut self) -> Result<Option<Frame>, SourceError>;

    /// Rewinds to the first frame.
    fn seek_to_start(&mut self) -> Result<(), SourceError>;

    /// Returns informational properties of the source.
    fn info(&self) -> SourceInfo;
}

impl<S: FrameSource + ?Sized> FrameSource for &mut S {
    fn read(&mut self) -> Result<Option<Frame>, SourceError> {
        (**self).read()
    }

    fn seek_to_start(&mut self) -> Result<(), SourceError> {
        (**self).seek_to_start()
    }

    fn info(&self) -> SourceInfo {
        (**self).info()
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn read(&mut self) -> Result<Option<Frame>, SourceError> {
        (**self).read()
    }

    fn seek_to_start(&mut self) -> Result<(), SourceError> {
        (**self).seek_to_start()
    }

    fn info(&self) -> SourceInfo {
        (**self).info()
    }
}

/// Frames extracted from a video into a directory of still images.
///
/// Files are ordered by name, so zero-padded names such as
/// `frame_00042.jpg` replay in recording order. Images are decoded
/// lazily, one per `read`.
#[derive(Debug)]
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    cursor: usize,
    width: u32,
    height: u32,
    frame_rate: f64,
}

impl ImageSequenceSource {
    /// Opens a directory of frames.
    pub fn open(dir: impl AsRef<Path>, frame_rate: f64) -> Result<Self, SourceError> {
        let dir = dir.as_ref();
        let cannot_open = |reason: String| SourceError::CannotOpen {
            path: dir.to_path_buf(),
            reason,
        };

        let entries = std::fs::read_dir(dir).map_err(|e| cannot_open(e.to_string()))?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_frame_file(path))
            .collect();
        paths.sort();

        let first = paths
            .first()
            .ok_or_else(|| cannot_open("no image frames found".to_string()))?;
        let (width, height) =
            image::image_dimensions(first).map_err(|e| cannot_open(e.to_string()))?;

        tracing::info!(
            dir = %dir.display(),
            frames = paths.len(),
            width,
            height,
            "Opened image sequence"
        );

        Ok(Self {
            paths,
            cursor: 0,
            width,
            height,
            frame_rate,
        })
    }

    /// Returns the number of frames in the sequence.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns true if the sequence has no frames.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            FRAME_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

impl FrameSource for ImageSequenceSource {
    fn read(&mut self) -> Result<Option<Frame>, SourceError> {
        let Some(path) = self.paths.get(self.cursor) else {
            return Ok(None);
        };
        let index = self.cursor as u64;
        let image = image::open(path).map_err(|e| SourceError::ReadFailed {
            index,
            reason: format!("{}: {}", path.display(), e),
        })?;
        self.cursor += 1;
        Ok(Some(Frame::from_image(image, index)))
    }

    fn seek_to_start(&mut self) -> Result<(), SourceError> {
        self.cursor = 0;
        Ok(())
    }

    fn info(&self) -> SourceInfo {
        SourceInfo {
            frame_count: Some(self.paths.len() as u64),
            frame_rate: Some(self.frame_rate),
            width: self.width,
            height: self.height,
        }
    }
}

/// Pre-decoded frames held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    frames: Vec<Frame>,
    cursor: usize,
}

impl MemorySource {
    /// Replays `frames` in order.
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames, cursor: 0 }
    }
}

impl FrameSource for MemorySource {
    fn read(&mut self) -> Result<Option<Frame>, SourceError> {
        let frame = self.frames.get(self.cursor).cloned();
        if frame.is_some() {
            self.cursor += 1;
        }
        Ok(frame)
    }

    fn seek_to_start(&mut self) -> Result<(), SourceError> {
        self.cursor = 0;
        Ok(())
    }

    fn info(&self) -> SourceInfo {
        let (width, height) = self
            .frames
            .first()
            .map(|f| (f.width(), f.height()))
            .unwrap_or((0, 0));
        SourceInfo {
            frame_count: Some(self.frames.len() as u64),
            frame_rate: None,
            width,
            height,
        }
    }
}

/// Keeps every n-th frame of an inner source.
///
/// Frames keep their original sequence numbers.
#[derive(Debug)]
pub struct FrameSkip<S> {
    inner: S,
    every: u64,
    position: u64,
}

impl<S: FrameSource> FrameSkip<S> {
    /// Wraps `inner`; an `every` of 0 is treated as 1.
    pub fn new(inner: S, every: u32) -> Self {
        Self {
            inner,
            every: u64::from(every.max(1)),
            position: 0,
        }
    }

    /// Returns the wrapped source.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: FrameSource> FrameSource for FrameSkip<S> {
    fn read(&mut self) -> Result<Option<Frame>, SourceError> {
        while let Some(frame) = self.inner.read()? {
            let keep = self.position % self.every == 0;
            self.position += 1;
            if keep {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }

    fn seek_to_start(&mut self) -> Result<(), SourceError> {
        self.position = 0;
        self.inner.seek_to_start()
    }

    fn info(&self) -> SourceInfo {
        let inner = self.inner.info();
        SourceInfo {
            frame_count: inner.frame_count.map(|n| n.div_ceil(self.every)),
            frame_rate: inner.frame_rate.map(|r| r / self.every as f64),
            ..inner
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_frames(count: u64) -> Vec<Frame> {
        (0..count)
            .map(|i| Frame::new(vec![i as u8; 4], 2, 2, i))
            .collect()
    }

    #[test]
    fn test_memory_source_rewinds() {
        let mut source = MemorySource::new(numbered_frames(3));

        let mut seen = Vec::new();
        while let Some(frame) = source.read().unwrap() {
            seen.push(frame.sequence());
        }
        assert_eq!(seen, vec![0, 1, 2]);
        assert!(source.read().unwrap().is_none());

        source.seek_to_start().unwrap();
        assert_eq!(source.read().unwrap().map(|f| f.sequence()), Some(0));
    }

    #[test]
    fn test_frame_skip_keeps_every_nth() {
        let mut source = FrameSkip::new(MemorySource::new(numbered_frames(7)), 3);

        let mut seen = Vec::new();
        while let Some(frame) = source.read().unwrap() {
            seen.push(frame.sequence());
        }
        assert_eq!(seen, vec![0, 3, 6]);
        assert_eq!(source.info().frame_count, Some(3));

        source.seek_to_start().unwrap();
        assert_eq!(source.read().unwrap().map(|f| f.sequence()), Some(0));
    }

    #[test]
    fn test_open_missing_directory() {
        let result = ImageSequenceSource::open("/nonexistent/ledring-frames", 30.0);
        assert!(matches!(result, Err(SourceError::CannotOpen { .. })));
    }

    #[test]
    fn test_image_sequence_reads_sorted_frames() {
        let dir = std::env::temp_dir().join(format!("ledring-seq-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        for (name, value) in [("frame_00001.png", 200u8), ("frame_00000.png", 10u8)] {
            image::GrayImage::from_pixel(4, 3, image::Luma([value]))
                .save(dir.join(name))
                .unwrap();
        }
        std::fs::write(dir.join("notes.txt"), "not a frame").unwrap();

        let mut source = ImageSequenceSource::open(&dir, 25.0).unwrap();
        assert_eq!(source.len(), 2);
        assert_eq!(source.info().width, 4);
        assert_eq!(source.info().height, 3);

        let first = source.read().unwrap().unwrap();
        assert_eq!(first.luma_at(0, 0), Some(10));
        let second = source.read().unwrap().unwrap();
        assert_eq!(second.luma_at(3, 2), Some(200));
        assert!(source.read().unwrap().is_none());

        std::fs::remove_dir_all(&dir).ok();
    }
}
