//! Frame sources.

use std::fs;
use std::path::{Path, PathBuf};

use image::RgbImage;
use log::{debug, info};

/// One captured frame.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Zero-based position in the stream.
    pub index: u64,
    pub image: RgbImage,
}

#[derive(thiserror::Error, Debug)]
pub enum CaptureError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("frame size changed from {expected:?} to {got:?}")]
    ResolutionChanged { expected: (u32, u32), got: (u32, u32) },
}

/// Pulls frames one at a time.
///
/// `Ok(None)` marks end of stream. Both end of stream and errors are
/// terminal for the frame loop.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, CaptureError>;

    /// Release the underlying device. Called exactly once by the frame loop.
    fn release(&mut self) {}
}

/// Frame source over a directory of PNG/JPEG images, in lexical order.
///
/// The first frame fixes the session resolution.
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    cursor: usize,
    resolution: Option<(u32, u32)>,
}

impl ImageSequenceSource {
    /// List the image files of `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, CaptureError> {
        let dir = dir.as_ref();
        let io_err = |source| CaptureError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if is_image_file(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        info!("opened {} frames from {}", paths.len(), dir.display());
        Ok(Self::from_paths(paths))
    }

    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            cursor: 0,
            resolution: None,
        }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| matches!(e.as_str(), "png" | "jpg" | "jpeg" | "bmp"))
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
        let Some(path) = self.paths.get(self.cursor) else {
            return Ok(None);
        };
        let image = image::open(path)
            .map_err(|source| CaptureError::Decode {
                path: path.clone(),
                source,
            })?
            .to_rgb8();
        let got = image.dimensions();
        match self.resolution {
            None => self.resolution = Some(got),
            Some(expected) if expected != got => {
                return Err(CaptureError::ResolutionChanged { expected, got });
            }
            Some(_) => {}
        }
        let index = self.cursor as u64;
        self.cursor += 1;
        debug!("frame {index}: {}", path.display());
        Ok(Some(Frame { index, image }))
    }

    fn release(&mut self) {
        self.paths.clear();
        self.cursor = 0;
    }
}

/// Releases the wrapped source when dropped, on every exit path.
pub(crate) struct ReleaseGuard<'a, S: FrameSource + ?Sized> {
    source: &'a mut S,
}

impl<'a, S: FrameSource + ?Sized> ReleaseGuard<'a, S> {
    pub(crate) fn new(source: &'a mut S) -> Self {
        Self { source }
    }

    pub(crate) fn source(&mut self) -> &mut S {
        &mut *self.source
    }
}

impl<S: FrameSource + ?Sized> Drop for ReleaseGuard<'_, S> {
    fn drop(&mut self) {
        self.source.release();
        info!("capture released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn reads_frames_in_lexical_order_then_ends() {
        let dir = tempfile::tempdir().expect("tempdir");
        for (name, shade) in [("b.png", 20u8), ("a.png", 10), ("c.png", 30)] {
            RgbImage::from_pixel(8, 6, Rgb([shade, shade, shade]))
                .save(dir.path().join(name))
                .expect("save");
        }
        fs::write(dir.path().join("notes.txt"), "not a frame").expect("write");

        let mut src = ImageSequenceSource::open(dir.path()).expect("open");
        assert_eq!(src.len(), 3);
        let shades: Vec<u8> = std::iter::from_fn(|| src.next_frame().expect("frame"))
            .map(|f| f.image.get_pixel(0, 0)[0])
            .collect();
        assert_eq!(shades, vec![10, 20, 30]);
        assert!(src.next_frame().expect("eos").is_none());
    }

    #[test]
    fn resolution_change_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        RgbImage::new(8, 6).save(dir.path().join("0.png")).expect("save");
        RgbImage::new(9, 6).save(dir.path().join("1.png")).expect("save");
        let mut src = ImageSequenceSource::open(dir.path()).expect("open");
        assert!(src.next_frame().expect("first").is_some());
        assert!(matches!(
            src.next_frame(),
            Err(CaptureError::ResolutionChanged { .. })
        ));
    }

    #[test]
    fn missing_directory_fails_to_open() {
        assert!(matches!(
            ImageSequenceSource::open("/definitely/not/here"),
            Err(CaptureError::Io { .. })
        ));
    }
}
