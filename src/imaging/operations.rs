//! High-level thumbnail operations.
//!
//! [`Thumbnailer`] owns an ordered list of backends and picks one per
//! source file: the first backend that reports itself available serves the
//! request. Anything past the first is a fallback and gets one warning line.

use super::backend::{BackendError, ImageBackend};
use super::magick_backend::MagickBackend;
use super::params::{Quality, ThumbnailParams};
use super::rust_backend::RustBackend;
use crate::naming::thumbnail_file_name;
use std::path::{Path, PathBuf};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// A thumbnail that was written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub output: PathBuf,
    /// Name of the backend that produced it.
    pub backend: &'static str,
    /// True when a backend other than the preferred one served the request.
    pub fallback: bool,
}

/// Plan a thumbnail operation without executing it.
///
/// The output lands at `output_dir/{stem}.jpg`.
pub fn plan_thumbnail(
    source: &Path,
    output_dir: &Path,
    size: u32,
    quality: Quality,
) -> ThumbnailParams {
    let name = source
        .file_name()
        .map(|n| thumbnail_file_name(&n.to_string_lossy()))
        .unwrap_or_else(|| "thumbnail.jpg".to_string());

    ThumbnailParams {
        source: source.to_path_buf(),
        output: output_dir.join(name),
        size,
        quality,
    }
}

pub struct Thumbnailer {
    backends: Vec<Box<dyn ImageBackend>>,
}

impl Thumbnailer {
    /// Build a thumbnailer from backends in order of preference.
    pub fn new(backends: Vec<Box<dyn ImageBackend>>) -> Self {
        Self { backends }
    }

    /// The in-process backend, followed by `mogrify` if it is installed.
    pub fn detect() -> Self {
        let mut backends: Vec<Box<dyn ImageBackend>> = vec![Box::new(RustBackend::new())];
        if let Some(magick) = MagickBackend::detect() {
            backends.push(Box::new(magick));
        }
        Self::new(backends)
    }

    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Create the thumbnail for `source` inside `output_dir`.
    ///
    /// Encodes at the default quality and overwrites any existing file at
    /// the output path.
    pub fn create(&self, source: &Path, output_dir: &Path, size: u32) -> Result<Thumbnail> {
        let params = plan_thumbnail(source, output_dir, size, Quality::default());

        let (position, backend) = self
            .backends
            .iter()
            .enumerate()
            .find(|(_, b)| b.is_available(source))
            .ok_or_else(|| BackendError::NoBackend(source.to_path_buf()))?;

        let fallback = position > 0;
        if fallback {
            log::warn!(
                "{} cannot read {}, falling back to {}",
                self.backends[0].name(),
                source.display(),
                backend.name()
            );
        }

        backend.thumbnail(&params)?;

        Ok(Thumbnail {
            output: params.output,
            backend: backend.name(),
            fallback,
        })
    }
}
