//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the seam between "make a thumbnail of this
//! file" and whatever actually decodes, scales, and encodes it. Two
//! implementations ship:
//!
//! | Backend | Availability | Used for |
//! |---|---|---|
//! | [`RustBackend`](super::rust_backend::RustBackend) | formats with a compiled-in decoder | everything it can read |
//! | [`MagickBackend`](super::magick_backend::MagickBackend) | `mogrify` found on startup | whatever the Rust backend can't read |
//!
//! Both produce the same artifact: a `size × size` JPEG, shrink-to-fit,
//! centered on white, quality 80.

use super::params::ThumbnailParams;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error("{program} exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("No image backend available for {0}")]
    NoBackend(PathBuf),
}

/// Trait for thumbnail backends.
///
/// `is_available` is a capability check, not an attempt: it must be cheap
/// and must not touch the output. A backend that reports itself available
/// and then fails has produced a real per-file error.
pub trait ImageBackend {
    /// Short name used in diagnostics and progress output.
    fn name(&self) -> &'static str;

    /// Whether this backend can handle `source` at all.
    fn is_available(&self, source: &Path) -> bool;

    /// Execute a thumbnail operation (shrink-to-fit + pad + JPEG encode).
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError>;
}
