//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the [`operations`](super::operations) module (which
//! decides where a thumbnail goes) and the [`backend`](super::backend)
//! implementations (which do the pixel work or drive an external tool).
//!
//! ## Types
//!
//! - [`Quality`]: JPEG encoding quality (1–100, default 80). Clamped on construction.
//! - [`ThumbnailParams`]: everything needed for one thumbnail (source, output, box size, quality).

use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// Parameters for a thumbnail operation (shrink-to-fit + pad to a square).
///
/// The result is always exactly `size × size` pixels: the source is scaled
/// down (never up) until it fits, then centered on a white canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Edge length of the square output.
    pub size: u32,
    pub quality: Quality,
}
