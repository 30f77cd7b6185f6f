//! Shared test utilities.
//!
//! Fixture builders for gallery trees and a handle-keeping wrapper around
//! [`MockBackend`] so tests can inspect recorded operations after the mock
//! has been boxed into a [`Thumbnailer`].
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_file(&tmp.path().join("g/a.jpg"), b"a");
//! let (thumbnailer, mock) = mock_thumbnailer(MockBackend::new());
//! walk::run(&tmp.path().join("g"), &test_config(), &thumbnailer, None).unwrap();
//! assert_eq!(mock.get_operations().len(), 1);
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use crate::config::{GalleryConfig, Settings};
use crate::imaging::backend::tests::MockBackend;
use crate::imaging::{BackendError, ImageBackend, ThumbnailParams, Thumbnailer};

// =========================================================================
// Configuration
// =========================================================================

/// Stock configuration with the built-in template.
pub fn test_config() -> GalleryConfig {
    GalleryConfig::from_settings(Settings::default()).unwrap()
}

/// Owned strings from literals.
pub fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// =========================================================================
// Filesystem fixtures
// =========================================================================

/// Write `contents` to `path`, creating parent directories.
pub fn write_file(path: &Path, contents: impl AsRef<[u8]>) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

/// Write a solid-color image; the format follows the extension.
pub fn write_image(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    image::RgbImage::from_pixel(width, height, image::Rgb([200, 40, 40]))
        .save(path)
        .unwrap();
}

pub fn mtime(path: &Path) -> SystemTime {
    std::fs::metadata(path).unwrap().modified().unwrap()
}

// =========================================================================
// Backends
// =========================================================================

/// Lets a test keep a handle on a mock after boxing it into a Thumbnailer.
pub struct SharedMock(pub Arc<MockBackend>);

impl ImageBackend for SharedMock {
    fn name(&self) -> &'static str {
        self.0.name()
    }

    fn is_available(&self, source: &Path) -> bool {
        self.0.is_available(source)
    }

    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError> {
        self.0.thumbnail(params)
    }
}

/// A thumbnailer backed by a single mock, plus a handle to that mock.
pub fn mock_thumbnailer(mock: MockBackend) -> (Thumbnailer, Arc<MockBackend>) {
    let mock = Arc::new(mock);
    let thumbnailer = Thumbnailer::new(vec![Box::new(SharedMock(mock.clone()))]);
    (thumbnailer, mock)
}
