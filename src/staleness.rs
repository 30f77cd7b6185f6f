//! Regeneration rules.
//!
//! The files already on disk are the only cache: an artifact is rebuilt when
//! it is missing or when the run forces it. Contents and modification times
//! are never compared, so editing a source image in place does not refresh
//! its thumbnail without `--force-thumbnails`.

use crate::config::GalleryConfig;
use std::path::Path;

/// Whether the thumbnail at `path` must be (re)created.
pub fn thumbnail_is_stale(path: &Path, config: &GalleryConfig) -> bool {
    config.force_thumbnail_generation || !path.exists()
}

/// Whether the index page at `path` must be (re)written.
///
/// `new_content` is true when at least one thumbnail in the directory was
/// created during this run.
pub fn page_is_stale(path: &Path, new_content: bool, config: &GalleryConfig) -> bool {
    new_content || config.force_html_generation || !path.exists()
}
