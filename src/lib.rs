//! # tn-gallery
//!
//! Turns a directory tree of images into a browsable static gallery. Every
//! directory gets a square JPEG thumbnail per image and an `index.html` that
//! links its images and its subdirectories.
//!
//! # Architecture: One Walk, Three Gates
//!
//! ```text
//! walk      visit each directory, parents first
//!  ├─ staleness  thumbnail missing or forced?  → imaging::Thumbnailer
//!  └─ staleness  page missing, forced, or new thumbnails?  → page::build_page
//! ```
//!
//! The artifacts already on disk are the only cache. A second run over an
//! unchanged tree touches nothing.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`walk`] | Recursive traversal, thumbnail directory creation, page writes, progress events |
//! | [`staleness`] | Absence-or-force rules for thumbnails and pages |
//! | [`imaging`] | Fit-and-pad thumbnails through an ordered list of backends |
//! | [`page`] | Row packing and page rendering |
//! | [`template`] | Small `{{ }}` / `{% %}` template language for page layouts |
//! | [`naming`] | Extension matching and thumbnail file names |
//! | [`config`] | Stock defaults, TOML config file, command-line overrides |
//! | [`output`] | CLI output formatting for walk events and summaries |
//!
//! # Design Decisions
//!
//! ## Immutable Configuration
//!
//! Configuration is resolved once into a [`config::GalleryConfig`] and passed
//! by reference. The layout template is parsed at that point too, so a broken
//! template fails the run before any directory is touched.
//!
//! ## Backend Strategy List
//!
//! The in-process `image` backend is preferred. When it has no decoder for a
//! file and `mogrify` is installed, the file is handed to `mogrify` and one
//! warning is logged. Backend choice is made up front from an availability
//! probe, never by retrying after a failure.
//!
//! ## Thumbnail Directory by Name
//!
//! A directory whose name equals the thumbnail directory is skipped when it
//! appears below the root, along with its subtree. The root itself is always
//! walked, whatever its name.

pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod page;
pub mod staleness;
pub mod template;
pub mod walk;

#[cfg(test)]
pub(crate) mod test_helpers;
