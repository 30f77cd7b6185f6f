//! File name rules shared by the walker, the page builder, and the thumbnailer.
//!
//! ## Extensions
//!
//! The extension is everything after the **last** dot. Matching against the
//! whitelist is case-sensitive: with the default `jpg,png` whitelist,
//! `photo.png` qualifies and `photo.PNG` does not until `PNG` is listed too.
//!
//! ## Thumbnail names
//!
//! The thumbnail of `name.ext` is `name.jpg`, whatever `ext` was:
//! - `photo.png` → `photo.jpg`
//! - `photo.PNG` → `photo.jpg`
//! - `2024.06.01.jpeg` → `2024.06.01.jpg`
//! - `README` → `README.jpg`

use std::collections::BTreeSet;

/// Extension of a file name: the text after the last `.`, if any.
pub fn extension(file_name: &str) -> Option<&str> {
    file_name.rsplit_once('.').map(|(_, ext)| ext)
}

/// Whether `file_name`'s extension is in the whitelist (exact match).
pub fn is_whitelisted(file_name: &str, whitelist: &BTreeSet<String>) -> bool {
    extension(file_name).is_some_and(|ext| whitelist.contains(ext))
}

/// Name of the thumbnail file for `file_name`.
pub fn thumbnail_file_name(file_name: &str) -> String {
    let stem = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name);
    format!("{stem}.jpg")
}

/// One gallery cell: the original image and its thumbnail, relative to the
/// directory the page lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub filename: String,
    /// Always `{thumbnail_directory}/{stem}.jpg`.
    pub thumbnail: String,
}

impl ImageRef {
    pub fn new(filename: &str, thumbnail_directory: &str) -> Self {
        Self {
            filename: filename.to_string(),
            thumbnail: format!("{}/{}", thumbnail_directory, thumbnail_file_name(filename)),
        }
    }
}
