//! Recursive gallery traversal.
//!
//! Visits a root directory and every descendant, parents before children and
//! siblings in file-name order. For each directory:
//!
//! ```text
//! gallery/
//! ├── a.jpg
//! ├── b.png
//! ├── notes.txt          # listed nowhere, but still triggers tn/ creation
//! ├── tn/                # thumbnail directory: never listed, never walked
//! │   ├── a.jpg
//! │   └── b.jpg
//! ├── index.html
//! └── sub/
//!     ├── c.jpg
//!     ├── tn/c.jpg
//!     └── index.html
//! ```
//!
//! 1. Create the thumbnail directory if the directory has any files.
//! 2. Create each missing (or forced) thumbnail for whitelisted files.
//! 3. Write `index.html` when a thumbnail was created, the page is missing,
//!    or pages are forced. Directories with nothing to list get no page.
//!
//! A thumbnail that cannot be created is reported and skipped, and so is a
//! subdirectory that cannot be listed (with its subtree). Failing to list the
//! root, create a thumbnail directory or write a page aborts the walk.

use crate::config::GalleryConfig;
use crate::imaging::Thumbnailer;
use crate::naming::{is_whitelisted, thumbnail_file_name};
use crate::page::build_page;
use crate::staleness::{page_is_stale, thumbnail_is_stale};
use crate::template::TemplateError;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

/// File name of the generated page in every gallery directory.
pub const INDEX_FILE: &str = "index.html";

#[derive(Error, Debug)]
pub enum WalkError {
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Directory traversal failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Cannot create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cannot write {path}: {source}")]
    WritePage {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Template rendering failed: {0}")]
    Template(#[from] TemplateError),
}

/// One visited directory with its immediate children, split and sorted by
/// name.
///
/// Symlinks are not followed: a link to a directory is listed as a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub path: PathBuf,
    pub files: Vec<String>,
    pub dirs: Vec<String>,
}

impl DirectoryEntry {
    pub fn read(dir: &Path) -> Result<Self, WalkError> {
        let mut listing = Self {
            path: dir.to_path_buf(),
            files: Vec::new(),
            dirs: Vec::new(),
        };
        let entries = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in entries {
            let entry = entry?;
            let Some(name) = entry.file_name().to_str() else {
                log::warn!("Skipping non-UTF-8 name: {}", entry.path().display());
                continue;
            };
            if entry.file_type().is_dir() {
                listing.dirs.push(name.to_string());
            } else {
                listing.files.push(name.to_string());
            }
        }
        Ok(listing)
    }
}

/// Why a directory's page was not written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSkip {
    /// The page exists and nothing forced a rewrite.
    UpToDate,
    /// No images and no subdirectories to list.
    Empty,
}

/// Progress reported while walking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEvent {
    DirectoryVisited {
        path: PathBuf,
    },
    /// A directory below the root that could not be listed; its subtree is
    /// not walked.
    DirectorySkipped {
        path: PathBuf,
        error: String,
    },
    ThumbnailCreated {
        source: PathBuf,
        backend: &'static str,
        fallback: bool,
    },
    ThumbnailFailed {
        source: PathBuf,
        error: String,
    },
    PageWritten {
        path: PathBuf,
        images: usize,
        directories: usize,
    },
    PageSkipped {
        path: PathBuf,
        reason: PageSkip,
    },
}

/// Counters for one walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub directories: usize,
    pub directories_unreadable: usize,
    pub thumbnails_created: usize,
    pub thumbnails_fresh: usize,
    pub thumbnails_failed: usize,
    /// Thumbnails served by a backend other than the preferred one.
    pub fallbacks: usize,
    pub pages_written: usize,
    pub pages_fresh: usize,
    pub pages_empty: usize,
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} directories", self.directories)?;
        if self.directories_unreadable > 0 {
            write!(f, " ({} unreadable)", self.directories_unreadable)?;
        }
        write!(
            f,
            "; thumbnails: {} created, {} up to date",
            self.thumbnails_created, self.thumbnails_fresh
        )?;
        if self.thumbnails_failed > 0 {
            write!(f, ", {} failed", self.thumbnails_failed)?;
        }
        write!(
            f,
            "; pages: {} written, {} up to date",
            self.pages_written, self.pages_fresh
        )?;
        if self.pages_empty > 0 {
            write!(f, ", {} empty", self.pages_empty)?;
        }
        Ok(())
    }
}

/// Walk `root` and bring every gallery directory up to date.
pub fn run(
    root: &Path,
    config: &GalleryConfig,
    thumbnailer: &Thumbnailer,
    events: Option<Sender<WalkEvent>>,
) -> Result<RunStats, WalkError> {
    if !root.is_dir() {
        return Err(WalkError::NotADirectory(root.to_path_buf()));
    }

    let thumbnail_dir = config.thumbnail_directory.as_str();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !e.file_type().is_dir()
                || (e.file_name() != thumbnail_dir && e.file_name().to_str().is_some())
        });

    let mut visitor = Visitor {
        config,
        thumbnailer,
        events: events.as_ref(),
        stats: RunStats::default(),
        last_skipped: None,
    };
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) if error.depth() > 0 => {
                let path = error.path().unwrap_or(root).to_path_buf();
                // The listing failure was already reported by `visit`.
                if visitor.last_skipped.as_ref() != Some(&path) {
                    visitor.skip_directory(path, &error);
                }
                continue;
            }
            Err(error) => return Err(error.into()),
        };
        if entry.file_type().is_dir() {
            visitor.visit(entry.path(), entry.depth())?;
        }
    }
    Ok(visitor.stats)
}

struct Visitor<'a> {
    config: &'a GalleryConfig,
    thumbnailer: &'a Thumbnailer,
    events: Option<&'a Sender<WalkEvent>>,
    stats: RunStats,
    last_skipped: Option<PathBuf>,
}

impl Visitor<'_> {
    fn emit(&self, event: WalkEvent) {
        if let Some(tx) = self.events {
            tx.send(event).ok();
        }
    }

    fn skip_directory(&mut self, path: PathBuf, error: &dyn fmt::Display) {
        log::warn!("Skipping unreadable directory {}: {}", path.display(), error);
        self.stats.directories_unreadable += 1;
        self.last_skipped = Some(path.clone());
        self.emit(WalkEvent::DirectorySkipped {
            path,
            error: error.to_string(),
        });
    }

    fn visit(&mut self, dir: &Path, depth: usize) -> Result<(), WalkError> {
        let listing = match DirectoryEntry::read(dir) {
            Ok(listing) => listing,
            Err(error) if depth > 0 => {
                self.skip_directory(dir.to_path_buf(), &error);
                return Ok(());
            }
            Err(error) => return Err(error),
        };
        log::debug!(
            "{}: {} files, {} directories",
            dir.display(),
            listing.files.len(),
            listing.dirs.len()
        );
        self.stats.directories += 1;
        self.emit(WalkEvent::DirectoryVisited {
            path: dir.to_path_buf(),
        });

        let thumb_path = dir.join(&self.config.thumbnail_directory);
        if !listing.files.is_empty() && !thumb_path.exists() {
            fs::create_dir_all(&thumb_path).map_err(|source| WalkError::CreateDir {
                path: thumb_path.clone(),
                source,
            })?;
        }

        let new_content = self.update_thumbnails(dir, &thumb_path, &listing.files);
        self.update_page(&listing, new_content)
    }

    /// Returns whether any thumbnail was created.
    ///
    /// `files` is sorted, so when two images share a thumbnail name
    /// (`a.jpg`, `a.png`) the first one owns it and the other is reported.
    fn update_thumbnails(&mut self, dir: &Path, thumb_path: &Path, files: &[String]) -> bool {
        let mut new_content = false;
        let mut owners: BTreeMap<String, &String> = BTreeMap::new();
        let images = files
            .iter()
            .filter(|f| is_whitelisted(f, &self.config.whitelist));

        for file in images {
            let target = match owners.entry(thumbnail_file_name(file)) {
                Entry::Occupied(owner) => {
                    let error = format!(
                        "thumbnail {}/{} already belongs to {}",
                        self.config.thumbnail_directory,
                        owner.key(),
                        owner.get()
                    );
                    log::warn!("{}: {}", dir.join(file).display(), error);
                    self.stats.thumbnails_failed += 1;
                    self.emit(WalkEvent::ThumbnailFailed {
                        source: dir.join(file),
                        error,
                    });
                    continue;
                }
                Entry::Vacant(slot) => {
                    let target = thumb_path.join(slot.key());
                    slot.insert(file);
                    target
                }
            };
            if !thumbnail_is_stale(&target, self.config) {
                self.stats.thumbnails_fresh += 1;
                continue;
            }

            let source = dir.join(file);
            match self
                .thumbnailer
                .create(&source, thumb_path, self.config.thumbnail_size)
            {
                Ok(thumb) => {
                    new_content = true;
                    self.stats.thumbnails_created += 1;
                    if thumb.fallback {
                        self.stats.fallbacks += 1;
                    }
                    self.emit(WalkEvent::ThumbnailCreated {
                        source,
                        backend: thumb.backend,
                        fallback: thumb.fallback,
                    });
                }
                Err(error) => {
                    log::warn!("Thumbnail failed for {}: {}", source.display(), error);
                    self.stats.thumbnails_failed += 1;
                    self.emit(WalkEvent::ThumbnailFailed {
                        source,
                        error: error.to_string(),
                    });
                }
            }
        }
        new_content
    }

    fn update_page(&mut self, listing: &DirectoryEntry, new_content: bool) -> Result<(), WalkError> {
        let dir = listing.path.as_path();
        let index = dir.join(INDEX_FILE);
        if !page_is_stale(&index, new_content, self.config) {
            self.stats.pages_fresh += 1;
            self.emit(WalkEvent::PageSkipped {
                path: index,
                reason: PageSkip::UpToDate,
            });
            return Ok(());
        }

        match build_page(&listing.files, &listing.dirs, dir, self.config)? {
            Some(page) => {
                fs::write(&index, &page.html).map_err(|source| WalkError::WritePage {
                    path: index.clone(),
                    source,
                })?;
                self.stats.pages_written += 1;
                self.emit(WalkEvent::PageWritten {
                    path: index,
                    images: page.images,
                    directories: page.directories,
                });
            }
            None => {
                self.stats.pages_empty += 1;
                self.emit(WalkEvent::PageSkipped {
                    path: index,
                    reason: PageSkip::Empty,
                });
            }
        }
        Ok(())
    }
}
