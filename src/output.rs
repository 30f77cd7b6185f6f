//! CLI output formatting.
//!
//! Each directory is a header line followed by indented lines for what
//! happened inside it:
//!
//! ```text
//! ==> photos (backends: image, mogrify)
//! photos
//!     thumbnail: a.jpg
//!     thumbnail: anim.gif (via mogrify)
//!     failed: broken.jpg: Image processing failed: ...
//!     index.html: 2 images, 1 directory
//! photos/sub
//!     index.html: up to date
//! photos/private (skipped: Directory traversal failed: ...)
//! photos: 2 directories; thumbnails: 2 created, 0 up to date, 1 failed; pages: 1 written, 1 up to date
//! ```
//!
//! # Architecture
//!
//! `format_*` functions return lines and do no I/O; `print_*` wrappers write
//! them to stdout.

use crate::walk::{PageSkip, RunStats, WalkEvent};
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Final path component for display, falling back to the whole path.
fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// Header printed before a root is walked.
pub fn format_root_header(root: &Path, backends: &[&str]) -> String {
    format!("==> {} (backends: {})", root.display(), backends.join(", "))
}

/// Format one walk event.
pub fn format_walk_event(event: &WalkEvent) -> Vec<String> {
    match event {
        WalkEvent::DirectoryVisited { path } => vec![path.display().to_string()],
        WalkEvent::DirectorySkipped { path, error } => {
            vec![format!("{} (skipped: {})", path.display(), error)]
        }
        WalkEvent::ThumbnailCreated {
            source,
            backend,
            fallback,
        } => {
            let line = if *fallback {
                format!("thumbnail: {} (via {})", file_label(source), backend)
            } else {
                format!("thumbnail: {}", file_label(source))
            };
            vec![format!("{}{}", indent(1), line)]
        }
        WalkEvent::ThumbnailFailed { source, error } => {
            vec![format!(
                "{}failed: {}: {}",
                indent(1),
                file_label(source),
                error
            )]
        }
        WalkEvent::PageWritten {
            path,
            images,
            directories,
        } => vec![format!(
            "{}{}: {}, {}",
            indent(1),
            file_label(path),
            plural(*images, "image", "images"),
            plural(*directories, "directory", "directories")
        )],
        WalkEvent::PageSkipped { path, reason } => {
            let why = match reason {
                PageSkip::UpToDate => "up to date",
                PageSkip::Empty => "skipped, nothing to list",
            };
            vec![format!("{}{}: {}", indent(1), file_label(path), why)]
        }
    }
}

/// Summary line printed after a root is walked.
pub fn format_summary(root: &Path, stats: &RunStats) -> String {
    let mut line = format!("{}: {}", root.display(), stats);
    if stats.fallbacks > 0 {
        line.push_str(&format!(" ({} via fallback backend)", stats.fallbacks));
    }
    line
}

pub fn print_walk_event(event: &WalkEvent) {
    for line in format_walk_event(event) {
        println!("{}", line);
    }
}

pub fn print_summary(root: &Path, stats: &RunStats) {
    println!("{}", format_summary(root, stats));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn directory_line_is_full_path() {
        let lines = format_walk_event(&WalkEvent::DirectoryVisited {
            path: PathBuf::from("photos/sub"),
        });
        assert_eq!(lines, vec!["photos/sub"]);
    }

    #[test]
    fn skipped_directory_line_includes_error() {
        let lines = format_walk_event(&WalkEvent::DirectorySkipped {
            path: PathBuf::from("photos/private"),
            error: "permission denied".to_string(),
        });
        assert_eq!(lines, vec!["photos/private (skipped: permission denied)"]);
    }

    #[test]
    fn thumbnail_line_names_file() {
        let lines = format_walk_event(&WalkEvent::ThumbnailCreated {
            source: PathBuf::from("photos/a.jpg"),
            backend: "image",
            fallback: false,
        });
        assert_eq!(lines, vec!["    thumbnail: a.jpg"]);
    }

    #[test]
    fn fallback_thumbnail_names_backend() {
        let lines = format_walk_event(&WalkEvent::ThumbnailCreated {
            source: PathBuf::from("photos/anim.gif"),
            backend: "mogrify",
            fallback: true,
        });
        assert_eq!(lines, vec!["    thumbnail: anim.gif (via mogrify)"]);
    }

    #[test]
    fn failure_line_includes_error() {
        let lines = format_walk_event(&WalkEvent::ThumbnailFailed {
            source: PathBuf::from("photos/bad.jpg"),
            error: "corrupt".to_string(),
        });
        assert_eq!(lines, vec!["    failed: bad.jpg: corrupt"]);
    }

    #[test]
    fn page_written_counts_are_pluralized() {
        let lines = format_walk_event(&WalkEvent::PageWritten {
            path: PathBuf::from("photos/index.html"),
            images: 1,
            directories: 3,
        });
        assert_eq!(lines, vec!["    index.html: 1 image, 3 directories"]);
    }

    #[test]
    fn page_skip_reasons() {
        let up_to_date = format_walk_event(&WalkEvent::PageSkipped {
            path: PathBuf::from("photos/index.html"),
            reason: PageSkip::UpToDate,
        });
        assert_eq!(up_to_date, vec!["    index.html: up to date"]);

        let empty = format_walk_event(&WalkEvent::PageSkipped {
            path: PathBuf::from("photos/empty/index.html"),
            reason: PageSkip::Empty,
        });
        assert_eq!(empty, vec!["    index.html: skipped, nothing to list"]);
    }

    #[test]
    fn root_header_lists_backends() {
        assert_eq!(
            format_root_header(Path::new("photos"), &["image", "mogrify"]),
            "==> photos (backends: image, mogrify)"
        );
    }

    #[test]
    fn summary_mentions_fallbacks_only_when_used() {
        let stats = RunStats {
            directories: 1,
            thumbnails_created: 2,
            pages_written: 1,
            ..RunStats::default()
        };
        assert_eq!(
            format_summary(Path::new("photos"), &stats),
            "photos: 1 directories; thumbnails: 2 created, 0 up to date; pages: 1 written, 0 up to date"
        );

        let with_fallback = RunStats {
            fallbacks: 1,
            ..stats
        };
        assert!(
            format_summary(Path::new("photos"), &with_fallback)
                .ends_with("(1 via fallback backend)")
        );
    }
}
