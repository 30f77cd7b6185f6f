//! ImageMagick backend: shells out to `mogrify`.
//!
//! Covers formats the `image` crate build can't decode (GIF, HEIC, RAW
//! variants, ...) as long as the local ImageMagick can. The command line
//! mirrors the Rust backend's geometry:
//!
//! ```text
//! mogrify -resize 96x96> -background white -gravity center -extent 96x96 \
//!         -quality 80 -format jpg -path <thumb dir> <source>
//! ```
//!
//! `mogrify -format jpg -path DIR` writes `DIR/<stem>.jpg`, which is the same
//! name [`thumbnail_file_name`](crate::naming::thumbnail_file_name) derives,
//! so callers can rely on `ThumbnailParams::output` after a successful run.

use super::backend::{BackendError, ImageBackend};
use super::params::ThumbnailParams;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

pub const DEFAULT_PROGRAM: &str = "mogrify";

pub struct MagickBackend {
    program: PathBuf,
}

impl MagickBackend {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Probe for a working `mogrify` on `PATH`. Runs the program once.
    pub fn detect() -> Option<Self> {
        Self::probe(DEFAULT_PROGRAM)
    }

    /// Probe a specific executable by running `<program> -version`.
    pub fn probe(program: impl Into<PathBuf>) -> Option<Self> {
        let backend = Self::new(program);
        let found = Command::new(&backend.program)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|s| s.success());
        if found {
            log::debug!("found {}", backend.program.display());
            Some(backend)
        } else {
            log::debug!("{} not available", backend.program.display());
            None
        }
    }
}

/// Build the `mogrify` argument list for one thumbnail.
///
/// The trailing `>` on `-resize` restricts it to shrinking.
pub fn mogrify_args(params: &ThumbnailParams) -> Vec<OsString> {
    let size = params.size;
    let out_dir = params
        .output
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let mut args: Vec<OsString> = [
        "-resize".to_string(),
        format!("{size}x{size}>"),
        "-background".to_string(),
        "white".to_string(),
        "-gravity".to_string(),
        "center".to_string(),
        "-extent".to_string(),
        format!("{size}x{size}"),
        "-quality".to_string(),
        params.quality.value().to_string(),
        "-format".to_string(),
        "jpg".to_string(),
        "-path".to_string(),
    ]
    .into_iter()
    .map(OsString::from)
    .collect();
    args.push(out_dir.into_os_string());
    args.push(params.source.clone().into_os_string());
    args
}

impl ImageBackend for MagickBackend {
    fn name(&self) -> &'static str {
        "mogrify"
    }

    fn is_available(&self, _source: &Path) -> bool {
        // Existence was established by `probe`; format support is
        // ImageMagick's business and surfaces as a command failure.
        true
    }

    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError> {
        let output = Command::new(&self.program)
            .args(mogrify_args(params))
            .stdin(Stdio::null())
            .output()?;

        if !output.status.success() {
            return Err(BackendError::CommandFailed {
                program: self.program.display().to_string(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        if !params.output.exists() {
            return Err(BackendError::ProcessingFailed(format!(
                "{} did not produce {}",
                self.program.display(),
                params.output.display()
            )));
        }
        Ok(())
    }
}
