//! Gallery configuration.
//!
//! Configuration is resolved once, before any directory is visited, into an
//! immutable [`GalleryConfig`] that every component borrows. Three layers,
//! later ones winning:
//!
//! 1. Stock defaults ([`Settings::default`])
//! 2. An optional TOML file (`--config gallery.toml`)
//! 3. Command-line flags ([`Overrides`])
//!
//! ## Config File
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! whitelist = ["jpg", "png"]        # Extensions that get thumbnails
//! thumbnail_size = 96               # Thumbnail edge in pixels
//! thumbnail_directory = "tn"        # Per-directory thumbnail folder
//! row_columns = 5                   # Cells per row on index pages
//! # template = "layout.html"        # Custom layout (relative to this file)
//! force_html_generation = false
//! force_thumbnail_generation = false
//! ```
//!
//! Unknown keys are rejected to catch typos early.
//!
//! ## Implicit Forcing
//!
//! Changing the layout (columns, template, whitelist, size) from the command
//! line forces both thumbnails and pages to be regenerated, so the whole tree
//! matches the new parameters. Values from the config file do not force.

use crate::page::{DEFAULT_TEMPLATE, PAGE_VARIABLES, check_template};
use crate::template::{Template, TemplateError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Template error in {origin}: {error}")]
    Template {
        origin: String,
        #[source]
        error: TemplateError,
    },
}

/// Raw, serializable settings as read from a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Extensions eligible for thumbnails and listing.
    pub whitelist: Vec<String>,
    /// Thumbnail edge length in pixels.
    pub thumbnail_size: u32,
    /// Name of the per-directory thumbnail folder.
    pub thumbnail_directory: String,
    /// Cells per row on index pages.
    pub row_columns: usize,
    /// Custom layout template file. `None` uses the built-in layout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,
    pub force_html_generation: bool,
    pub force_thumbnail_generation: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            whitelist: vec!["jpg".to_string(), "png".to_string()],
            thumbnail_size: 96,
            thumbnail_directory: "tn".to_string(),
            row_columns: 5,
            template: None,
            force_html_generation: false,
            force_thumbnail_generation: false,
        }
    }
}

impl Settings {
    /// Validate values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thumbnail_size == 0 {
            return Err(ConfigError::Validation(
                "thumbnail_size must be at least 1".into(),
            ));
        }
        if self.row_columns == 0 {
            return Err(ConfigError::Validation(
                "row_columns must be at least 1".into(),
            ));
        }
        if normalize_whitelist(&self.whitelist).is_empty() {
            return Err(ConfigError::Validation(
                "whitelist must name at least one extension".into(),
            ));
        }
        let dir = self.thumbnail_directory.as_str();
        if dir.is_empty() || dir == "." || dir == ".." || dir.contains(['/', '\\']) {
            return Err(ConfigError::Validation(format!(
                "thumbnail_directory must be a plain directory name, got {dir:?}"
            )));
        }
        Ok(())
    }

    /// Layer command-line overrides on top of these settings.
    pub fn apply(mut self, overrides: Overrides) -> Self {
        let forced = overrides.changes_output();
        if let Some(whitelist) = overrides.whitelist {
            self.whitelist = whitelist;
        }
        if let Some(size) = overrides.thumbnail_size {
            self.thumbnail_size = size;
        }
        if let Some(dir) = overrides.thumbnail_directory {
            self.thumbnail_directory = dir;
        }
        if let Some(columns) = overrides.row_columns {
            self.row_columns = columns;
        }
        if let Some(template) = overrides.template {
            self.template = Some(template);
        }
        self.force_html_generation |= overrides.force_html || forced;
        self.force_thumbnail_generation |= overrides.force_thumbnails || forced;
        self
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub force_html: bool,
    pub force_thumbnails: bool,
    pub row_columns: Option<usize>,
    pub template: Option<PathBuf>,
    pub thumbnail_directory: Option<String>,
    pub whitelist: Option<Vec<String>>,
    pub thumbnail_size: Option<u32>,
}

impl Overrides {
    /// Whether any override changes what thumbnails or pages look like.
    pub fn changes_output(&self) -> bool {
        self.row_columns.is_some()
            || self.template.is_some()
            || self.whitelist.is_some()
            || self.thumbnail_size.is_some()
    }
}

/// Normalize one extension: trim and drop a leading dot. Case is kept, so
/// `JPG` and `jpg` are distinct entries.
fn normalize_extension(ext: &str) -> Option<String> {
    let ext = ext.trim().trim_start_matches('.').to_string();
    (!ext.is_empty()).then_some(ext)
}

fn normalize_whitelist(exts: &[String]) -> BTreeSet<String> {
    exts.iter().filter_map(|e| normalize_extension(e)).collect()
}

/// Split a comma-separated extension list (`"jpg, .JPG,gif"`).
pub fn parse_whitelist(list: &str) -> Vec<String> {
    list.split(',').filter_map(normalize_extension).collect()
}

/// Immutable configuration for one run.
#[derive(Debug, Clone)]
pub struct GalleryConfig {
    pub whitelist: BTreeSet<String>,
    pub thumbnail_size: u32,
    pub thumbnail_directory: String,
    pub row_columns: usize,
    pub force_thumbnail_generation: bool,
    pub force_html_generation: bool,
    pub template: Template,
}

impl GalleryConfig {
    /// Validate settings, then load, parse and trial-render the layout
    /// template.
    pub fn from_settings(settings: Settings) -> Result<Self, ConfigError> {
        settings.validate()?;

        let (source, origin) = match &settings.template {
            Some(path) => {
                let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                (source, path.display().to_string())
            }
            None => (DEFAULT_TEMPLATE.to_string(), "built-in template".to_string()),
        };
        let template = Template::parse(&source, PAGE_VARIABLES)
            .and_then(|template| {
                check_template(&template, &settings.thumbnail_directory)?;
                Ok(template)
            })
            .map_err(|error| ConfigError::Template { origin, error })?;

        Ok(Self {
            whitelist: normalize_whitelist(&settings.whitelist),
            thumbnail_size: settings.thumbnail_size,
            thumbnail_directory: settings.thumbnail_directory,
            row_columns: settings.row_columns,
            force_thumbnail_generation: settings.force_thumbnail_generation,
            force_html_generation: settings.force_html_generation,
            template,
        })
    }
}

// =============================================================================
// Config file loading and merging
// =============================================================================

/// Returns the stock default settings as a `toml::Value::Table`.
///
/// This is the base layer that config file values are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(Settings::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load settings from a TOML file, merged over stock defaults.
///
/// A relative `template` path is resolved against the file's directory.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let overlay: toml::Value = toml::from_str(&content)?;
    let merged = merge_toml(stock_defaults_value()?, overlay);
    let mut settings: Settings = merged.try_into()?;

    if let Some(template) = settings.template.take() {
        let base = path.parent().unwrap_or(Path::new(""));
        settings.template = Some(if template.is_relative() {
            base.join(template)
        } else {
            template
        });
    }

    settings.validate()?;
    Ok(settings)
}

/// Returns a fully-commented stock config file.
///
/// Used by the `--gen-config` flag.
pub fn stock_config_toml() -> &'static str {
    r##"# tn-gallery configuration
# =========================
# All settings are optional. Values shown are the defaults.
# Command-line flags override anything set here.
# Unknown keys cause an error.

# File extensions that get a thumbnail and a cell on the index page.
# Matching is case-sensitive: list "JPG" as well to include "PHOTO.JPG".
whitelist = ["jpg", "png"]

# Thumbnails are padded to a square of this many pixels.
thumbnail_size = 96

# Folder created inside every gallery directory to hold thumbnails.
# Directories with this name are never treated as galleries themselves.
thumbnail_directory = "tn"

# Cells per row on index pages.
row_columns = 5

# Custom layout template, relative to this file.
# Variables: title, dirs (rows of names), rows (rows of {filename, thumbfilename}).
# template = "layout.html"

# Regenerate every index.html / thumbnail even when it already exists.
force_html_generation = false
force_thumbnail_generation = false
"##
}
