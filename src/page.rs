//! Index page layout and rendering.
//!
//! A directory's page lists its subdirectories and its images, each packed
//! row-major into rows of `row_columns` cells:
//!
//! ```text
//! names:    a b c d e f g      (sorted)
//! columns:  3
//! rows:     [a b c] [d e f] [g]
//! ```
//!
//! The packed [`PageModel`] is exposed to the layout template as:
//!
//! | Variable | Shape |
//! |---|---|
//! | `title` | text, last segment of the directory path |
//! | `dirs` | list of rows, each a list of subdirectory names |
//! | `rows` | list of rows, each a list of `{ filename, thumbfilename }` records |

use crate::config::GalleryConfig;
use crate::naming::{ImageRef, is_whitelisted};
use crate::template::{Context, Template, TemplateError, Value};
use std::path::Path;

/// Top-level names a layout template may reference.
pub const PAGE_VARIABLES: &[&str] = &["title", "dirs", "rows"];

/// Built-in layout template.
pub const DEFAULT_TEMPLATE: &str = include_str!("../static/index.html");

pub type Row<T> = Vec<T>;

/// Group `items` into rows of `columns`, left to right, top to bottom.
///
/// Every row but the last is full; the last holds the remainder.
pub fn pack_rows<T>(items: Vec<T>, columns: usize) -> Vec<Row<T>> {
    let columns = columns.max(1);
    let mut rows = Vec::with_capacity(items.len().div_ceil(columns));
    let mut items = items.into_iter().peekable();
    while items.peek().is_some() {
        rows.push(items.by_ref().take(columns).collect());
    }
    rows
}

/// Everything one index page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageModel {
    pub title: String,
    pub directories: Vec<Row<String>>,
    pub images: Vec<Row<ImageRef>>,
}

impl PageModel {
    /// Lay out one directory from its immediate file and subdirectory names.
    pub fn build(
        files: &[String],
        dirs: &[String],
        dir_path: &Path,
        config: &GalleryConfig,
    ) -> Self {
        let mut dir_names: Vec<String> = dirs
            .iter()
            .filter(|d| **d != config.thumbnail_directory)
            .cloned()
            .collect();
        dir_names.sort();

        let mut image_names: Vec<&String> = files
            .iter()
            .filter(|f| is_whitelisted(f, &config.whitelist))
            .collect();
        image_names.sort();
        let image_refs = image_names
            .into_iter()
            .map(|f| ImageRef::new(f, &config.thumbnail_directory))
            .collect();

        Self {
            title: page_title(dir_path),
            directories: pack_rows(dir_names, config.row_columns),
            images: pack_rows(image_refs, config.row_columns),
        }
    }

    /// A page with nothing to list is not written.
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty() && self.images.is_empty()
    }

    pub fn image_count(&self) -> usize {
        self.images.iter().map(Vec::len).sum()
    }

    pub fn directory_count(&self) -> usize {
        self.directories.iter().map(Vec::len).sum()
    }

    pub fn to_context(&self) -> Context {
        let dirs = self
            .directories
            .iter()
            .map(|row| Value::List(row.iter().map(|d| Value::from(d.as_str())).collect()))
            .collect();
        let rows = self
            .images
            .iter()
            .map(|row| Value::List(row.iter().map(image_value).collect()))
            .collect();

        Context::from([
            ("title", Value::from(self.title.as_str())),
            ("dirs", Value::List(dirs)),
            ("rows", Value::List(rows)),
        ])
    }

    pub fn render(&self, template: &Template) -> Result<String, TemplateError> {
        template.render(&self.to_context())
    }
}

fn image_value(image: &ImageRef) -> Value {
    Value::Record(
        [
            ("filename", Value::from(image.filename.as_str())),
            ("thumbfilename", Value::from(image.thumbnail.as_str())),
        ]
        .into_iter()
        .collect(),
    )
}

/// Last segment of `dir_path`, or the whole path when there is none (`/`, `..`).
fn page_title(dir_path: &Path) -> String {
    dir_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir_path.display().to_string())
}

/// Render `template` against a page with one directory row and one image
/// row, then against a page with neither.
///
/// Unknown fields and shape errors only surface when a value is used, so
/// configuration runs this once before any directory is visited.
pub fn check_template(template: &Template, thumbnail_directory: &str) -> Result<(), TemplateError> {
    let full = PageModel {
        title: "gallery".to_string(),
        directories: vec![vec!["sub".to_string()]],
        images: vec![vec![ImageRef::new("a.jpg", thumbnail_directory)]],
    };
    let bare = PageModel {
        directories: Vec::new(),
        images: Vec::new(),
        ..full.clone()
    };
    full.render(template)?;
    bare.render(template)?;
    Ok(())
}

/// A rendered index page, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub html: Vec<u8>,
    pub images: usize,
    pub directories: usize,
}

/// Lay out and render the index page for one directory.
///
/// Returns `None` when there is nothing to list.
pub fn build_page(
    files: &[String],
    dirs: &[String],
    dir_path: &Path,
    config: &GalleryConfig,
) -> Result<Option<RenderedPage>, TemplateError> {
    let model = PageModel::build(files, dirs, dir_path, config);
    if model.is_empty() {
        return Ok(None);
    }
    let html = model.render(&config.template)?;
    Ok(Some(RenderedPage {
        html: html.into_bytes(),
        images: model.image_count(),
        directories: model.directory_count(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{names, test_config};

    fn image_names(model: &PageModel) -> Vec<Vec<&str>> {
        model
            .images
            .iter()
            .map(|row| row.iter().map(|i| i.filename.as_str()).collect())
            .collect()
    }

    // =========================================================================
    // pack_rows
    // =========================================================================

    #[test]
    fn pack_rows_exact_multiple() {
        let rows = pack_rows((1..=6).collect(), 3);
        assert_eq!(rows, vec![vec![1, 2, 3], vec![4, 5, 6]]);
    }

    #[test]
    fn pack_rows_short_last_row() {
        let rows = pack_rows((1..=7).collect(), 3);
        assert_eq!(rows, vec![vec![1, 2, 3], vec![4, 5, 6], vec![7]]);
    }

    #[test]
    fn pack_rows_empty() {
        assert!(pack_rows(Vec::<u8>::new(), 5).is_empty());
    }

    #[test]
    fn pack_rows_shape_for_many_sizes() {
        for columns in 1..=6 {
            for n in 0..=20usize {
                let rows = pack_rows((0..n).collect::<Vec<_>>(), columns);
                assert_eq!(rows.len(), n.div_ceil(columns), "n={n} c={columns}");
                if let Some((last, full)) = rows.split_last() {
                    assert!(full.iter().all(|r| r.len() == columns));
                    let expected_last = if n % columns == 0 { columns } else { n % columns };
                    assert_eq!(last.len(), expected_last);
                }
                let flat: Vec<usize> = rows.into_iter().flatten().collect();
                assert_eq!(flat, (0..n).collect::<Vec<_>>());
            }
        }
    }

    // =========================================================================
    // PageModel
    // =========================================================================

    #[test]
    fn images_filtered_and_sorted() {
        let config = test_config();
        let model = PageModel::build(
            &names(&["b.jpg", "a.png", "c.gif"]),
            &[],
            Path::new("/g"),
            &config,
        );
        assert_eq!(image_names(&model), vec![vec!["a.png", "b.jpg"]]);
    }

    #[test]
    fn image_refs_point_into_thumbnail_dir() {
        let config = test_config();
        let model = PageModel::build(&names(&["b.png"]), &[], Path::new("/g"), &config);
        assert_eq!(model.images[0][0].thumbnail, "tn/b.jpg");
    }

    #[test]
    fn thumbnail_dir_never_listed() {
        let config = test_config();
        let model = PageModel::build(
            &[],
            &names(&["zeta", "tn", "alpha"]),
            Path::new("/g"),
            &config,
        );
        assert_eq!(model.directories, vec![names(&["alpha", "zeta"])]);
    }

    #[test]
    fn rows_use_configured_columns() {
        let config = crate::config::GalleryConfig {
            row_columns: 2,
            ..test_config()
        };
        let model = PageModel::build(
            &names(&["e.jpg", "d.jpg", "c.jpg", "b.jpg", "a.jpg"]),
            &names(&["x", "y", "z"]),
            Path::new("/g"),
            &config,
        );
        assert_eq!(
            image_names(&model),
            vec![vec!["a.jpg", "b.jpg"], vec!["c.jpg", "d.jpg"], vec!["e.jpg"]]
        );
        assert_eq!(model.directories, vec![names(&["x", "y"]), names(&["z"])]);
        assert_eq!(model.image_count(), 5);
        assert_eq!(model.directory_count(), 3);
    }

    #[test]
    fn title_is_last_path_segment() {
        let config = test_config();
        let model = PageModel::build(&[], &[], Path::new("/photos/2024/summer"), &config);
        assert_eq!(model.title, "summer");
    }

    #[test]
    fn title_falls_back_to_whole_path() {
        assert_eq!(page_title(Path::new("/")), "/");
        assert_eq!(page_title(Path::new("..")), "..");
    }

    #[test]
    fn only_thumbnail_dir_and_other_files_is_empty() {
        let config = test_config();
        let model = PageModel::build(
            &names(&["notes.txt"]),
            &names(&["tn"]),
            Path::new("/g"),
            &config,
        );
        assert!(model.is_empty());
    }

    // =========================================================================
    // build_page
    // =========================================================================

    #[test]
    fn build_page_skips_empty_directory() {
        let config = test_config();
        let page = build_page(&names(&["notes.txt"]), &[], Path::new("/g"), &config).unwrap();
        assert!(page.is_none());
    }

    #[test]
    fn build_page_renders_default_template() {
        let config = test_config();
        let page = build_page(
            &names(&["b.png", "a.jpg", "notes.txt"]),
            &names(&["sub", "tn"]),
            Path::new("/g"),
            &config,
        )
        .unwrap()
        .unwrap();
        let html = String::from_utf8(page.html).unwrap();

        assert!(html.contains("<title>g</title>"));
        assert!(html.contains(r#"<a href="sub/index.html">sub</a>"#));
        assert!(html.contains(r#"<a href="a.jpg"><img src="tn/a.jpg""#));
        assert!(html.contains(r#"<a href="b.png"><img src="tn/b.jpg""#));
        assert!(html.find("a.jpg").unwrap() < html.find("b.png").unwrap());
        assert!(!html.contains("notes.txt"));
        assert!(!html.contains(r#"href="tn/index.html""#));
        assert_eq!(page.images, 2);
        assert_eq!(page.directories, 1);
    }

    #[test]
    fn build_page_omits_directory_block_without_subdirs() {
        let config = test_config();
        let page = build_page(&names(&["c.jpg"]), &names(&["tn"]), Path::new("/g/sub"), &config)
            .unwrap()
            .unwrap();
        let html = String::from_utf8(page.html).unwrap();
        assert!(!html.contains("Directories:"));
        assert!(html.contains(r#"<img src="tn/c.jpg""#));
    }

    #[test]
    fn build_page_with_custom_template() {
        let template = Template::parse(
            "{{ title }}:{% for row in rows %}[{% for i in row %}{{ i.filename }}>{{ i.thumbfilename }} {% endfor %}]{% endfor %}",
            PAGE_VARIABLES,
        )
        .unwrap();
        let config = crate::config::GalleryConfig {
            template,
            row_columns: 1,
            ..test_config()
        };
        let page = build_page(&names(&["y.png", "x.jpg"]), &[], Path::new("/g/h"), &config)
            .unwrap()
            .unwrap();
        assert_eq!(
            String::from_utf8(page.html).unwrap(),
            "h:[x.jpg>tn/x.jpg ][y.png>tn/y.jpg ]"
        );
    }

    #[test]
    fn default_template_parses() {
        Template::parse(DEFAULT_TEMPLATE, PAGE_VARIABLES).unwrap();
    }

    // =========================================================================
    // check_template
    // =========================================================================

    fn check(source: &str) -> Result<(), TemplateError> {
        let template = Template::parse(source, PAGE_VARIABLES).unwrap();
        check_template(&template, "tn")
    }

    #[test]
    fn check_accepts_default_template() {
        assert_eq!(check(DEFAULT_TEMPLATE), Ok(()));
    }

    #[test]
    fn check_catches_unknown_image_field() {
        let result = check("{% for row in rows %}{% for i in row %}{{ i.size }}{% endfor %}{% endfor %}");
        assert!(matches!(
            result,
            Err(TemplateError::MissingField { ref field, .. }) if field == "size"
        ));
    }

    #[test]
    fn check_catches_printed_list() {
        assert!(matches!(check("{{ dirs }}"), Err(TemplateError::NotPrintable { .. })));
    }

    #[test]
    fn check_catches_loop_over_text() {
        assert!(matches!(
            check("{% for c in title %}{{ c }}{% endfor %}"),
            Err(TemplateError::NotIterable { .. })
        ));
    }

    #[test]
    fn check_reaches_else_branches() {
        assert!(check("{% if rows %}ok{% else %}{{ rows.filename }}{% endif %}").is_err());
    }
}
