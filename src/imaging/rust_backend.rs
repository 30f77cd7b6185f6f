//! Pure Rust thumbnail backend, no external programs.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image` crate (pure Rust decoders) |
//! | Shrink-to-fit | `image::DynamicImage::resize_exact` with `Lanczos3` |
//! | Pad to square | `image::imageops::overlay` onto a white canvas |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |

use super::backend::{BackendError, ImageBackend};
use super::calculations::{center_offset, fit_within};
use super::params::ThumbnailParams;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader, Rgba, RgbaImage};
use std::path::Path;
use std::sync::LazyLock;

/// Extensions whose decoders are compiled in.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// In-process backend using the `image` crate.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Shrink `img` to fit a `size × size` box and center it on a white square.
///
/// Transparent pixels are composited onto the white background.
fn fit_and_pad(img: &DynamicImage, size: u32) -> RgbaImage {
    let (w, h) = fit_within((img.width(), img.height()), size);
    let scaled = if (w, h) == (img.width(), img.height()) {
        img.to_rgba8()
    } else {
        img.resize_exact(w, h, FilterType::Lanczos3).to_rgba8()
    };

    let (x, y) = center_offset((w, h), size);
    let mut canvas = RgbaImage::from_pixel(size, size, BACKGROUND);
    image::imageops::overlay(&mut canvas, &scaled, i64::from(x), i64::from(y));
    canvas
}

/// Encode and save as baseline JPEG.
fn save_jpeg(img: RgbaImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let rgb = DynamicImage::ImageRgba8(img).to_rgb8();
    let file = std::fs::File::create(path).map_err(BackendError::Io)?;
    let writer = std::io::BufWriter::new(file);
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality as u8);
    DynamicImage::ImageRgb8(rgb)
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))
}

impl ImageBackend for RustBackend {
    fn name(&self) -> &'static str {
        "image"
    }

    fn is_available(&self, source: &Path) -> bool {
        source
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                supported_input_extensions()
                    .iter()
                    .any(|s| s.eq_ignore_ascii_case(ext))
            })
    }

    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let padded = fit_and_pad(&img, params.size);
        save_jpeg(padded, &params.output, params.quality.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Quality;
    use crate::test_helpers::write_image;
    use image::{GenericImageView, RgbImage};

    fn is_near_white(p: image::Rgba<u8>) -> bool {
        p.0[..3].iter().all(|c| *c > 230)
    }

    fn is_near_black(p: image::Rgba<u8>) -> bool {
        p.0[..3].iter().all(|c| *c < 40)
    }

    #[test]
    fn supported_extensions_match_decodable_formats() {
        let exts = supported_input_extensions();
        for expected in &["jpg", "jpeg", "png", "tif", "tiff", "webp"] {
            assert!(
                exts.contains(expected),
                "expected {expected} in supported extensions"
            );
        }
        assert!(!exts.contains(&"gif"));
    }

    #[test]
    fn availability_follows_extension_case_insensitively() {
        let backend = RustBackend::new();
        assert!(backend.is_available(Path::new("a.jpg")));
        assert!(backend.is_available(Path::new("a.PNG")));
        assert!(!backend.is_available(Path::new("a.gif")));
        assert!(!backend.is_available(Path::new("noext")));
    }

    #[test]
    fn thumbnail_landscape_is_square_with_white_bands() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("wide.png");
        write_image(&source, 800, 400);

        let output = tmp.path().join("wide.jpg");
        RustBackend::new()
            .thumbnail(&ThumbnailParams {
                source,
                output: output.clone(),
                size: 96,
                quality: Quality::default(),
            })
            .unwrap();

        let thumb = image::open(&output).unwrap();
        assert_eq!(thumb.dimensions(), (96, 96));
        // 800x400 → 96x48, so 24px of padding above and below
        assert!(is_near_white(thumb.get_pixel(48, 5)));
        assert!(is_near_white(thumb.get_pixel(48, 90)));
        assert!(!is_near_white(thumb.get_pixel(48, 48)));
    }

    #[test]
    fn thumbnail_small_source_is_not_upscaled() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("tiny.png");
        RgbImage::from_pixel(40, 20, image::Rgb([0, 0, 0]))
            .save(&source)
            .unwrap();

        let output = tmp.path().join("tiny.jpg");
        RustBackend::new()
            .thumbnail(&ThumbnailParams {
                source,
                output: output.clone(),
                size: 96,
                quality: Quality::default(),
            })
            .unwrap();

        let thumb = image::open(&output).unwrap();
        assert_eq!(thumb.dimensions(), (96, 96));
        // Black 40x20 block sits at x 28..68, y 38..58
        assert!(is_near_black(thumb.get_pixel(48, 48)));
        assert!(is_near_white(thumb.get_pixel(10, 48)));
        assert!(is_near_white(thumb.get_pixel(48, 10)));
    }

    #[test]
    fn thumbnail_transparency_becomes_white() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("clear.png");
        RgbaImage::from_pixel(50, 50, Rgba([255, 0, 0, 0]))
            .save(&source)
            .unwrap();

        let output = tmp.path().join("clear.jpg");
        RustBackend::new()
            .thumbnail(&ThumbnailParams {
                source,
                output: output.clone(),
                size: 96,
                quality: Quality::default(),
            })
            .unwrap();

        let thumb = image::open(&output).unwrap();
        assert!(is_near_white(thumb.get_pixel(48, 48)));
    }

    #[test]
    fn thumbnail_overwrites_existing_output() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("a.jpg");
        write_image(&source, 120, 90);
        let output = tmp.path().join("thumb.jpg");
        std::fs::write(&output, b"stale").unwrap();

        RustBackend::new()
            .thumbnail(&ThumbnailParams {
                source,
                output: output.clone(),
                size: 64,
                quality: Quality::default(),
            })
            .unwrap();

        assert_eq!(image::open(&output).unwrap().dimensions(), (64, 64));
    }

    #[test]
    fn thumbnail_undecodable_source_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("broken.jpg");
        std::fs::write(&source, b"definitely not a jpeg").unwrap();

        let result = RustBackend::new().thumbnail(&ThumbnailParams {
            source,
            output: tmp.path().join("broken-thumb.jpg"),
            size: 96,
            quality: Quality::default(),
        });
        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
    }

    #[test]
    fn thumbnail_missing_source_is_io_error() {
        let result = RustBackend::new().thumbnail(&ThumbnailParams {
            source: "/nonexistent/image.jpg".into(),
            output: "/nonexistent/thumb.jpg".into(),
            size: 96,
            quality: Quality::default(),
        });
        assert!(matches!(result, Err(BackendError::Io(_))));
    }
}
