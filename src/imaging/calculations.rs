//! Pure calculation functions for thumbnail geometry.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the dimensions of `source` scaled down to fit inside a
/// `bound × bound` box, preserving aspect ratio.
///
/// Images that already fit are returned unchanged (no upscaling). Neither
/// edge is ever rounded down to zero.
///
/// # Examples
/// ```
/// # use tn_gallery::imaging::fit_within;
/// // 800x600 landscape into a 96px box → 96x72
/// assert_eq!(fit_within((800, 600), 96), (96, 72));
///
/// // Small images are left alone
/// assert_eq!(fit_within((40, 30), 96), (40, 30));
/// ```
pub fn fit_within(source: (u32, u32), bound: u32) -> (u32, u32) {
    let (src_w, src_h) = source;

    if src_w <= bound && src_h <= bound {
        return (src_w, src_h);
    }

    if src_w >= src_h {
        // Landscape or square: width hits the bound first
        let h = (bound as f64 * src_h as f64 / src_w as f64).round() as u32;
        (bound, h.max(1))
    } else {
        let w = (bound as f64 * src_w as f64 / src_h as f64).round() as u32;
        (w.max(1), bound)
    }
}

/// Offset that centers an `inner` rectangle inside a `size × size` square.
///
/// Odd leftovers go to the right/bottom edge, matching ImageMagick's
/// `-gravity center -extent`.
pub fn center_offset(inner: (u32, u32), size: u32) -> (u32, u32) {
    let (w, h) = inner;
    (size.saturating_sub(w) / 2, size.saturating_sub(h) / 2)
}
