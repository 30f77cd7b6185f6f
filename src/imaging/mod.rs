//! Thumbnail production.
//!
//! | Operation | Backend |
//! |---|---|
//! | **Decode / scale / pad / encode** | [`RustBackend`] (`image` crate) |
//! | **Fallback for other formats** | [`MagickBackend`] (`mogrify`) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for fit-and-pad geometry (unit testable)
//! - **Parameters**: Data structures describing a thumbnail operation
//! - **Backend**: [`ImageBackend`] trait + the two implementations
//! - **Operations**: [`Thumbnailer`], which picks a backend per file

pub mod backend;
mod calculations;
pub mod magick_backend;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use calculations::{center_offset, fit_within};
pub use magick_backend::MagickBackend;
pub use operations::{Thumbnail, Thumbnailer, plan_thumbnail};
pub use params::{Quality, ThumbnailParams};
pub use rust_backend::RustBackend;
