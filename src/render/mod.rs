//! # Raster Rendering
//!
//! Drawing surface, typefaces and 1-bit conversion used by the raster
//! encoder.
//!
//! - [`canvas`]: white RGB surface that text runs are composited onto
//! - [`font`]: [`font::Typeface`] implementations (built-in bitmap, TrueType)
//! - [`mono`]: luminance threshold and MSB-first bit packing

pub mod canvas;
pub mod font;
pub mod mono;

pub use canvas::Canvas;
pub use font::{BitmapTypeface, GlyphRun, TtfTypeface, Typeface};
pub use mono::MonoBitmap;
