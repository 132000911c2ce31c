//! # Error Types
//!
//! This module defines error types used throughout the escpos-receipt library.
//!
//! Transport failures have their own [`PrintError`] so callers can tell
//! "reconnect" apart from "retry" apart from "investigate the hardware".

use thiserror::Error;

pub use crate::transport::PrintError;

/// Main error type for receipt encoding and printing
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Paper width outside the supported 58mm / 80mm set
    #[error("Unsupported paper width: {0} (expected 58mm or 80mm)")]
    UnsupportedPaperWidth(String),

    /// Raster canvas cannot be expressed in a single raster command
    #[error("Canvas too large: {width}x{height} dots (height limit is 65535)")]
    CanvasTooLarge { width: u32, height: u32 },

    /// TrueType font could not be loaded
    #[error("Font error: {0}")]
    Font(String),

    /// Image processing error
    #[error("Image error: {0}")]
    Image(String),

    /// Delivery to the printer failed
    #[error(transparent)]
    Print(#[from] PrintError),

    /// Malformed receipt or preferences JSON
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for ReceiptError {
    fn from(err: image::ImageError) -> Self {
        ReceiptError::Image(err.to_string())
    }
}
