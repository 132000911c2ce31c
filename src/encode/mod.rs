//! # Receipt Encoding
//!
//! Picks the encoding path for a receipt and produces the printer job.
//!
//! ```text
//! ReceiptDocument ─► script::requires_raster ─┬─ false ─► text::encode   ─┐
//!                                             └─ true  ─► raster::encode ─┴─► ReceiptBytes
//! ```
//!
//! Both paths start with `ESC @` and end with `ESC d 4` + `GS V 0`.
//!
//! ## Example
//!
//! ```
//! use escpos_receipt::encode::{self, EncodingPath};
//! use escpos_receipt::printer::EncoderSettings;
//! use escpos_receipt::receipt::{LineItem, ReceiptDocument};
//! use escpos_receipt::render::BitmapTypeface;
//!
//! let doc = ReceiptDocument {
//!     company_name: "PN TRADING".into(),
//!     line_items: vec![LineItem::new("Item A", 2.0, 50.0)],
//!     ..Default::default()
//! };
//! let job = encode::encode_receipt(&doc, &EncoderSettings::default(), &BitmapTypeface)?;
//! assert_eq!(job.path(), EncodingPath::Text);
//! # Ok::<(), escpos_receipt::ReceiptError>(())
//! ```

pub mod columns;
pub mod raster;
pub mod text;

use std::fmt;

use tracing::debug;

use crate::error::ReceiptError;
use crate::printer::EncoderSettings;
use crate::receipt::ReceiptDocument;
use crate::render::Typeface;
use crate::script;

/// Which encoder produced a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingPath {
    /// ESC/POS commands and ASCII lines
    Text,
    /// One raster bit image
    Raster,
}

impl fmt::Display for EncodingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingPath::Text => write!(f, "text"),
            EncodingPath::Raster => write!(f, "raster"),
        }
    }
}

/// A complete print job, ending with the paper cut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptBytes {
    path: EncodingPath,
    bytes: Vec<u8>,
}

impl ReceiptBytes {
    pub fn path(&self) -> EncodingPath {
        self.path
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl AsRef<[u8]> for ReceiptBytes {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Encode with the path the script classifier picks.
pub fn encode_receipt(
    doc: &ReceiptDocument,
    settings: &EncoderSettings,
    typeface: &dyn Typeface,
) -> Result<ReceiptBytes, ReceiptError> {
    let path = match script::first_non_ascii(doc) {
        Some((field, ch)) => {
            debug!(%field, ch = %ch, "Non-ASCII text, using raster path");
            EncodingPath::Raster
        }
        None => EncodingPath::Text,
    };
    encode_with_path(doc, settings, typeface, path)
}

/// Encode on an explicit path.
///
/// Forcing [`EncodingPath::Raster`] is always valid (a WYSIWYG fallback).
/// Forcing [`EncodingPath::Text`] on non-ASCII input prints garbage.
pub fn encode_with_path(
    doc: &ReceiptDocument,
    settings: &EncoderSettings,
    typeface: &dyn Typeface,
    path: EncodingPath,
) -> Result<ReceiptBytes, ReceiptError> {
    let bytes = match path {
        EncodingPath::Text => text::encode(doc, settings),
        EncodingPath::Raster => raster::encode(doc, settings, typeface)?,
    };
    debug!(
        %path,
        paper = %settings.paper_width,
        items = doc.line_items.len(),
        bytes = bytes.len(),
        "Encoded receipt"
    );
    Ok(ReceiptBytes { path, bytes })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::LineItem;
    use crate::render::BitmapTypeface;

    fn doc(description: &str) -> ReceiptDocument {
        ReceiptDocument {
            company_name: "PN TRADING".into(),
            line_items: vec![LineItem::new(description, 1.0, 10.0)],
            total_amount: 10.0,
            pending_amount: 10.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_ascii_takes_text_path() {
        let job = encode_receipt(&doc("Sugar"), &EncoderSettings::default(), &BitmapTypeface)
            .unwrap();
        assert_eq!(job.path(), EncodingPath::Text);
        assert_eq!(job.as_bytes(), &text::encode(&doc("Sugar"), &EncoderSettings::default())[..]);
    }

    #[test]
    fn test_gujarati_takes_raster_path() {
        let job = encode_receipt(&doc("ખાંડ"), &EncoderSettings::default(), &BitmapTypeface)
            .unwrap();
        assert_eq!(job.path(), EncodingPath::Raster);
        assert_eq!(&job.as_bytes()[2..5], &[0x1D, 0x76, 0x30]);
    }

    #[test]
    fn test_forced_raster_for_ascii() {
        let job = encode_with_path(
            &doc("Sugar"),
            &EncoderSettings::default(),
            &BitmapTypeface,
            EncodingPath::Raster,
        )
        .unwrap();
        assert_eq!(job.path(), EncodingPath::Raster);
    }

    #[test]
    fn test_both_paths_share_trailer() {
        let settings = EncoderSettings::default();
        let text = encode_with_path(&doc("Sugar"), &settings, &BitmapTypeface, EncodingPath::Text)
            .unwrap();
        let raster =
            encode_with_path(&doc("Sugar"), &settings, &BitmapTypeface, EncodingPath::Raster)
                .unwrap();
        let trailer = crate::protocol::commands::feed_and_cut();
        assert!(text.as_bytes().ends_with(&trailer));
        assert!(raster.as_bytes().ends_with(&trailer));
    }
}
