//! # Script Classifier
//!
//! Decides whether a receipt can go out as ESC/POS text or has to be
//! rendered as a bitmap. Printer ROM fonts only cover 7-bit ASCII reliably,
//! so a single codepoint above `0x7F` in any printed text field (Gujarati,
//! Devanagari, even a curly quote) sends the whole receipt down the raster
//! path. There is no per-field mixed mode.

use std::fmt;

use crate::receipt::ReceiptDocument;

/// Text fields inspected by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    CompanyName,
    CompanyAddress,
    CustomerName,
    CustomerAddress,
    /// Description of the line item at this 0-based index
    ItemDescription(usize),
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::CompanyName => write!(f, "company name"),
            Field::CompanyAddress => write!(f, "company address"),
            Field::CustomerName => write!(f, "customer name"),
            Field::CustomerAddress => write!(f, "customer address"),
            Field::ItemDescription(i) => write!(f, "item {} description", i + 1),
        }
    }
}

fn fields(doc: &ReceiptDocument) -> impl Iterator<Item = (Field, &str)> {
    [
        (Field::CompanyName, doc.company_name.as_str()),
        (Field::CompanyAddress, doc.company_address.as_str()),
        (Field::CustomerName, doc.customer_name.as_str()),
        (Field::CustomerAddress, doc.customer_address.as_str()),
    ]
    .into_iter()
    .chain(
        doc.line_items
            .iter()
            .enumerate()
            .map(|(i, item)| (Field::ItemDescription(i), item.description.as_str())),
    )
}

/// True iff any inspected field contains a non-ASCII codepoint.
pub fn requires_raster(doc: &ReceiptDocument) -> bool {
    fields(doc).any(|(_, text)| !text.is_ascii())
}

/// The first field (and character) that forces the raster path, if any.
pub fn first_non_ascii(doc: &ReceiptDocument) -> Option<(Field, char)> {
    fields(doc).find_map(|(field, text)| {
        text.chars()
            .find(|c| !c.is_ascii())
            .map(|c| (field, c))
    })
}

// ============================================================================
// TESTS
// ============================================================================
