//! # escpos-receipt - Estimate Receipts for Thermal Printers
//!
//! Turns an estimate (invoice-like) document into the byte stream a 58mm or
//! 80mm ESC/POS thermal printer understands, and delivers it over a slow
//! Bluetooth link. It provides:
//!
//! - **Settings**: paper width to column count and dot width
//! - **Script classification**: ASCII receipts go out as text, anything
//!   else (Gujarati, Devanagari, ...) is rendered to a bitmap
//! - **Encoders**: ESC/POS text commands or a single raster image
//! - **Transport**: paced chunk writer behind a connection state machine
//!
//! ## Quick Start
//!
//! ```no_run
//! use escpos_receipt::{
//!     encode,
//!     printer::{EncoderSettings, PaperWidth},
//!     receipt::{LineItem, ReceiptDocument},
//!     render::BitmapTypeface,
//!     transport::{Connection, RfcommConnector},
//! };
//!
//! # async fn demo() -> Result<(), escpos_receipt::ReceiptError> {
//! let doc = ReceiptDocument {
//!     company_name: "PN TRADING".into(),
//!     line_items: vec![LineItem::new("Item A", 2.0, 50.0)],
//!     total_amount: 100.0,
//!     pending_amount: 100.0,
//!     ..Default::default()
//! };
//!
//! let settings = EncoderSettings::for_paper(PaperWidth::Mm80);
//! let job = encode::encode_receipt(&doc, &settings, &BitmapTypeface)?;
//!
//! let printer = Connection::new(RfcommConnector::new("/dev/rfcomm0"));
//! printer.connect().await?;
//! printer.print(job.as_bytes()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`printer`] | Paper widths, preferences, encoder settings |
//! | [`receipt`] | Receipt data model and money formatting |
//! | [`script`] | Raster-or-text decision |
//! | [`encode`] | Text and raster encoders |
//! | [`protocol`] | ESC/POS command builders |
//! | [`render`] | Canvas, typefaces and 1-bit conversion |
//! | [`transport`] | Chunked writer, connection state, RFCOMM link |
//! | [`error`] | Error types |

pub mod encode;
pub mod error;
pub mod printer;
pub mod protocol;
pub mod receipt;
pub mod render;
pub mod script;
pub mod transport;

// Re-exports for convenience
pub use encode::{EncodingPath, ReceiptBytes, encode_receipt};
pub use error::{PrintError, ReceiptError};
pub use printer::{EncoderSettings, PaperWidth, PrintPreferences};
pub use receipt::{LineItem, ReceiptDocument};
