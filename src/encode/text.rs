//! # Text (ESC/POS) Encoder
//!
//! Serialises a receipt as printer commands plus plain ASCII lines, laid out
//! in fixed character columns.
//!
//! Only valid for documents the script classifier accepts as ASCII; other
//! text is passed through as UTF-8 and prints as garbage.
//!
//! ## Layout (80mm, 42 columns)
//!
//! ```text
//!                 PN TRADING          <- bold, double width
//!              Main Road, Rajkot
//!             Ph.No.: 9876543210      <- bold
//! ------------------------------------------
//! Bill To:                            <- bold
//! Ramesh
//! Station Road
//! Previous Pending:                  Rs40.00
//! ------------------------------------------
//!             Date: 16/10/2026
//!            Invoice No: EST-0001     <- bold
//! ==========================================
//! 1. Item A                           <- bold
//! 2 x Rs50.00                       Rs100.00
//! ==========================================
//! Sub Total:                        Rs100.00
//! Current Bal.:                     Rs100.00  <- bold
//! ------------------------------------------
//! Total Pending:                    Rs140.00  <- bold
//!
//!                 Thank You           <- bold
//!                Visit Again
//! ```

use crate::encode::columns::{separator, truncate, two_column};
use crate::printer::EncoderSettings;
use crate::protocol::{commands, text};
use crate::receipt::{ReceiptDocument, format_quantity, format_rupees};

/// Labels shared with the raster layout.
pub(crate) mod labels {
    pub const PHONE: &str = "Ph.No.: ";
    pub const BILL_TO: &str = "Bill To:";
    pub const PREVIOUS_PENDING: &str = "Previous Pending:";
    pub const DATE: &str = "Date: ";
    pub const INVOICE_NO: &str = "Invoice No: ";
    pub const SUB_TOTAL: &str = "Sub Total:";
    pub const CURRENT_BALANCE: &str = "Current Bal.:";
    pub const TOTAL_PENDING: &str = "Total Pending:";
    pub const THANK_YOU: &str = "Thank You";
    pub const VISIT_AGAIN: &str = "Visit Again";
}

/// Byte buffer with line-oriented helpers.
struct TextWriter {
    buf: Vec<u8>,
    width: usize,
}

impl TextWriter {
    fn new(width: usize) -> Self {
        Self {
            buf: Vec::with_capacity(2048),
            width,
        }
    }

    fn cmd(&mut self, bytes: Vec<u8>) -> &mut Self {
        self.buf.extend(bytes);
        self
    }

    fn line(&mut self, s: &str) -> &mut Self {
        self.buf.extend_from_slice(s.as_bytes());
        self.buf.push(commands::LF);
        self
    }

    /// Print `s` cut to `width` columns.
    fn line_fit(&mut self, s: &str, width: usize) -> &mut Self {
        self.line(truncate(s, width))
    }

    fn rule(&mut self, ch: char) -> &mut Self {
        let rule = separator(ch, self.width);
        self.line(&rule)
    }

    fn columns(&mut self, label: &str, amount: &str) -> &mut Self {
        let row = two_column(label, amount, self.width);
        self.line(&row)
    }

    fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Encode `doc` as ESC/POS text.
pub fn encode(doc: &ReceiptDocument, settings: &EncoderSettings) -> Vec<u8> {
    let width = settings.line_width;
    let mut w = TextWriter::new(width);

    w.cmd(commands::init())
        .cmd(commands::print_direction(0))
        .cmd(text::print_mode_reset());

    // Header: double width halves the usable columns
    w.cmd(text::align_center())
        .cmd(text::bold_on())
        .cmd(text::double_width_on())
        .line_fit(&doc.company_name, width / 2)
        .cmd(text::print_mode_reset())
        .cmd(text::bold_off());

    w.cmd(text::align_center())
        .line_fit(&doc.company_address, width);

    w.cmd(text::bold_on())
        .line_fit(&format!("{}{}", labels::PHONE, doc.company_phone), width)
        .cmd(text::bold_off());

    w.rule('-');

    // Customer
    w.cmd(text::align_left())
        .cmd(text::bold_on())
        .line(labels::BILL_TO)
        .cmd(text::bold_off())
        .line_fit(&doc.customer_name, width);
    if !doc.customer_address.is_empty() {
        w.line_fit(&doc.customer_address, width);
    }

    if let Some(previous) = doc.printable_previous_pending() {
        w.columns(labels::PREVIOUS_PENDING, &format_rupees(previous));
    }

    w.rule('-');

    w.cmd(text::align_center())
        .line_fit(&format!("{}{}", labels::DATE, doc.estimate_date), width)
        .cmd(text::bold_on())
        .line_fit(
            &format!("{}{}", labels::INVOICE_NO, doc.estimate_number),
            width,
        )
        .cmd(text::bold_off());

    w.cmd(text::align_left()).rule('=');

    // Items, in document order
    let count = doc.line_items.len();
    for (i, item) in doc.line_items.iter().enumerate() {
        w.cmd(text::bold_on())
            .line_fit(&format!("{}. {}", i + 1, item.description), width)
            .cmd(text::bold_off());

        let qty_rate = format!(
            "{} x {}",
            format_quantity(item.quantity),
            format_rupees(item.rate)
        );
        w.columns(&qty_rate, &format_rupees(item.amount));

        if i + 1 < count && settings.item_spacing > 0 {
            w.cmd(commands::feed_lines(settings.item_spacing));
        }
    }

    w.rule('=');

    // Totals. "Current Bal." repeats the total amount on purpose.
    let total = format_rupees(doc.total_amount);
    w.columns(labels::SUB_TOTAL, &total);
    w.cmd(text::bold_on())
        .columns(labels::CURRENT_BALANCE, &total)
        .cmd(text::bold_off());

    w.rule('-');

    w.cmd(text::bold_on())
        .columns(labels::TOTAL_PENDING, &format_rupees(doc.total_pending()))
        .cmd(text::bold_off());

    // Footer
    w.cmd(text::align_center())
        .cmd(commands::feed_lines(1))
        .cmd(text::bold_on())
        .line(labels::THANK_YOU)
        .cmd(text::bold_off())
        .line(labels::VISIT_AGAIN);

    w.cmd(commands::feed_and_cut());

    w.into_bytes()
}

// ============================================================================
// TESTS
// ============================================================================
