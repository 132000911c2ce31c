//! # Receipt Document
//!
//! The print payload both encoders consume: company branding, the estimate
//! and its line items, and the customer's previous pending balance.
//!
//! All strings arrive pre-formatted (dates are already locale strings,
//! estimate numbers already look like `EST-0001`). Amounts are plain
//! floating-point rupee values rendered with two decimals.
//!
//! ```
//! use escpos_receipt::receipt::{LineItem, ReceiptDocument, format_money};
//!
//! let doc = ReceiptDocument {
//!     company_name: "PN TRADING".into(),
//!     line_items: vec![LineItem::new("Item A", 2.0, 50.0)],
//!     total_amount: 100.0,
//!     pending_amount: 100.0,
//!     ..Default::default()
//! };
//! assert_eq!(doc.line_items[0].amount, 100.0);
//! assert_eq!(format_money(doc.total_pending()), "100.00");
//! ```

use serde::{Deserialize, Serialize};

/// One estimate line.
///
/// `amount == quantity * rate` is the caller's responsibility and is never
/// re-checked here.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub description: String,
    pub quantity: f64,
    pub rate: f64,
    pub amount: f64,
}

impl LineItem {
    /// Build a line item with `amount = quantity * rate`.
    pub fn new(description: impl Into<String>, quantity: f64, rate: f64) -> Self {
        Self {
            description: description.into(),
            quantity,
            rate,
            amount: quantity * rate,
        }
    }
}

/// Fully resolved receipt contents.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReceiptDocument {
    pub company_name: String,
    pub company_address: String,
    pub company_phone: String,
    pub estimate_date: String,
    pub estimate_number: String,
    pub customer_name: String,
    pub customer_address: String,
    pub previous_pending: Option<f64>,
    pub line_items: Vec<LineItem>,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub pending_amount: f64,
}

impl ReceiptDocument {
    /// Previous balance worth printing: present and strictly positive.
    pub fn printable_previous_pending(&self) -> Option<f64> {
        self.previous_pending.filter(|p| *p > 0.0)
    }

    /// Amount printed on the "Total Pending" line.
    pub fn total_pending(&self) -> f64 {
        self.previous_pending.unwrap_or(0.0) + self.pending_amount
    }
}

/// Format an amount with exactly two decimals.
///
/// Rounds half away from zero on the value scaled to cents, so `0.125`
/// prints as `0.13`. Both encoders go through this helper.
pub fn format_money(value: f64) -> String {
    let cents = (value * 100.0).round();
    let negative = cents < 0.0;
    let cents = cents.abs() as u64;
    format!(
        "{}{}.{:02}",
        if negative { "-" } else { "" },
        cents / 100,
        cents % 100
    )
}

/// Format an amount as printed on receipts, e.g. `Rs50.00`.
pub fn format_rupees(value: f64) -> String {
    format!("Rs{}", format_money(value))
}

/// Format a quantity like a plain number: `2`, `2.5`, `0.75`.
pub fn format_quantity(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

// ============================================================================
// TESTS
// ============================================================================
