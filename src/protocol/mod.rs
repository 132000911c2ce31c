//! # ESC/POS Protocol Implementation
//!
//! This module provides low-level command builders for the subset of ESC/POS
//! the receipts use.
//!
//! ## Module Structure
//!
//! - [`commands`]: Basic printer commands (init, feed, cut)
//! - [`text`]: Text styling (alignment, bold, double width)
//! - [`graphics`]: Raster bit image command
//!
//! ## Usage Example
//!
//! ```
//! use escpos_receipt::protocol::{commands, text};
//!
//! let mut data = Vec::new();
//! data.extend(commands::init());
//! data.extend(text::align_center());
//! data.extend(text::bold_on());
//! data.extend(b"RECEIPT\n");
//! data.extend(text::bold_off());
//! data.extend(commands::feed_and_cut());
//! ```

pub mod commands;
pub mod graphics;
pub mod text;
