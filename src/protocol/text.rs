//! # ESC/POS Text Styling
//!
//! Alignment, emphasis and character size commands used by the text
//! encoder.
//!
//! ## Command Summary
//!
//! | Command | Bytes | Function |
//! |---------|-------|----------|
//! | ESC a n | 1B 61 n | Alignment (0 left, 1 center, 2 right) |
//! | ESC E n | 1B 45 n | Emphasis (bold) on/off |
//! | ESC ! n | 1B 21 n | Print mode (0x20 = double width) |
//!
//! `ESC ! n` replaces the whole print mode byte, so `print_mode_reset()`
//! also clears double width.

use super::commands::ESC;

/// Text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left = 0,
    Center = 1,
    Right = 2,
}

/// Print mode bit for double-width characters
pub const MODE_DOUBLE_WIDTH: u8 = 0x20;

/// # Set Alignment (ESC a n)
///
/// ```
/// use escpos_receipt::protocol::text::{self, Alignment};
///
/// assert_eq!(text::align(Alignment::Center), vec![0x1B, 0x61, 0x01]);
/// ```
#[inline]
pub fn align(alignment: Alignment) -> Vec<u8> {
    vec![ESC, b'a', alignment as u8]
}

#[inline]
pub fn align_left() -> Vec<u8> {
    align(Alignment::Left)
}

#[inline]
pub fn align_center() -> Vec<u8> {
    align(Alignment::Center)
}

#[inline]
pub fn align_right() -> Vec<u8> {
    align(Alignment::Right)
}

/// # Emphasis On (ESC E 1)
#[inline]
pub fn bold_on() -> Vec<u8> {
    vec![ESC, b'E', 1]
}

/// # Emphasis Off (ESC E 0)
#[inline]
pub fn bold_off() -> Vec<u8> {
    vec![ESC, b'E', 0]
}

/// # Select Print Mode (ESC ! n)
///
/// Only bit 5 (double width) is used by the receipts.
#[inline]
pub fn print_mode(n: u8) -> Vec<u8> {
    vec![ESC, b'!', n]
}

/// Double width on (`ESC ! 0x20`)
#[inline]
pub fn double_width_on() -> Vec<u8> {
    print_mode(MODE_DOUBLE_WIDTH)
}

/// Normal print mode (`ESC ! 0`)
#[inline]
pub fn print_mode_reset() -> Vec<u8> {
    print_mode(0)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_bytes() {
        assert_eq!(align_left(), vec![0x1B, 0x61, 0x00]);
        assert_eq!(align_center(), vec![0x1B, 0x61, 0x01]);
        assert_eq!(align_right(), vec![0x1B, 0x61, 0x02]);
    }

    #[test]
    fn test_bold_bytes() {
        assert_eq!(bold_on(), vec![0x1B, 0x45, 0x01]);
        assert_eq!(bold_off(), vec![0x1B, 0x45, 0x00]);
    }

    #[test]
    fn test_double_width_bytes() {
        assert_eq!(double_width_on(), vec![0x1B, 0x21, 0x20]);
        assert_eq!(print_mode_reset(), vec![0x1B, 0x21, 0x00]);
    }
}
