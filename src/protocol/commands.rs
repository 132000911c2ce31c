//! # ESC/POS Printer Commands
//!
//! Basic control commands shared by the text and raster paths:
//! initialisation, paper feed and the cutter.
//!
//! ## Escape Sequence Structure
//!
//! - Two bytes: `ESC @`
//! - With parameters: `ESC d n`, `GS V m`
//!
//! ## Byte Order
//!
//! Multi-byte integers use **little-endian** encoding:
//! - `u16` value 0x1234 is sent as bytes `[0x34, 0x12]`

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// ESC (Escape) - Command prefix byte
///
/// Most ESC/POS commands begin with ESC (0x1B).
pub const ESC: u8 = 0x1B;

/// GS (Group Separator) - Extended command prefix
///
/// Used for cutter control and raster graphics.
/// - Hex: 0x1D, Decimal: 29
pub const GS: u8 = 0x1D;

/// LF (Line Feed) - Print the line buffer and advance one line
pub const LF: u8 = 0x0A;

// ============================================================================
// INITIALIZATION COMMANDS
// ============================================================================

/// # Initialize Printer (ESC @)
///
/// Resets the printer to its power-on default state. Both encoding paths
/// start with this.
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC @ |
/// | Hex     | 1B 40 |
/// | Decimal | 27 64 |
///
/// ## Example
///
/// ```
/// use escpos_receipt::protocol::commands;
///
/// assert_eq!(commands::init(), vec![0x1B, 0x40]);
/// ```
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

/// # Select Print Direction (ESC T n)
///
/// The text path sends `ESC T 0` right after `ESC @` so the printer starts
/// every receipt left-to-right, top-to-bottom regardless of what a previous
/// job left behind.
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | Hex     | 1B 54 n  |
#[inline]
pub fn print_direction(n: u8) -> Vec<u8> {
    vec![ESC, b'T', n]
}

// ============================================================================
// PAPER FEED COMMANDS
// ============================================================================

/// # Print and Feed n Lines (ESC d n)
///
/// Prints the line buffer, then advances the paper `n` lines at the
/// current line spacing.
///
/// ## Protocol Details
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | ESC d n  |
/// | Hex     | 1B 64 n  |
/// | Decimal | 27 100 n |
///
/// ## Example
///
/// ```
/// use escpos_receipt::protocol::commands;
///
/// assert_eq!(commands::feed_lines(4), vec![0x1B, 0x64, 0x04]);
/// ```
#[inline]
pub fn feed_lines(n: u8) -> Vec<u8> {
    vec![ESC, b'd', n]
}

// ============================================================================
// CUTTER CONTROL COMMANDS
// ============================================================================

/// # Full Cut (GS V 0)
///
/// Cuts the paper at the current position. Receipts feed four lines first
/// so the last printed line clears the cutter.
///
/// ## Protocol Details
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | GS V 0   |
/// | Hex     | 1D 56 00 |
/// | Decimal | 29 86 0  |
#[inline]
pub fn cut() -> Vec<u8> {
    vec![GS, b'V', 0]
}

/// Lines fed before the cut at the end of every receipt.
pub const TRAILER_FEED_LINES: u8 = 4;

/// Feed four lines, then cut.
///
/// Both encoding paths end with exactly these bytes so the printer is left
/// in the same physical state whichever path produced the job.
///
/// ```
/// use escpos_receipt::protocol::commands;
///
/// assert_eq!(
///     commands::feed_and_cut(),
///     vec![0x1B, 0x64, 0x04, 0x1D, 0x56, 0x00]
/// );
/// ```
pub fn feed_and_cut() -> Vec<u8> {
    let mut cmd = feed_lines(TRAILER_FEED_LINES);
    cmd.extend(cut());
    cmd
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Encode a u16 value as little-endian bytes [low, high]
///
/// ```
/// use escpos_receipt::protocol::commands::u16_le;
///
/// assert_eq!(u16_le(0x1234), [0x34, 0x12]);
/// assert_eq!(u16_le(72), [0x48, 0x00]);
/// ```
#[inline]
pub const fn u16_le(value: u16) -> [u8; 2] {
    [value as u8, (value >> 8) as u8]
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert_eq!(init(), vec![0x1B, 0x40]);
    }

    #[test]
    fn test_print_direction() {
        assert_eq!(print_direction(0), vec![0x1B, 0x54, 0x00]);
    }

    #[test]
    fn test_feed_lines() {
        assert_eq!(feed_lines(0), vec![0x1B, 0x64, 0x00]);
        assert_eq!(feed_lines(1), vec![0x1B, 0x64, 0x01]);
        assert_eq!(feed_lines(255), vec![0x1B, 0x64, 0xFF]);
    }

    #[test]
    fn test_cut() {
        assert_eq!(cut(), vec![0x1D, 0x56, 0x00]);
    }

    #[test]
    fn test_feed_and_cut() {
        assert_eq!(feed_and_cut(), vec![0x1B, 0x64, 0x04, 0x1D, 0x56, 0x00]);
    }

    #[test]
    fn test_u16_le() {
        assert_eq!(u16_le(0x0000), [0x00, 0x00]);
        assert_eq!(u16_le(0x00FF), [0xFF, 0x00]);
        assert_eq!(u16_le(0xFF00), [0x00, 0xFF]);
        assert_eq!(u16_le(576), [0x40, 0x02]);
    }
}
