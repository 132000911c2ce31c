//! # ESC/POS Raster Graphics
//!
//! The raster path sends the whole receipt as one `GS v 0` image.
//!
//! ## Bit Packing
//!
//! Graphics data is packed as bytes where each bit represents one dot:
//! - Bit 7 (MSB) = leftmost dot
//! - Bit 0 (LSB) = rightmost dot
//! - 1 = black (print), 0 = white (no print)
//!
//! ```text
//! Byte value 0xF0 = 11110000 = ████░░░░
//! Byte value 0x0F = 00001111 = ░░░░████
//! ```
//!
//! ## Paper Widths
//!
//! | Paper | Width (dots) | Bytes per row |
//! |-------|--------------|---------------|
//! | 58mm  | 384          | 48            |
//! | 80mm  | 576          | 72            |

use super::commands::{GS, u16_le};

/// Length of the `GS v 0 m xL xH yL yH` header.
pub const RASTER_HEADER_LEN: usize = 8;

/// Normal density (m = 0)
pub const MODE_NORMAL: u8 = 0;

/// # Print Raster Bit Image (GS v 0 m xL xH yL yH d1...dk)
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | GS v 0 m xL xH yL yH d1...dk |
/// | Hex     | 1D 76 30 m xL xH yL yH d1...dk |
///
/// ## Parameters
///
/// - `m`: Mode (0 = normal)
/// - `xL, xH`: Width in **bytes**, little-endian
/// - `yL, yH`: Height in dots, little-endian
/// - `d1...dk`: Image data, k = width_bytes × height bytes, row-major
///
/// ## Example
///
/// ```
/// use escpos_receipt::protocol::graphics;
///
/// let data = vec![0xAA; 72 * 100];
/// let cmd = graphics::raster(72, 100, &data);
///
/// assert_eq!(&cmd[0..4], &[0x1D, 0x76, 0x30, 0x00]);
/// assert_eq!(&cmd[4..6], &[72, 0]);
/// assert_eq!(&cmd[6..8], &[100, 0]);
/// assert_eq!(cmd.len(), 8 + 72 * 100);
/// ```
pub fn raster(width_bytes: u16, height: u16, data: &[u8]) -> Vec<u8> {
    let expected_len = width_bytes as usize * height as usize;

    debug_assert!(
        data.len() == expected_len,
        "Raster data length mismatch. Expected {} ({} bytes × {} rows), got {}",
        expected_len,
        width_bytes,
        height,
        data.len()
    );

    let [xl, xh] = u16_le(width_bytes);
    let [yl, yh] = u16_le(height);

    let mut cmd = Vec::with_capacity(RASTER_HEADER_LEN + data.len());
    cmd.push(GS);
    cmd.push(b'v');
    cmd.push(b'0');
    cmd.push(MODE_NORMAL);
    cmd.push(xl);
    cmd.push(xh);
    cmd.push(yl);
    cmd.push(yh);
    cmd.extend_from_slice(data);
    cmd
}

// ============================================================================
// TESTS
// ============================================================================
