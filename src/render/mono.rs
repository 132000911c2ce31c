//! # Monochrome Conversion
//!
//! Turns the RGB drawing surface into the 1-bit-per-dot data the raster
//! command carries.
//!
//! ## Threshold
//!
//! Luminance is the plain mean of R, G and B. A pixel is ink (bit = 1) iff
//! its luminance is below 128. Text is drawn black on white so no
//! dithering is involved.
//!
//! ## Packing
//!
//! ```text
//! bytes_per_line = ceil(width / 8)
//! Row 0:    d[0]                 ... d[bpl-1]
//! Row 1:    d[bpl]               ... d[2*bpl-1]
//! ```
//!
//! Bit 7 is the leftmost dot. Padding bits past the last column are 0.

use image::{GrayImage, Luma, RgbImage};
use rayon::prelude::*;

/// Luminance threshold: darker than this prints.
pub const INK_THRESHOLD: u16 = 128;

/// Packed 1-bit image, row-major, MSB first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonoBitmap {
    pub width: u32,
    pub height: u32,
    pub bytes_per_line: usize,
    pub data: Vec<u8>,
}

impl MonoBitmap {
    /// Binarise an RGB surface.
    pub fn from_rgb(image: &RgbImage) -> Self {
        let width = image.width();
        let height = image.height();
        let bytes_per_line = (width as usize).div_ceil(8);
        let mut data = vec![0u8; bytes_per_line * height as usize];

        if bytes_per_line > 0 {
            data.par_chunks_mut(bytes_per_line)
                .enumerate()
                .for_each(|(y, row)| {
                    let pixels: Vec<bool> = (0..width)
                        .map(|x| is_ink(image.get_pixel(x, y as u32).0))
                        .collect();
                    row.copy_from_slice(&pack_row(&pixels));
                });
        }

        Self {
            width,
            height,
            bytes_per_line,
            data,
        }
    }

    /// Whether the dot at (x, y) prints.
    pub fn is_set(&self, x: u32, y: u32) -> bool {
        let byte = self.data[y as usize * self.bytes_per_line + x as usize / 8];
        byte & (0x80 >> (x % 8)) != 0
    }

    /// Expand back to an 8-bit image (ink = black) for inspection.
    pub fn to_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            if self.is_set(x, y) { Luma([0]) } else { Luma([255]) }
        })
    }
}

/// Mean-of-channels threshold.
#[inline]
pub fn is_ink(rgb: [u8; 3]) -> bool {
    let sum = rgb[0] as u16 + rgb[1] as u16 + rgb[2] as u16;
    sum / 3 < INK_THRESHOLD
}

/// Pack a row of boolean pixels into bytes (MSB first).
///
/// ```
/// use escpos_receipt::render::mono::pack_row;
///
/// let row = vec![true, true, true, true, false, false, false, false];
/// assert_eq!(pack_row(&row), vec![0xF0]);
///
/// // 12 pixels pack into 2 bytes (4 bits padding)
/// let row = vec![true; 12];
/// assert_eq!(pack_row(&row), vec![0xFF, 0xF0]);
/// ```
pub fn pack_row(pixels: &[bool]) -> Vec<u8> {
    let num_bytes = pixels.len().div_ceil(8);
    let mut bytes = vec![0u8; num_bytes];

    for (i, &pixel) in pixels.iter().enumerate() {
        if pixel {
            let byte_idx = i / 8;
            let bit_idx = 7 - (i % 8); // MSB first
            bytes[byte_idx] |= 1 << bit_idx;
        }
    }

    bytes
}

// ============================================================================
// TESTS
// ============================================================================
