//! Typefaces for the raster path.
//!
//! A [`Typeface`] turns a run of text into a coverage mask. The mask's width
//! doubles as the measurement used for centring and right alignment.
//!
//! Two implementations:
//!
//! - [`BitmapTypeface`]: the built-in Spleen 12×24 bitmap font. Always
//!   available, Latin only; unknown characters draw as a box.
//! - [`TtfTypeface`]: any TrueType/OpenType font via ab_glyph, loaded at
//!   runtime (e.g. a Gujarati face). Glyphs are placed by advance width
//!   only; there is no complex-script shaping.

use std::path::Path;

use ab_glyph::{Font, FontArc, ScaleFont};
use spleen_font::{FONT_12X24, PSF2Font};

use crate::error::ReceiptError;

/// Rendered text run.
#[derive(Debug, Clone)]
pub struct GlyphRun {
    pub width: usize,
    pub height: usize,
    /// Intensity values: 0.0 = paper, 1.0 = full ink.
    pub coverage: Vec<f32>,
}

impl GlyphRun {
    fn blank(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            coverage: vec![0.0; width * height],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.coverage[y * self.width + x]
    }

    /// Keep only the leftmost `max_width` columns.
    pub fn cropped(&self, max_width: usize) -> GlyphRun {
        if max_width >= self.width {
            return self.clone();
        }
        let mut out = GlyphRun::blank(max_width, self.height);
        for y in 0..self.height {
            let src = &self.coverage[y * self.width..y * self.width + max_width];
            out.coverage[y * max_width..(y + 1) * max_width].copy_from_slice(src);
        }
        out
    }

    /// Synthetic bold: OR each pixel with its left neighbour, one dot wider.
    fn embolden(self) -> Self {
        let width = self.width + 1;
        let mut out = GlyphRun::blank(width, self.height);
        for y in 0..self.height {
            for x in 0..width {
                let here = if x < self.width { self.get(x, y) } else { 0.0 };
                let left = if x > 0 { self.get(x - 1, y) } else { 0.0 };
                out.coverage[y * width + x] = here.max(left);
            }
        }
        out
    }
}

/// Source of rendered text for the raster canvas.
pub trait Typeface: Send + Sync {
    /// Render `text` with a nominal line height of `pixel_height` dots.
    ///
    /// The returned run is exactly `pixel_height` rows tall.
    fn render(&self, text: &str, pixel_height: u32, bold: bool) -> GlyphRun;
}

// ============================================================================
// BITMAP FONT
// ============================================================================

const SPLEEN_WIDTH: usize = 12;
const SPLEEN_HEIGHT: usize = 24;

/// Built-in Spleen 12×24 bitmap font, scaled by whole multiples.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitmapTypeface;

impl Typeface for BitmapTypeface {
    fn render(&self, text: &str, pixel_height: u32, bold: bool) -> GlyphRun {
        let height = (pixel_height as usize).max(1);
        let scale = (height / SPLEEN_HEIGHT).max(1);
        let char_w = SPLEEN_WIDTH * scale;
        let chars: Vec<char> = text.chars().collect();

        let mut run = GlyphRun::blank(char_w * chars.len(), height);
        let mut font = PSF2Font::new(FONT_12X24).ok();
        // Centre the scaled cell vertically in the requested line height
        let y_offset = height.saturating_sub(SPLEEN_HEIGHT * scale) / 2;

        for (i, &ch) in chars.iter().enumerate() {
            if ch == ' ' {
                continue;
            }
            let cells = spleen_cells(font.as_mut(), ch);
            for gy in 0..SPLEEN_HEIGHT {
                for gx in 0..SPLEEN_WIDTH {
                    if !cells[gy * SPLEEN_WIDTH + gx] {
                        continue;
                    }
                    for sy in 0..scale {
                        let y = y_offset + gy * scale + sy;
                        if y >= height {
                            continue;
                        }
                        for sx in 0..scale {
                            let x = i * char_w + gx * scale + sx;
                            run.coverage[y * run.width + x] = 1.0;
                        }
                    }
                }
            }
        }

        if bold { run.embolden() } else { run }
    }
}

/// One glyph as a 12×24 on/off grid.
fn spleen_cells(font: Option<&mut PSF2Font>, ch: char) -> Vec<bool> {
    let mut cells = vec![false; SPLEEN_WIDTH * SPLEEN_HEIGHT];
    let utf8 = ch.to_string();

    let mut found = false;
    if let Some(glyph) = font.and_then(|f| f.glyph_for_utf8(utf8.as_bytes())) {
        for (row_y, row) in glyph.enumerate() {
            for (col_x, on) in row.enumerate() {
                if row_y < SPLEEN_HEIGHT && col_x < SPLEEN_WIDTH {
                    cells[row_y * SPLEEN_WIDTH + col_x] = on;
                }
            }
        }
        found = true;
    }

    if !found {
        draw_box(&mut cells, SPLEEN_WIDTH, SPLEEN_HEIGHT);
    }
    cells
}

/// Draw a box outline for characters the font doesn't cover.
fn draw_box(cells: &mut [bool], width: usize, height: usize) {
    let (left, right, top, bottom) = (1, width - 2, 4, height - 3);
    for x in left..=right {
        cells[top * width + x] = true;
        cells[bottom * width + x] = true;
    }
    for y in top..=bottom {
        cells[y * width + left] = true;
        cells[y * width + right] = true;
    }
}

// ============================================================================
// TRUETYPE FONT
// ============================================================================

/// TrueType/OpenType face rendered with ab_glyph.
#[derive(Clone)]
pub struct TtfTypeface {
    regular: FontArc,
    bold: Option<FontArc>,
}

impl TtfTypeface {
    /// Load a face from font file bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, ReceiptError> {
        let regular =
            FontArc::try_from_vec(data).map_err(|e| ReceiptError::Font(e.to_string()))?;
        Ok(Self {
            regular,
            bold: None,
        })
    }

    /// Load a face from a font file on disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ReceiptError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            ReceiptError::Font(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_bytes(data)
    }

    /// Use a dedicated bold face instead of synthetic emboldening.
    pub fn with_bold_bytes(mut self, data: Vec<u8>) -> Result<Self, ReceiptError> {
        let bold = FontArc::try_from_vec(data).map_err(|e| ReceiptError::Font(e.to_string()))?;
        self.bold = Some(bold);
        Ok(self)
    }
}

impl Typeface for TtfTypeface {
    fn render(&self, text: &str, pixel_height: u32, bold: bool) -> GlyphRun {
        let (font, synthetic_bold) = match (&self.bold, bold) {
            (Some(face), true) => (face, false),
            (None, true) => (&self.regular, true),
            (_, false) => (&self.regular, false),
        };

        let height = (pixel_height as usize).max(1);
        let px = height as f32;
        let scaled = font.as_scaled(px);

        // Fit ascent + descent into the line height
        let ascent = scaled.ascent();
        let descent = scaled.descent();
        let fit = (px / (ascent - descent)).min(1.0);
        let scale = px * fit;
        let scaled = font.as_scaled(scale);
        let baseline_y = scaled.ascent() + (px - (scaled.ascent() - scaled.descent())) / 2.0;

        let mut glyphs = Vec::new();
        let mut caret_x = 0.0f32;
        let mut previous = None;
        for ch in text.chars() {
            let glyph_id = font.glyph_id(ch);
            if let Some(prev) = previous {
                caret_x += scaled.kern(prev, glyph_id);
            }
            glyphs.push((glyph_id, caret_x));
            caret_x += scaled.h_advance(glyph_id);
            previous = Some(glyph_id);
        }

        let width = caret_x.ceil().max(0.0) as usize;
        let mut run = GlyphRun::blank(width, height);

        for &(glyph_id, glyph_x) in &glyphs {
            let glyph =
                glyph_id.with_scale_and_position(scale, ab_glyph::point(glyph_x, baseline_y));

            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    let x = gx as i32 + bounds.min.x as i32;
                    let y = gy as i32 + bounds.min.y as i32;

                    if x >= 0 && (x as usize) < width && y >= 0 && (y as usize) < height {
                        let idx = y as usize * width + x as usize;
                        run.coverage[idx] = (run.coverage[idx] + coverage).min(1.0);
                    }
                });
            }
        }

        if synthetic_bold { run.embolden() } else { run }
    }
}

// ============================================================================
// TESTS
// ============================================================================
