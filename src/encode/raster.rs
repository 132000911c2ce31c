//! # Raster Encoder
//!
//! Renders the whole receipt to a bitmap and sends it as a single `GS v 0`
//! image, for text the printer's ROM font cannot draw (Gujarati and other
//! non-Latin scripts). The layout is built independently of the text
//! encoder but carries the same information in the same order.
//!
//! ## Pipeline
//!
//! ```text
//! ReceiptDocument ──layout()──► [RasterRow] ──render_canvas()──► RgbImage
//!                                                                    │
//!            ESC @ + GS v 0 + data + ESC d 4 + GS V 0 ◄── MonoBitmap ◄┘
//! ```
//!
//! ## Vertical Metrics
//!
//! | Item | Rows |
//! |------|------|
//! | Top / bottom padding | 16 / 16 |
//! | Normal line | `max(24, round(24 × line_spacing))` |
//! | Double-height line | 2 × normal line |
//! | Item spacing unit | 8 (1mm) |
//!
//! The canvas width is 384 dots (58mm) or 576 dots (80mm).

use image::RgbImage;
use tracing::debug;

use crate::encode::columns::separator;
use crate::encode::text::labels;
use crate::error::ReceiptError;
use crate::printer::EncoderSettings;
use crate::protocol::{commands, graphics};
use crate::receipt::{ReceiptDocument, format_quantity, format_rupees};
use crate::render::{Canvas, MonoBitmap, Typeface};

/// Glyph height of a normal line in dots.
pub const BASE_GLYPH_PX: u32 = 24;

/// Blank rows above the first line.
pub const PADDING_TOP: u32 = 16;

/// Blank rows below the last line.
pub const PADDING_BOTTOM: u32 = 16;

/// Horizontal margin for left/right aligned text.
pub const MARGIN_X: u32 = 4;

/// Rows per `item_spacing` unit.
pub const ITEM_SPACING_ROWS: u32 = 8;

/// Minimum blank dots between the two columns of a row.
const COLUMN_GAP: u32 = 12;

/// One line of text on the bitmap.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VisualLine {
    pub text: String,
    /// Right-aligned second column (amounts)
    pub right: Option<String>,
    pub bold: bool,
    pub centered: bool,
    pub double_height: bool,
}

impl VisualLine {
    fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    fn columns(label: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            text: label.into(),
            right: Some(amount.into()),
            ..Default::default()
        }
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    fn centered(mut self) -> Self {
        self.centered = true;
        self
    }

    fn double_height(mut self) -> Self {
        self.double_height = true;
        self
    }
}

/// Vertical layout unit.
#[derive(Debug, Clone, PartialEq)]
pub enum RasterRow {
    Line(VisualLine),
    /// Blank rows (dots)
    Gap(u32),
}

/// Row heights derived from the settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMetrics {
    pub line_height: u32,
}

impl LineMetrics {
    pub fn for_settings(settings: &EncoderSettings) -> Self {
        let scaled = (BASE_GLYPH_PX as f32 * settings.line_spacing).round();
        // Anything taller than u16::MAX rows is rejected as CanvasTooLarge later
        let line_height = if scaled.is_finite() && scaled > BASE_GLYPH_PX as f32 {
            scaled.min(u16::MAX as f32) as u32
        } else {
            BASE_GLYPH_PX
        };
        Self { line_height }
    }

    /// Rows consumed by `row`.
    pub fn row_height(&self, row: &RasterRow) -> u32 {
        match row {
            RasterRow::Line(line) if line.double_height => self.line_height * 2,
            RasterRow::Line(_) => self.line_height,
            RasterRow::Gap(rows) => *rows,
        }
    }

    /// Total canvas height for a layout, padding included.
    pub fn canvas_height(&self, rows: &[RasterRow]) -> u64 {
        let body: u64 = rows.iter().map(|r| self.row_height(r) as u64).sum();
        PADDING_TOP as u64 + body + PADDING_BOTTOM as u64
    }
}

/// Build the ordered list of visual lines for `doc`.
pub fn layout(doc: &ReceiptDocument, settings: &EncoderSettings) -> Vec<RasterRow> {
    let width = settings.line_width;
    let metrics = LineMetrics::for_settings(settings);
    let mut rows = Vec::with_capacity(24 + doc.line_items.len() * 3);
    let mut push = |line: VisualLine| rows.push(RasterRow::Line(line));

    push(
        VisualLine::new(&doc.company_name)
            .bold()
            .centered()
            .double_height(),
    );
    push(VisualLine::new(&doc.company_address).centered());
    push(VisualLine::new(format!("{}{}", labels::PHONE, doc.company_phone)).bold().centered());
    push(VisualLine::new(separator('-', width)).centered());

    push(VisualLine::new(labels::BILL_TO).bold());
    push(VisualLine::new(&doc.customer_name));
    if !doc.customer_address.is_empty() {
        push(VisualLine::new(&doc.customer_address));
    }
    if let Some(previous) = doc.printable_previous_pending() {
        push(VisualLine::columns(labels::PREVIOUS_PENDING, format_rupees(previous)));
    }
    push(VisualLine::new(separator('-', width)).centered());

    push(VisualLine::new(format!("{}{}", labels::DATE, doc.estimate_date)).centered());
    push(
        VisualLine::new(format!("{}{}", labels::INVOICE_NO, doc.estimate_number))
            .bold()
            .centered(),
    );
    push(VisualLine::new(separator('=', width)).centered());

    let item_gap = settings.item_spacing as u32 * ITEM_SPACING_ROWS;
    let count = doc.line_items.len();
    for (i, item) in doc.line_items.iter().enumerate() {
        rows.push(RasterRow::Line(
            VisualLine::new(format!("{}. {}", i + 1, item.description)).bold(),
        ));
        rows.push(RasterRow::Line(VisualLine::columns(
            format!(
                "{} x {}",
                format_quantity(item.quantity),
                format_rupees(item.rate)
            ),
            format_rupees(item.amount),
        )));
        if i + 1 < count && item_gap > 0 {
            rows.push(RasterRow::Gap(item_gap));
        }
    }

    let mut push = |line: VisualLine| rows.push(RasterRow::Line(line));
    push(VisualLine::new(separator('=', width)).centered());

    // "Current Bal." repeats the total amount, matching the text path
    let total = format_rupees(doc.total_amount);
    push(VisualLine::columns(labels::SUB_TOTAL, total.clone()));
    push(VisualLine::columns(labels::CURRENT_BALANCE, total).bold());
    push(VisualLine::new(separator('-', width)).centered());
    push(VisualLine::columns(labels::TOTAL_PENDING, format_rupees(doc.total_pending())).bold());

    rows.push(RasterRow::Gap(metrics.line_height));
    rows.push(RasterRow::Line(VisualLine::new(labels::THANK_YOU).bold().centered()));
    rows.push(RasterRow::Line(VisualLine::new(labels::VISIT_AGAIN).centered()));

    rows
}

/// Draw the receipt onto an RGB surface.
pub fn render_canvas(
    doc: &ReceiptDocument,
    settings: &EncoderSettings,
    typeface: &dyn Typeface,
) -> Result<RgbImage, ReceiptError> {
    let rows = layout(doc, settings);
    let metrics = LineMetrics::for_settings(settings);
    let width = settings.pixel_width();
    let height = metrics.canvas_height(&rows);

    if height > u16::MAX as u64 {
        return Err(ReceiptError::CanvasTooLarge {
            width,
            height: height.min(u32::MAX as u64) as u32,
        });
    }

    let mut canvas = Canvas::new(width, height as u32);
    let mut y = PADDING_TOP as i64;

    for row in &rows {
        let row_height = metrics.row_height(row);
        if let RasterRow::Line(line) = row {
            draw_line(&mut canvas, typeface, line, y, row_height);
        }
        y += row_height as i64;
    }

    Ok(canvas.into_image())
}

fn draw_line(canvas: &mut Canvas, typeface: &dyn Typeface, line: &VisualLine, top: i64, row_height: u32) {
    let glyph_px = if line.double_height {
        BASE_GLYPH_PX * 2
    } else {
        BASE_GLYPH_PX
    };
    let y = top + (row_height.saturating_sub(glyph_px) / 2) as i64;
    let width = canvas.width() as i64;

    let mut left_limit = width - MARGIN_X as i64;
    if let Some(right) = &line.right {
        let run = typeface.render(right, glyph_px, line.bold);
        let x = (width - MARGIN_X as i64 - run.width as i64).max(0);
        canvas.draw_run(&run, x, y);
        left_limit = x - COLUMN_GAP as i64;
    }

    if line.text.is_empty() {
        return;
    }
    let run = typeface.render(&line.text, glyph_px, line.bold);
    let x = if line.centered {
        ((width - run.width as i64) / 2).max(0)
    } else {
        MARGIN_X as i64
    };
    let room = (left_limit - x).max(0) as usize;
    canvas.draw_run(&run.cropped(room), x, y);
}

/// Render and binarise the receipt.
pub fn rasterize(
    doc: &ReceiptDocument,
    settings: &EncoderSettings,
    typeface: &dyn Typeface,
) -> Result<MonoBitmap, ReceiptError> {
    let image = render_canvas(doc, settings, typeface)?;
    Ok(MonoBitmap::from_rgb(&image))
}

/// Encode `doc` as one raster image command.
pub fn encode(
    doc: &ReceiptDocument,
    settings: &EncoderSettings,
    typeface: &dyn Typeface,
) -> Result<Vec<u8>, ReceiptError> {
    let bitmap = rasterize(doc, settings, typeface)?;
    let width_bytes = u16::try_from(bitmap.bytes_per_line).map_err(|_| {
        ReceiptError::CanvasTooLarge {
            width: bitmap.width,
            height: bitmap.height,
        }
    })?;
    let height = u16::try_from(bitmap.height).map_err(|_| ReceiptError::CanvasTooLarge {
        width: bitmap.width,
        height: bitmap.height,
    })?;

    debug!(
        width = bitmap.width,
        height = bitmap.height,
        bytes = bitmap.data.len(),
        "Rasterized receipt"
    );

    let mut out = commands::init();
    out.extend(graphics::raster(width_bytes, height, &bitmap.data));
    out.extend(commands::feed_and_cut());
    Ok(out)
}

// ============================================================================
// TESTS
// ============================================================================
