//! # Encoding Settings
//!
//! Maps user-facing print preferences to the parameters the encoders need.
//!
//! ## Paper Widths
//!
//! | Paper | Columns (Font A) | Print width (dots) | Bytes per raster row |
//! |-------|------------------|--------------------|----------------------|
//! | 58mm  | 32               | 384                | 48                   |
//! | 80mm  | 42               | 576                | 72                   |
//!
//! The dot widths are fixed by the 8 dots/mm print head, not derived from
//! the column count.
//!
//! ## Usage
//!
//! ```
//! use escpos_receipt::printer::{EncoderSettings, PaperWidth, PrintPreferences};
//!
//! let prefs = PrintPreferences {
//!     paper_width: PaperWidth::Mm58,
//!     ..Default::default()
//! };
//! let settings = EncoderSettings::resolve(&prefs);
//! assert_eq!(settings.line_width, 32);
//! ```

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReceiptError;
use crate::transport::Pacing;

/// Supported thermal paper widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PaperWidth {
    /// 58mm roll (portable Bluetooth printers)
    Mm58,
    /// 80mm roll (counter printers)
    #[default]
    Mm80,
}

impl PaperWidth {
    /// Character columns at the printer's default font.
    #[inline]
    pub const fn line_width(self) -> usize {
        match self {
            PaperWidth::Mm58 => 32,
            PaperWidth::Mm80 => 42,
        }
    }

    /// Printable width in dots.
    #[inline]
    pub const fn pixel_width(self) -> u32 {
        match self {
            PaperWidth::Mm58 => 384,
            PaperWidth::Mm80 => 576,
        }
    }

    /// Paper width in millimetres.
    #[inline]
    pub const fn mm(self) -> u32 {
        match self {
            PaperWidth::Mm58 => 58,
            PaperWidth::Mm80 => 80,
        }
    }

    /// Look up a paper width by its size in millimetres.
    pub fn from_mm(mm: u32) -> Result<Self, ReceiptError> {
        match mm {
            58 => Ok(PaperWidth::Mm58),
            80 => Ok(PaperWidth::Mm80),
            other => Err(ReceiptError::UnsupportedPaperWidth(format!("{}mm", other))),
        }
    }
}

impl fmt::Display for PaperWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}mm", self.mm())
    }
}

impl FromStr for PaperWidth {
    type Err = ReceiptError;

    /// Accepts `"58mm"`, `"80mm"`, `"58"` or `"80"` (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_ascii_lowercase();
        let digits = trimmed.strip_suffix("mm").unwrap_or(&trimmed);
        match digits.parse::<u32>() {
            Ok(mm) => Self::from_mm(mm),
            Err(_) => Err(ReceiptError::UnsupportedPaperWidth(s.to_string())),
        }
    }
}

impl TryFrom<String> for PaperWidth {
    type Error = ReceiptError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PaperWidth> for String {
    fn from(value: PaperWidth) -> Self {
        value.to_string()
    }
}

/// User-facing print preferences, as stored by the settings screen.
///
/// `font_size` and `container_padding` drive the browser print layout and
/// are carried through untouched; the byte encoders only read the paper
/// width and the two spacing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrintPreferences {
    pub paper_width: PaperWidth,
    pub font_size: u8,
    pub container_padding: u8,
    pub line_spacing: f32,
    pub item_spacing: u8,
}

impl Default for PrintPreferences {
    fn default() -> Self {
        Self {
            paper_width: PaperWidth::Mm80,
            font_size: 12,
            container_padding: 8,
            line_spacing: 1.0,
            item_spacing: 1,
        }
    }
}

/// Resolved layout parameters for a single encode call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncoderSettings {
    pub paper_width: PaperWidth,
    /// Character columns (32 or 42)
    pub line_width: usize,
    /// Raster line pitch multiplier
    pub line_spacing: f32,
    /// Blank feed lines (text) or spacing units (raster) between items
    pub item_spacing: u8,
}

impl EncoderSettings {
    /// Resolve printer-facing settings from user preferences.
    pub fn resolve(prefs: &PrintPreferences) -> Self {
        Self {
            paper_width: prefs.paper_width,
            line_width: prefs.paper_width.line_width(),
            line_spacing: prefs.line_spacing,
            item_spacing: prefs.item_spacing,
        }
    }

    /// Settings for a paper width with default spacing.
    pub fn for_paper(paper_width: PaperWidth) -> Self {
        Self::resolve(&PrintPreferences {
            paper_width,
            ..Default::default()
        })
    }

    /// Raster width in dots for the configured paper.
    #[inline]
    pub fn pixel_width(&self) -> u32 {
        self.paper_width.pixel_width()
    }
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self::for_paper(PaperWidth::default())
    }
}

/// Contents of a preferences file: print preferences at the top level,
/// link pacing under `transport`.
///
/// ```json
/// {
///   "paperWidth": "58mm",
///   "itemSpacing": 2,
///   "transport": { "chunkSize": 128 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    #[serde(flatten)]
    pub print: PrintPreferences,
    pub transport: Pacing,
}

impl Preferences {
    /// Load from a JSON file. Missing keys take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ReceiptError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

// ============================================================================
// TESTS
// ============================================================================
