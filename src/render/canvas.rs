//! Off-screen drawing surface for the raster path.

use image::{Rgb, RgbImage};

use super::font::GlyphRun;

/// White RGB surface that text runs are composited onto.
pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    /// Allocate a `width × height` surface filled white.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, Rgb([255, 255, 255])),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Composite a run with its top-left corner at (x, y).
    ///
    /// Anything outside the surface is clipped. Coverage darkens: ink never
    /// lightens a pixel already drawn.
    pub fn draw_run(&mut self, run: &GlyphRun, x: i64, y: i64) {
        let (width, height) = (self.image.width() as i64, self.image.height() as i64);

        for ry in 0..run.height {
            let py = y + ry as i64;
            if py < 0 || py >= height {
                continue;
            }
            for rx in 0..run.width {
                let px = x + rx as i64;
                if px < 0 || px >= width {
                    continue;
                }
                let coverage = run.get(rx, ry);
                if coverage <= 0.0 {
                    continue;
                }
                let value = (255.0 * (1.0 - coverage.min(1.0))).round() as u8;
                let pixel = self.image.get_pixel_mut(px as u32, py as u32);
                for channel in pixel.0.iter_mut() {
                    *channel = (*channel).min(value);
                }
            }
        }
    }

    pub fn as_image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }
}

// ============================================================================
// TESTS
// ============================================================================
