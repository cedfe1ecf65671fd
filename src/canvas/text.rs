use crate::canvas::Canvas;
use crate::color::Color;
use anyhow::Result;

/// Single-channel coverage mask for one line of text.
///
/// Row 0 is the top of the line box, so the baseline sits `ascent` rows
/// below wherever the bitmap is placed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextBitmap {
    pub width: u32,
    pub height: u32,
    pub ascent: i32,
    pub coverage: Vec<u8>,
}

impl TextBitmap {
    pub fn coverage_at(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.coverage[(y * self.width + x) as usize]
    }
}

pub trait GlyphRasterizer: Send + Sync {
    fn rasterize(&self, text: &str, size: f32) -> Result<TextBitmap>;
}

impl Canvas {
    /// Blend `text` onto the current layer in `color`.
    ///
    /// The line box starts at `(x, y)` and the baseline lands on
    /// `y + ascent`. Existing pixels show through wherever the glyph
    /// coverage is partial; no background is painted.
    pub fn draw_text(
        &mut self,
        rasterizer: &dyn GlyphRasterizer,
        x: i32,
        y: i32,
        size: f32,
        text: &str,
        color: Color,
    ) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        let bitmap = rasterizer.rasterize(text, size)?;
        self.draw_text_bitmap(&bitmap, x, y, color);
        Ok(())
    }

    pub fn draw_text_bitmap(&mut self, bitmap: &TextBitmap, x: i32, y: i32, color: Color) {
        let target = self.target();
        for row in 0..bitmap.height {
            for col in 0..bitmap.width {
                let coverage = bitmap.coverage_at(col, row);
                if coverage > 0 {
                    target.blend_pixel(
                        x.saturating_add(col as i32),
                        y.saturating_add(row as i32),
                        color,
                        coverage,
                    );
                }
            }
        }
    }
}
