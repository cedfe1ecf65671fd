//! Image decoding and glyph rasterization.

use crate::canvas::{GlyphRasterizer, PixelBuffer, TextBitmap};
use anyhow::{anyhow, bail, Context, Result};
use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};
use fontdue::{Font, FontSettings};
use std::path::{Path, PathBuf};

/// Fonts tried in order when no font is configured.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Decode PNG or JPEG bytes into straight RGBA pixels.
pub fn decode_image(bytes: &[u8]) -> Result<PixelBuffer> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| anyhow!("failed to decode image: {e}"))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    PixelBuffer::from_pixels(width, height, image.into_raw())
}

pub fn load_image(path: &Path) -> Result<PixelBuffer> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read image {}", path.display()))?;
    decode_image(&bytes).with_context(|| format!("failed to load image {}", path.display()))
}

pub struct FontdueRasterizer {
    font: Font,
}

impl FontdueRasterizer {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| anyhow!("failed to parse font: {e}"))?;
        Ok(Self { font })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("failed to read font {}", path.display()))?;
        Self::from_bytes(bytes).with_context(|| format!("invalid font {}", path.display()))
    }

    /// Load `configured` when given, otherwise the first system font found.
    pub fn discover(configured: Option<&Path>) -> Result<Self> {
        if let Some(path) = configured {
            return Self::from_path(path);
        }
        match SYSTEM_FONT_CANDIDATES
            .iter()
            .map(PathBuf::from)
            .find(|candidate| candidate.is_file())
        {
            Some(path) => Self::from_path(&path),
            None => bail!("no font configured and no system font found"),
        }
    }
}

impl GlyphRasterizer for FontdueRasterizer {
    fn rasterize(&self, text: &str, size: f32) -> Result<TextBitmap> {
        if !size.is_finite() || size <= 0.0 {
            bail!("font size must be positive, got {size}");
        }
        let ascent = self
            .font
            .horizontal_line_metrics(size)
            .map(|metrics| metrics.ascent.ceil() as i32)
            .unwrap_or_else(|| size.ceil() as i32);

        let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings {
            x: 0.0,
            y: 0.0,
            max_width: None,
            max_height: None,
            horizontal_align: fontdue::layout::HorizontalAlign::Left,
            vertical_align: fontdue::layout::VerticalAlign::Top,
            line_height: 1.0,
            wrap_style: fontdue::layout::WrapStyle::Letter,
            wrap_hard_breaks: true,
        });
        layout.append(&[&self.font], &TextStyle::new(text, size, 0));

        let glyphs = layout.glyphs();
        let width = glyphs
            .iter()
            .map(|g| (g.x.round() as i32 + g.width as i32).max(0))
            .max()
            .unwrap_or(0) as u32;
        let height = layout.height().ceil().max(0.0) as u32;
        let mut coverage = vec![0u8; width as usize * height as usize];

        for glyph in glyphs {
            if glyph.width == 0 || glyph.height == 0 {
                continue;
            }
            let (_, bitmap) = self.font.rasterize_config(glyph.key);
            let (gx, gy) = (glyph.x.round() as i32, glyph.y.round() as i32);
            for row in 0..glyph.height {
                for col in 0..glyph.width {
                    let (x, y) = (gx + col as i32, gy + row as i32);
                    if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
                        continue;
                    }
                    let idx = y as usize * width as usize + x as usize;
                    coverage[idx] = coverage[idx].max(bitmap[row * glyph.width + col]);
                }
            }
        }

        Ok(TextBitmap {
            width,
            height,
            ascent,
            coverage,
        })
    }
}
