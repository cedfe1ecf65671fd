use crate::color::Color;
use anyhow::{anyhow, Result};

/// Straight (non-premultiplied) RGBA8 pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Intersect with `[0, width) x [0, height)`.
    pub fn clamp(self, width: u32, height: u32) -> Option<Self> {
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = self.x.saturating_add(self.width).min(width as i32);
        let y1 = self.y.saturating_add(self.height).min(height as i32);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }

    pub fn union(self, other: Self) -> Self {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self
            .x
            .saturating_add(self.width)
            .max(other.x.saturating_add(other.width));
        let y1 = self
            .y
            .saturating_add(self.height)
            .max(other.y.saturating_add(other.height));
        Self::new(x0, y0, x1 - x0, y1 - y0)
    }
}

impl PixelBuffer {
    /// Fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Color::TRANSPARENT)
    }

    pub fn filled(width: u32, height: u32, fill: Color) -> Self {
        let len = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        let mut pixels = vec![0u8; len];
        if fill != Color::TRANSPARENT {
            for chunk in pixels.chunks_exact_mut(4) {
                chunk.copy_from_slice(&fill.to_rgba_array());
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        if pixels.len() != expected {
            return Err(anyhow!(
                "pixel data for {width}x{height} must be {expected} bytes, got {}",
                pixels.len()
            ));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.pixels
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 4)
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        let idx = self.index(x, y)?;
        let px = &self.pixels[idx..idx + 4];
        Some(Color::rgba(px[0], px[1], px[2], px[3]))
    }

    /// Out-of-bounds writes are dropped.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(idx) = self.index(x, y) {
            self.pixels[idx..idx + 4].copy_from_slice(&color.to_rgba_array());
        }
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some(rect) = rect.clamp(self.width, self.height) else {
            return;
        };
        let rgba = color.to_rgba_array();
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                let idx = (y as usize * self.width as usize + x as usize) * 4;
                self.pixels[idx..idx + 4].copy_from_slice(&rgba);
            }
        }
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Source-replace copy of `src_rect` from `src` to `(x, y)`, clipped on
    /// both sides.
    pub fn blit_region(&mut self, src: &PixelBuffer, src_rect: Rect, x: i32, y: i32) {
        let Some(src_rect) = src_rect.clamp(src.width, src.height) else {
            return;
        };
        // shift the destination to follow any clipping of the source rect
        let dst = Rect::new(x, y, src_rect.width, src_rect.height);
        let Some(visible) = dst.clamp(self.width, self.height) else {
            return;
        };
        let dx = visible.x - x;
        let dy = visible.y - y;
        let row_bytes = visible.width as usize * 4;
        for row in 0..visible.height {
            let sy = src_rect.y + dy + row;
            let sx = src_rect.x + dx;
            let s = (sy as usize * src.width as usize + sx as usize) * 4;
            let d = ((visible.y + row) as usize * self.width as usize + visible.x as usize) * 4;
            self.pixels[d..d + row_bytes].copy_from_slice(&src.pixels[s..s + row_bytes]);
        }
    }

    pub fn blit(&mut self, src: &PixelBuffer, x: i32, y: i32) {
        let whole = Rect::new(0, 0, src.width as i32, src.height as i32);
        self.blit_region(src, whole, x, y);
    }

    /// Copy of `rect` (clipped to bounds; empty buffer when fully outside).
    pub fn region(&self, rect: Rect) -> PixelBuffer {
        let Some(rect) = rect.clamp(self.width, self.height) else {
            return PixelBuffer::new(0, 0);
        };
        let mut out = PixelBuffer::new(rect.width as u32, rect.height as u32);
        out.blit_region(self, rect, 0, 0);
        out
    }

    /// Source-over blend of `color` at `coverage` (0..=255) onto one pixel.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Color, coverage: u8) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        if coverage == 0 || color.a == 0 {
            return;
        }
        let sa = (color.a as f32 / 255.0) * (coverage as f32 / 255.0);
        let dst = &mut self.pixels[idx..idx + 4];
        let da = dst[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= f32::EPSILON {
            dst.fill(0);
            return;
        }
        let blend = |s: u8, d: u8| -> u8 {
            (((s as f32 * sa) + (d as f32 * da * (1.0 - sa))) / out_a)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        dst[0] = blend(color.r, dst[0]);
        dst[1] = blend(color.g, dst[1]);
        dst[2] = blend(color.b, dst[2]);
        dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }
}
