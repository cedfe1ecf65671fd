use crate::canvas::{PixelBuffer, Rect};
use crate::color::Color;
use crate::overlay::toolbar::BUTTON_SIZE;
use once_cell::sync::Lazy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolIcon {
    Close,
    Eraser,
    Draw,
}

const GLYPH_SCALE: i32 = 3;
const BUTTON_FILL: Color = Color::rgba(0x30, 0x30, 0x30, 0xE0);
const BUTTON_BORDER: Color = Color::rgba(0xC0, 0xC0, 0xC0, 0xFF);
const GLYPH_COLOR: Color = Color::WHITE;
const CHECKER_DARK: Color = Color::rgba(0x80, 0x80, 0x80, 0xFF);
const CHECKER_LIGHT: Color = Color::rgba(0xC0, 0xC0, 0xC0, 0xFF);

static TOOL_ICONS: Lazy<[PixelBuffer; 3]> = Lazy::new(|| {
    [
        render_glyph(icon_bitmap(ToolIcon::Close)),
        render_glyph(icon_bitmap(ToolIcon::Eraser)),
        render_glyph(icon_bitmap(ToolIcon::Draw)),
    ]
});

pub fn icon_bitmap(icon: ToolIcon) -> &'static [&'static str] {
    match icon {
        ToolIcon::Close => &[
            "1000001", "0100010", "0010100", "0001000", "0010100", "0100010", "1000001",
        ],
        ToolIcon::Eraser => &[
            "0001100", "0011110", "0111111", "1111110", "1111100", "0111000", "0010000",
        ],
        ToolIcon::Draw => &[
            "0000011", "0000111", "0001110", "0011100", "0111000", "1110000", "1100000",
        ],
    }
}

pub fn tool_icon(icon: ToolIcon) -> PixelBuffer {
    let idx = match icon {
        ToolIcon::Close => 0,
        ToolIcon::Eraser => 1,
        ToolIcon::Draw => 2,
    };
    TOOL_ICONS[idx].clone()
}

/// Solid swatch. Fully transparent colors get a checkerboard so the button
/// stays visible.
pub fn swatch_icon(color: Color) -> PixelBuffer {
    let size = BUTTON_SIZE as u32;
    let mut icon = PixelBuffer::filled(size, size, color);
    if color.is_transparent() {
        let cell = BUTTON_SIZE / 4;
        for row in 0..4 {
            for col in 0..4 {
                let fill = if (row + col) % 2 == 0 {
                    CHECKER_DARK
                } else {
                    CHECKER_LIGHT
                };
                icon.fill_rect(Rect::new(col * cell, row * cell, cell, cell), fill);
            }
        }
    }
    outline(&mut icon);
    icon
}

fn render_glyph(rows: &[&str]) -> PixelBuffer {
    let size = BUTTON_SIZE as u32;
    let mut icon = PixelBuffer::filled(size, size, BUTTON_FILL);
    let glyph_h = rows.len() as i32 * GLYPH_SCALE;
    let glyph_w = rows.first().map_or(0, |row| row.len() as i32) * GLYPH_SCALE;
    let origin_x = (BUTTON_SIZE - glyph_w) / 2;
    let origin_y = (BUTTON_SIZE - glyph_h) / 2;

    for (y, row) in rows.iter().enumerate() {
        for (x, bit) in row.bytes().enumerate() {
            if bit == b'1' {
                icon.fill_rect(
                    Rect::new(
                        origin_x + x as i32 * GLYPH_SCALE,
                        origin_y + y as i32 * GLYPH_SCALE,
                        GLYPH_SCALE,
                        GLYPH_SCALE,
                    ),
                    GLYPH_COLOR,
                );
            }
        }
    }
    outline(&mut icon);
    icon
}

fn outline(icon: &mut PixelBuffer) {
    let (w, h) = (icon.width() as i32, icon.height() as i32);
    icon.fill_rect(Rect::new(0, 0, w, 1), BUTTON_BORDER);
    icon.fill_rect(Rect::new(0, h - 1, w, 1), BUTTON_BORDER);
    icon.fill_rect(Rect::new(0, 0, 1, h), BUTTON_BORDER);
    icon.fill_rect(Rect::new(w - 1, 0, 1, h), BUTTON_BORDER);
}
