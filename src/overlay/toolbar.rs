use crate::canvas::{PixelBuffer, Rect};
use crate::color::Color;
use crate::overlay::icons::{swatch_icon, tool_icon, ToolIcon};

pub const BUTTON_SIZE: i32 = 32;
pub const TOOLBAR_TOP: i32 = 64;

pub const PALETTE: [Color; 18] = [
    Color::rgba(0x00, 0x00, 0x00, 0xFF),
    Color::rgba(0xFF, 0x00, 0x00, 0xFF),
    Color::rgba(0x00, 0xFF, 0x00, 0xFF),
    Color::rgba(0xFF, 0xFF, 0x00, 0xFF),
    Color::rgba(0x00, 0x00, 0xFF, 0xFF),
    Color::rgba(0xFF, 0x00, 0xFF, 0xFF),
    Color::rgba(0x00, 0xFF, 0xFF, 0xFF),
    Color::rgba(0xFF, 0xFF, 0xFF, 0xFF),
    Color::rgba(0x80, 0x80, 0x80, 0xFF),
    Color::rgba(0xC0, 0xC0, 0xC0, 0xFF),
    Color::rgba(0x40, 0x40, 0x40, 0xFF),
    Color::rgba(0xFF, 0x80, 0x80, 0xFF),
    Color::rgba(0x80, 0xFF, 0x80, 0xFF),
    Color::rgba(0xFF, 0xFF, 0x80, 0xFF),
    Color::rgba(0x80, 0x80, 0xFF, 0xFF),
    Color::rgba(0xFF, 0x80, 0xFF, 0xFF),
    Color::rgba(0x80, 0xFF, 0xFF, 0xFF),
    Color::TRANSPARENT,
];

pub const DEFAULT_PAINT_COLOR: Color = Color::RED;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Close,
    Eraser,
    Draw,
    Color(Color),
}

/// Button geometry. Containment includes the right and bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl HitRect {
    pub fn contains(self, point: (i32, i32)) -> bool {
        point.0 >= self.x
            && point.0 <= self.x + self.w
            && point.1 >= self.y
            && point.1 <= self.y + self.h
    }

    /// Pixel footprint of the rectangle.
    pub fn area(self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }
}

#[derive(Debug, Clone)]
pub struct Button {
    pub rect: HitRect,
    pub action: ButtonAction,
    pub icon: PixelBuffer,
}

/// Fixed column of tool buttons followed by one swatch per palette color.
#[derive(Debug, Clone)]
pub struct Toolbar {
    buttons: Vec<Button>,
}

impl Toolbar {
    pub fn new(palette: &[Color]) -> Self {
        let tools = [
            (ButtonAction::Close, ToolIcon::Close),
            (ButtonAction::Eraser, ToolIcon::Eraser),
            (ButtonAction::Draw, ToolIcon::Draw),
        ];
        let tool_buttons = tools.into_iter().map(|(action, icon)| (action, tool_icon(icon)));
        let swatches = palette
            .iter()
            .map(|color| (ButtonAction::Color(*color), swatch_icon(*color)));

        let buttons = tool_buttons
            .chain(swatches)
            .enumerate()
            .map(|(idx, (action, icon))| Button {
                rect: HitRect {
                    x: 0,
                    y: TOOLBAR_TOP + idx as i32 * BUTTON_SIZE,
                    w: BUTTON_SIZE,
                    h: BUTTON_SIZE,
                },
                action,
                icon,
            })
            .collect();
        Self { buttons }
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    /// First button in registration order whose rectangle holds `point`.
    pub fn hit_test(&self, point: (i32, i32)) -> Option<&Button> {
        self.buttons.iter().find(|button| button.rect.contains(point))
    }

    /// Smallest rectangle covering every button icon.
    pub fn bounds(&self) -> Rect {
        self.buttons
            .iter()
            .fold(Rect::new(0, 0, 0, 0), |acc, button| acc.union(button.rect.area()))
    }
}

impl Default for Toolbar {
    fn default() -> Self {
        Self::new(&PALETTE)
    }
}
