//! Interactive tool palette drawn over the canvas.
//!
//! The overlay is driven one frame at a time by the presenter. It owns the
//! pointer mode, the selected paint color and the pixels hidden beneath the
//! tool buttons while they are shown.

pub mod icons;
pub mod input;
pub mod state;
pub mod toolbar;

pub use input::{InputFrame, PointerTracker, Segment};
pub use state::PointerMode;
pub use toolbar::{Button, ButtonAction, HitRect, Toolbar, DEFAULT_PAINT_COLOR, PALETTE};

use crate::canvas::{Canvas, PixelBuffer};
use crate::color::Color;

pub const PAINT_THICKNESS: i32 = 3;
pub const ERASE_RADIUS: i32 = 10;
/// Pointer positions with both coordinates below this reveal the tools.
pub const HOT_CORNER: i32 = 10;

/// Pixels covered by the tool buttons, captured when they were shown.
#[derive(Debug, Clone)]
struct ToolSnapshot {
    layer: usize,
    origin: (i32, i32),
    pixels: PixelBuffer,
}

#[derive(Debug)]
pub struct Overlay {
    toolbar: Toolbar,
    mode: PointerMode,
    paint_color: Color,
    snapshot: Option<ToolSnapshot>,
    tracker: PointerTracker,
    passthrough: bool,
}

impl Overlay {
    pub fn new(passthrough: bool) -> Self {
        Self::with_toolbar(Toolbar::default(), passthrough)
    }

    pub fn with_toolbar(toolbar: Toolbar, passthrough: bool) -> Self {
        Self {
            toolbar,
            mode: PointerMode::Idle,
            paint_color: DEFAULT_PAINT_COLOR,
            snapshot: None,
            tracker: PointerTracker::default(),
            passthrough,
        }
    }

    pub fn mode(&self) -> PointerMode {
        self.mode
    }

    pub fn paint_color(&self) -> Color {
        self.paint_color
    }

    pub fn tools_visible(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn passthrough(&self) -> bool {
        self.passthrough
    }

    pub fn toolbar(&self) -> &Toolbar {
        &self.toolbar
    }

    /// Advance one frame. Returns the new mouse passthrough setting when it
    /// changed during this tick.
    pub fn tick(&mut self, canvas: &mut Canvas, input: &InputFrame) -> Option<bool> {
        let before = self.passthrough;
        self.step(canvas, input);
        (self.passthrough != before).then_some(self.passthrough)
    }

    fn step(&mut self, canvas: &mut Canvas, input: &InputFrame) {
        if input.escape {
            self.hide_tools(canvas);
            self.mode = PointerMode::Idle;
            self.passthrough = true;
            return;
        }

        let Some(point) = input.pointer else {
            self.tracker.reset();
            return;
        };
        let segment = self.tracker.advance(point);
        let over_button = self.tools_visible() && self.toolbar.hit_test(point).is_some();

        if input.primary_pressed
            && self.mode == PointerMode::Idle
            && self.tools_visible()
            && !over_button
        {
            self.hide_tools(canvas);
            self.passthrough = true;
        } else if input.primary_down && !over_button {
            self.paint(canvas, segment);
        }

        if input.primary_released && self.tools_visible() {
            if let Some(action) = self.toolbar.hit_test(point).map(|button| button.action) {
                self.click(canvas, action, input.ctrl);
            }
        }

        if point.0 < HOT_CORNER && point.1 < HOT_CORNER {
            self.mode = PointerMode::Idle;
            self.passthrough = false;
            self.show_tools(canvas);
        }
    }

    fn paint(&mut self, canvas: &mut Canvas, segment: Segment) {
        match self.mode {
            PointerMode::Paint => canvas.draw_line(
                segment.from.0,
                segment.from.1,
                segment.to.0,
                segment.to.1,
                PAINT_THICKNESS,
                self.paint_color,
            ),
            PointerMode::Erase => canvas.draw_circle(
                segment.to.0,
                segment.to.1,
                ERASE_RADIUS,
                0,
                true,
                Color::TRANSPARENT,
            ),
            PointerMode::Idle => {}
        }
    }

    fn click(&mut self, canvas: &mut Canvas, action: ButtonAction, ctrl: bool) {
        tracing::debug!(?action, "overlay button clicked");
        match action {
            ButtonAction::Close => {
                self.hide_tools(canvas);
                self.mode = PointerMode::Idle;
                self.passthrough = true;
            }
            ButtonAction::Eraser => {
                self.mode = self.mode.toggled(PointerMode::Erase);
                self.hide_tools(canvas);
                if self.mode == PointerMode::Erase && ctrl {
                    canvas.clear();
                    self.mode = PointerMode::Idle;
                }
                self.passthrough = self.mode.wants_passthrough();
            }
            ButtonAction::Draw => {
                self.mode = self.mode.toggled(PointerMode::Paint);
                self.hide_tools(canvas);
                self.passthrough = self.mode.wants_passthrough();
            }
            ButtonAction::Color(color) => {
                self.paint_color = color;
                if self.mode != PointerMode::Paint {
                    self.mode = PointerMode::Paint;
                    self.hide_tools(canvas);
                    self.passthrough = false;
                }
            }
        }
    }

    /// Capture what the buttons will cover, then draw them. Showing twice
    /// keeps the first capture.
    pub fn show_tools(&mut self, canvas: &mut Canvas) {
        if self.snapshot.is_some() {
            return;
        }
        let (width, height) = canvas.size();
        let origin = self
            .toolbar
            .bounds()
            .clamp(width, height)
            .map_or((0, 0), |rect| (rect.x, rect.y));
        self.snapshot = Some(ToolSnapshot {
            layer: canvas.current_layer(),
            origin,
            pixels: canvas.snapshot_region(self.toolbar.bounds()),
        });
        for button in self.toolbar.buttons() {
            canvas.blit_image(&button.icon, button.rect.x, button.rect.y);
        }
    }

    /// Put back the pixels captured by the matching [`Overlay::show_tools`].
    pub fn hide_tools(&mut self, canvas: &mut Canvas) {
        let Some(snapshot) = self.snapshot.take() else {
            return;
        };
        if snapshot.layer >= canvas.layer_count() {
            tracing::debug!(layer = snapshot.layer, "tool snapshot layer is gone");
            return;
        }
        let current = canvas.current_layer();
        canvas.select_layer(snapshot.layer);
        canvas.restore_region(&snapshot.pixels, snapshot.origin.0, snapshot.origin.1);
        canvas.select_layer(current);
    }
}
