//! Layered raster canvas.
//!
//! A [`Canvas`] owns a stack of equally sized [`Layer`]s. Index 0 is the
//! bottom of the stack. Every drawing primitive targets the current layer;
//! writes outside the canvas are clipped silently, never reported.

pub mod buffer;
pub mod composite;
pub mod draw;
pub mod layer;
pub mod shared;
pub mod text;

pub use buffer::{PixelBuffer, Rect};
pub use layer::Layer;
pub use shared::SharedCanvas;
pub use text::{GlyphRasterizer, TextBitmap};

use crate::color::Color;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanvasError {
    InvalidGridSpacing { horizontal: i32, vertical: i32 },
    InvalidSize { width: u32, height: u32 },
}

impl std::fmt::Display for CanvasError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidGridSpacing {
                horizontal,
                vertical,
            } => write!(
                f,
                "grid spacing must be positive (horizontal {horizontal}, vertical {vertical})"
            ),
            Self::InvalidSize { width, height } => {
                write!(f, "canvas size must be non-zero, got {width}x{height}")
            }
        }
    }
}

impl std::error::Error for CanvasError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    layers: Vec<Layer>,
    current: usize,
}

impl Canvas {
    /// Canvas with a single transparent layer.
    pub fn new(width: u32, height: u32) -> Result<Self, CanvasError> {
        Self::with_background(width, height, Color::TRANSPARENT)
    }

    /// Canvas whose bottom layer starts filled with `background`.
    pub fn with_background(
        width: u32,
        height: u32,
        background: Color,
    ) -> Result<Self, CanvasError> {
        if width == 0 || height == 0 {
            return Err(CanvasError::InvalidSize { width, height });
        }
        let base = Layer::from_pixels(PixelBuffer::filled(width, height, background));
        Ok(Self {
            width,
            height,
            layers: vec![base],
            current: 0,
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

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn current_layer(&self) -> usize {
        self.current
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub(crate) fn target(&mut self) -> &mut PixelBuffer {
        self.layers[self.current].pixels_mut()
    }

    pub fn current_pixels(&self) -> &PixelBuffer {
        self.layers[self.current].pixels()
    }

    /// Append a transparent, visible layer on top and return its index.
    /// The current layer is left unchanged.
    pub fn create_layer(&mut self) -> usize {
        self.layers.push(Layer::new(self.width, self.height));
        self.layers.len() - 1
    }

    /// Out-of-range indices are ignored.
    pub fn select_layer(&mut self, index: usize) {
        if index < self.layers.len() {
            self.current = index;
        }
    }

    /// Remove a layer, shifting the ones above it down by one.
    ///
    /// Out-of-range indices are ignored, as is removing the last remaining
    /// layer. The current layer keeps pointing at the same layer when it
    /// survives; if it was the removed one, the layer that slid into its
    /// slot (or the new top) becomes current.
    pub fn delete_layer(&mut self, index: usize) {
        if index >= self.layers.len() || self.layers.len() == 1 {
            return;
        }
        self.layers.remove(index);
        if index < self.current {
            self.current -= 1;
        }
        if self.current >= self.layers.len() {
            self.current = self.layers.len() - 1;
        }
    }

    /// Out-of-range indices are ignored.
    pub fn clear_layer(&mut self, index: usize) {
        if let Some(layer) = self.layers.get_mut(index) {
            layer.clear();
        }
    }

    pub fn clear(&mut self) {
        let current = self.current;
        self.clear_layer(current);
    }

    /// Out-of-range indices are ignored.
    pub fn set_layer_visible(&mut self, index: usize, visible: bool) {
        if let Some(layer) = self.layers.get_mut(index) {
            layer.set_visible(visible);
        }
    }
}
