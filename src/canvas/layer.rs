use crate::canvas::buffer::PixelBuffer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pixels: PixelBuffer,
    visible: bool,
}

impl Layer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: PixelBuffer::new(width, height),
            visible: true,
        }
    }

    pub fn from_pixels(pixels: PixelBuffer) -> Self {
        Self {
            pixels,
            visible: true,
        }
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut PixelBuffer {
        &mut self.pixels
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Swap in a fresh transparent buffer of the same size.
    pub fn clear(&mut self) {
        let (w, h) = self.pixels.size();
        self.pixels = PixelBuffer::new(w, h);
    }
}
