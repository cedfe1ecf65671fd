use crate::canvas::{Canvas, PixelBuffer};

impl Canvas {
    /// Flatten the visible layers into one frame.
    ///
    /// Layers are applied bottom to top. Any pixel with non-zero alpha
    /// replaces whatever lies below it, while fully transparent pixels let
    /// the lower layers show through. Translucency was already resolved when
    /// the pixel was drawn, so no blending happens here.
    pub fn composite(&self) -> PixelBuffer {
        let mut out = vec![0u8; self.width() as usize * self.height() as usize * 4];
        for layer in self.layers().iter().filter(|layer| layer.is_visible()) {
            let src = layer.pixels().as_bytes();
            for (dst, px) in out.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
                if px[3] != 0 {
                    dst.copy_from_slice(px);
                }
            }
        }
        // every layer shares the canvas dimensions, so the length always matches
        PixelBuffer::from_pixels(self.width(), self.height(), out)
            .unwrap_or_else(|_| PixelBuffer::new(self.width(), self.height()))
    }
}
