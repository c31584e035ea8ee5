//! A CPU raster surface. Pixels are premultiplied RGBA8.

use inkleaf_core::color::SerializableColor;
use tiny_skia::Pixmap;

use crate::error::{RenderError, RenderResult};

pub struct Surface {
    pixmap: Pixmap,
}

impl Surface {
    /// Allocate a transparent surface.
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        let pixmap =
            Pixmap::new(width, height).ok_or(RenderError::InvalidDimensions { width, height })?;
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Fill the whole surface with an opaque (or translucent) color.
    pub fn clear(&mut self, color: SerializableColor) {
        self.pixmap.fill(crate::painter::skia_color(color));
    }

    /// Reset the surface to fully transparent.
    pub fn clear_transparent(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    /// Whether any pixel has nonzero alpha.
    pub fn has_content(&self) -> bool {
        self.pixmap.pixels().iter().any(|p| p.alpha() != 0)
    }

    /// Straight (demultiplied) RGBA bytes, for encoders that expect
    /// non-premultiplied data.
    pub fn rgba_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixmap.pixels().len() * 4);
        for pixel in self.pixmap.pixels() {
            let c = pixel.demultiply();
            bytes.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(
            Surface::new(0, 10),
            Err(RenderError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_new_surface_is_transparent() {
        let surface = Surface::new(4, 4).unwrap();
        assert!(!surface.has_content());
    }

    #[test]
    fn test_clear_fills_every_pixel() {
        let mut surface = Surface::new(2, 2).unwrap();
        surface.clear(SerializableColor::opaque(10, 20, 30));
        assert!(surface.has_content());
        let bytes = surface.rgba_bytes();
        assert_eq!(&bytes[..4], &[10, 20, 30, 255]);
        assert_eq!(bytes.len(), 16);
    }
}
