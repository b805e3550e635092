use std::convert::Infallible;

use crate::graphics::CpuRenderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn rgba_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }
}

/// A resizable RGBA surface.
///
/// Rendering writes pixels into `frame_mut()`; presentation shows them somewhere (a window, or
/// nowhere at all for headless runs and tests).
pub trait Surface {
    type Error;

    fn size(&self) -> SurfaceSize;
    fn frame_mut(&mut self) -> &mut [u8];

    fn resize(&mut self, size: SurfaceSize) -> Result<(), Self::Error>;
    fn present(&mut self) -> Result<(), Self::Error>;
}

/// A simple in-memory RGBA surface for headless execution and tests.
#[derive(Debug, Clone)]
pub struct RgbaBufferSurface {
    size: SurfaceSize,
    buf: Vec<u8>,
}

impl RgbaBufferSurface {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            buf: vec![0u8; size.rgba_len()],
        }
    }

    pub fn frame(&self) -> &[u8] {
        &self.buf
    }

    pub fn renderer(&mut self) -> CpuRenderer<'_> {
        CpuRenderer::new(&mut self.buf, self.size)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let i = (y as usize * self.size.width as usize + x as usize) * 4;
        let px = self.buf.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

impl Surface for RgbaBufferSurface {
    type Error = Infallible;

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn frame_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    fn resize(&mut self, size: SurfaceSize) -> Result<(), Self::Error> {
        self.size = size;
        self.buf.resize(size.rgba_len(), 0u8);
        Ok(())
    }

    fn present(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::Renderer2d;
    use crate::ui::Rect;

    #[test]
    fn buffer_surface_resizes_backing_store() {
        let mut s = RgbaBufferSurface::new(SurfaceSize::new(2, 2));
        assert_eq!(s.frame().len(), 16);
        s.resize(SurfaceSize::new(3, 1)).unwrap();
        assert_eq!(s.frame().len(), 12);
        assert_eq!(s.size(), SurfaceSize::new(3, 1));
    }

    #[test]
    fn renderer_draws_into_surface() {
        let mut s = RgbaBufferSurface::new(SurfaceSize::new(4, 4));
        s.renderer().fill_rect(Rect::new(1, 1, 1, 1), [9, 8, 7, 255]);
        assert_eq!(s.pixel(1, 1), Some([9, 8, 7, 255]));
        assert_eq!(s.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(s.pixel(4, 0), None);
    }
}
