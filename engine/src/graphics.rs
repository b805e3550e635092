use crate::{surface::SurfaceSize, ui::Rect};

pub type Color = [u8; 4];

// 3x5 block font.
const GLYPH_W: u32 = 3;
const GLYPH_H: u32 = 5;

fn glyph_advance_x(scale: u32) -> u32 {
    (GLYPH_W + 1) * scale.max(1)
}

fn line_advance_y(scale: u32) -> u32 {
    (GLYPH_H + 1) * scale.max(1)
}

/// Pixel width of a single line of `text` at `scale` (no trailing gap).
pub fn text_width(text: &str, scale: u32) -> u32 {
    let n = text.chars().count() as u32;
    if n == 0 {
        return 0;
    }
    glyph_advance_x(scale)
        .saturating_mul(n)
        .saturating_sub(scale.max(1))
}

pub fn text_height(scale: u32) -> u32 {
    GLYPH_H * scale.max(1)
}

/// Unified 2D rendering interface.
///
/// Game code only talks to this trait; shapes beyond rects are built from `fill_rect` spans so
/// every backend gets them for free.
pub trait Renderer2d {
    fn begin_frame(&mut self, size: SurfaceSize);
    fn size(&self) -> SurfaceSize;

    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Alpha-blended rect over existing content (alpha is applied to `color`'s RGB).
    fn blend_rect(&mut self, rect: Rect, color: Color, alpha: u8);

    fn draw_text_scaled(&mut self, x: u32, y: u32, text: &str, color: Color, scale: u32);

    fn fill_circle(&mut self, cx: u32, cy: u32, radius: u32, color: Color) {
        for (row, span) in circle_spans(cx, cy, radius) {
            self.fill_rect(Rect::new(span.0, row, span.1, 1), color);
        }
    }

    fn blend_circle(&mut self, cx: u32, cy: u32, radius: u32, color: Color, alpha: u8) {
        for (row, span) in circle_spans(cx, cy, radius) {
            self.blend_rect(Rect::new(span.0, row, span.1, 1), color, alpha);
        }
    }

    /// Draws `text` centred on `(cx, cy)`.
    fn draw_text_centered(&mut self, cx: u32, cy: u32, text: &str, color: Color, scale: u32) {
        let x = cx.saturating_sub(text_width(text, scale) / 2);
        let y = cy.saturating_sub(text_height(scale) / 2);
        self.draw_text_scaled(x, y, text, color, scale);
    }

    fn clear(&mut self, color: Color) {
        let s = self.size();
        self.fill_rect(Rect::from_size(s.width, s.height), color);
    }
}

/// Horizontal spans `(row, (x, width))` covering a filled circle, clipped at the top/left edge.
fn circle_spans(cx: u32, cy: u32, radius: u32) -> impl Iterator<Item = (u32, (u32, u32))> {
    let r = radius as i64;
    (-r..=r).filter_map(move |dy| {
        let row = cy as i64 + dy;
        if row < 0 {
            return None;
        }
        let half = ((r * r - dy * dy) as f64).sqrt().round() as i64;
        let x0 = (cx as i64 - half).max(0);
        let x1 = cx as i64 + half + 1;
        if x1 <= x0 {
            return None;
        }
        Some((row as u32, (x0 as u32, (x1 - x0) as u32)))
    })
}

/// CPU renderer that draws into an RGBA frame buffer.
pub struct CpuRenderer<'a> {
    frame: &'a mut [u8],
    size: SurfaceSize,
}

impl<'a> CpuRenderer<'a> {
    pub fn new(frame: &'a mut [u8], size: SurfaceSize) -> Self {
        Self { frame, size }
    }

    /// Byte range of the clipped rect rows, or `None` if nothing is visible.
    fn clipped_rows(&self, rect: Rect) -> Option<ClippedRows> {
        let width = self.size.width;
        let height = self.size.height;

        let max_x = rect.x.saturating_add(rect.w).min(width);
        let max_y = rect.y.saturating_add(rect.h).min(height);
        if rect.x >= max_x || rect.y >= max_y {
            return None;
        }
        if self.frame.len() < self.size.rgba_len() || self.size.is_empty() {
            return None;
        }

        let stride = width as usize * 4;
        Some(ClippedRows {
            first_row_start: rect.y as usize * stride + rect.x as usize * 4,
            row_bytes: (max_x - rect.x) as usize * 4,
            stride,
            rows: (max_y - rect.y) as usize,
        })
    }
}

struct ClippedRows {
    first_row_start: usize,
    row_bytes: usize,
    stride: usize,
    rows: usize,
}

impl Renderer2d for CpuRenderer<'_> {
    fn begin_frame(&mut self, size: SurfaceSize) {
        self.size = size;
    }

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some(clip) = self.clipped_rows(rect) else {
            return;
        };
        let mut row_start = clip.first_row_start;
        for _ in 0..clip.rows {
            let row = &mut self.frame[row_start..row_start + clip.row_bytes];
            for px in row.chunks_exact_mut(4) {
                px.copy_from_slice(&color);
            }
            row_start += clip.stride;
        }
    }

    fn blend_rect(&mut self, rect: Rect, color: Color, alpha: u8) {
        if alpha == 0 {
            return;
        }
        if alpha == 255 {
            self.fill_rect(rect, color);
            return;
        }
        let Some(clip) = self.clipped_rows(rect) else {
            return;
        };

        let a = alpha as u32;
        let inv = 255u32 - a;
        let mut row_start = clip.first_row_start;
        for _ in 0..clip.rows {
            let row = &mut self.frame[row_start..row_start + clip.row_bytes];
            for px in row.chunks_exact_mut(4) {
                for c in 0..3 {
                    px[c] = ((px[c] as u32 * inv + color[c] as u32 * a + 127) / 255) as u8;
                }
                px[3] = 255;
            }
            row_start += clip.stride;
        }
    }

    fn draw_text_scaled(&mut self, x: u32, y: u32, text: &str, color: Color, scale: u32) {
        let width = self.size.width;
        let height = self.size.height;
        let scale = scale.max(1);
        let adv_x = glyph_advance_x(scale);
        let adv_y = line_advance_y(scale);

        let mut cursor_x = x;
        let mut cursor_y = y;

        for ch in text.chars() {
            match ch {
                '\n' => {
                    cursor_x = x;
                    cursor_y = cursor_y.saturating_add(adv_y);
                    if cursor_y >= height {
                        break;
                    }
                    continue;
                }
                ' ' => {
                    cursor_x = cursor_x.saturating_add(adv_x);
                    continue;
                }
                _ => {}
            }
            if cursor_x >= width {
                continue;
            }

            for (row, bits) in glyph_rows(ch).into_iter().enumerate() {
                let py = cursor_y.saturating_add(row as u32 * scale);
                for col in 0..GLYPH_W {
                    let mask = 1u8 << (GLYPH_W - 1 - col);
                    if bits & mask == 0 {
                        continue;
                    }
                    let px = cursor_x.saturating_add(col * scale);
                    self.fill_rect(Rect::new(px, py, scale, scale), color);
                }
            }
            cursor_x = cursor_x.saturating_add(adv_x);
        }
    }
}

fn glyph_rows(ch: char) -> [u8; GLYPH_H as usize] {
    match ch.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],

        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b111, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b110, 0b100, 0b110, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b101, 0b111, 0b111, 0b111, 0b101],
        'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'R' => [0b111, 0b101, 0b111, 0b110, 0b101],
        'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],

        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],

        _ => [0b111, 0b001, 0b010, 0b000, 0b010], // '?'
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = [255, 0, 0, 255];

    fn pixel(frame: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * width + x) * 4) as usize;
        [frame[i], frame[i + 1], frame[i + 2], frame[i + 3]]
    }

    #[test]
    fn fill_rect_clips_to_surface() {
        let size = SurfaceSize::new(4, 4);
        let mut frame = vec![0u8; size.rgba_len()];
        let mut gfx = CpuRenderer::new(&mut frame, size);
        gfx.fill_rect(Rect::new(2, 2, 10, 10), RED);

        assert_eq!(pixel(&frame, 4, 3, 3), RED);
        assert_eq!(pixel(&frame, 4, 1, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn blend_rect_mixes_with_existing_pixels() {
        let size = SurfaceSize::new(1, 1);
        let mut frame = vec![0u8; size.rgba_len()];
        let mut gfx = CpuRenderer::new(&mut frame, size);
        gfx.blend_rect(Rect::new(0, 0, 1, 1), [255, 255, 255, 255], 128);
        assert_eq!(pixel(&frame, 1, 0, 0), [128, 128, 128, 255]);
    }

    #[test]
    fn fill_circle_covers_center_but_not_corners() {
        let size = SurfaceSize::new(21, 21);
        let mut frame = vec![0u8; size.rgba_len()];
        let mut gfx = CpuRenderer::new(&mut frame, size);
        gfx.fill_circle(10, 10, 8, RED);

        assert_eq!(pixel(&frame, 21, 10, 10), RED);
        assert_eq!(pixel(&frame, 21, 10, 2), RED);
        assert_eq!(pixel(&frame, 21, 3, 3), [0, 0, 0, 0]);
        assert_eq!(pixel(&frame, 21, 19, 19), [0, 0, 0, 0]);
    }

    #[test]
    fn text_width_matches_glyph_advance() {
        assert_eq!(text_width("", 2), 0);
        assert_eq!(text_width("B", 2), 6);
        assert_eq!(text_width("75", 2), 14);
        assert_eq!(text_height(3), 15);
    }

    #[test]
    fn draw_text_sets_glyph_pixels() {
        let size = SurfaceSize::new(8, 8);
        let mut frame = vec![0u8; size.rgba_len()];
        let mut gfx = CpuRenderer::new(&mut frame, size);
        // '1' has its top-middle bit set and top-left bit clear.
        gfx.draw_text_scaled(0, 0, "1", RED, 1);
        assert_eq!(pixel(&frame, 8, 1, 0), RED);
        assert_eq!(pixel(&frame, 8, 0, 0), [0, 0, 0, 0]);
    }
}
