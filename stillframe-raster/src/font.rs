//! Fixed-cell bitmap fonts
//!
//! Glyph tables live in the consuming application, typically flash
//! resident. Each glyph occupies `height` rows of `ceil(width / 8)` bytes,
//! rows top to bottom, leftmost pixel in the high bit, glyphs ordered by
//! ascending code point starting at `first`.

use crate::buffer::FrameBuffer;
use crate::color::Color;

/// Fixed-cell font table descriptor.
#[derive(Debug, Clone, Copy)]
pub struct Font {
    /// Glyph cell width in pixels
    pub width: u8,
    /// Glyph cell height in pixels
    pub height: u8,
    /// Code point of the first glyph in the table
    pub first: u8,
    /// Number of glyphs in the table
    pub glyphs: u8,
    /// Packed glyph rows
    pub data: &'static [u8],
}

impl Font {
    /// Bytes per glyph row.
    pub const fn row_bytes(&self) -> usize {
        (self.width as usize + 7) / 8
    }

    /// Bytes per glyph.
    pub const fn glyph_bytes(&self) -> usize {
        self.row_bytes() * self.height as usize
    }

    fn glyph(&self, ch: char) -> Option<&'static [u8]> {
        let code = u32::from(ch);
        let first = u32::from(self.first);
        if code < first || code >= first + u32::from(self.glyphs) {
            return None;
        }
        let start = (code - first) as usize * self.glyph_bytes();
        self.data.get(start..start + self.glyph_bytes())
    }
}

impl<const N: usize> FrameBuffer<N> {
    /// Draw a string in fixed cells starting at (x, y). Only set glyph
    /// bits are written, so the background shows through; pixels falling
    /// outside the buffer are clipped. Glyphs absent from the table
    /// advance the cursor without drawing.
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, font: &Font, color: Color) {
        let mut pen_x = x;
        for ch in text.chars() {
            if let Some(glyph) = font.glyph(ch) {
                self.blit_glyph(pen_x, y, glyph, font, color);
            }
            pen_x += i32::from(font.width);
        }
    }

    fn blit_glyph(&mut self, x: i32, y: i32, glyph: &[u8], font: &Font, color: Color) {
        let row_bytes = font.row_bytes();
        for gy in 0..usize::from(font.height) {
            let row = &glyph[gy * row_bytes..][..row_bytes];
            for gx in 0..usize::from(font.width) {
                if row[gx / 8] & (0x80 >> (gx % 8)) != 0 {
                    self.set_pixel(x + gx as i32, y + gy as i32, color);
                }
            }
        }
    }
}
