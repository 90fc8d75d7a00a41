//! Packed monochrome framebuffer
//!
//! One bit per pixel, most significant bit first across increasing column
//! index, rows packed back to back with no padding: pixel (x, y) lives at
//! bit `y * width + x`. Backing storage is a fixed array sized at compile
//! time; the logical width and height may shrink below capacity without
//! reallocating.

use crate::color::Color;

/// Requested logical size does not fit the backing storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CapacityError {
    pub width: u16,
    pub height: u16,
}

/// Fixed-capacity 1-bpp surface with mutable logical bounds.
pub struct FrameBuffer<const N: usize> {
    bytes: [u8; N],
    width: u16,
    height: u16,
}

impl<const N: usize> FrameBuffer<N> {
    /// Create a buffer with the given logical size, all pixels black.
    pub fn new(width: u16, height: u16) -> Result<Self, CapacityError> {
        let mut frame = Self {
            bytes: [0; N],
            width: 0,
            height: 0,
        };
        frame.set_logical_size(width, height)?;
        Ok(frame)
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Total bits the backing array can hold.
    pub const fn capacity_bits() -> usize {
        N * 8
    }

    /// Change the logical bounds. Pixel data is left as is; callers that
    /// care about content clear after resizing.
    pub fn set_logical_size(&mut self, width: u16, height: u16) -> Result<(), CapacityError> {
        if width as usize * height as usize > Self::capacity_bits() {
            return Err(CapacityError { width, height });
        }
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn used_bytes(&self) -> usize {
        (self.width as usize * self.height as usize + 7) / 8
    }

    /// Borrow the packed bytes covering `width * height` bits.
    ///
    /// Bits past the last pixel in the final byte are unspecified.
    pub fn raw_bytes(&self) -> &[u8] {
        &self.bytes[..self.used_bytes()]
    }

    /// Fill every pixel inside the logical bounds.
    pub fn clear(&mut self, color: Color) {
        let used = self.used_bytes();
        self.bytes[..used].fill(color.fill_byte());
    }

    /// Set one pixel. Coordinates outside the logical bounds are ignored
    /// and never disturb in-bounds data.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let bit = y as usize * self.width as usize + x as usize;
        let mask = 0x80 >> (bit % 8);
        if color.is_set() {
            self.bytes[bit / 8] |= mask;
        } else {
            self.bytes[bit / 8] &= !mask;
        }
    }

    /// Read one pixel, `None` outside the logical bounds.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        let bit = y as usize * self.width as usize + x as usize;
        let set = self.bytes[bit / 8] & (0x80 >> (bit % 8)) != 0;
        Some(if set { Color::White } else { Color::Black })
    }

    /// Filled rectangle inclusive of both corners, clamped to the logical
    /// bounds. Corners may arrive in either order; a rectangle fully
    /// outside the bounds is a no-op.
    pub fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let (x0, x1) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let (y0, y1) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        if x1 < 0 || y1 < 0 || x0 >= self.width as i32 || y0 >= self.height as i32 {
            return;
        }
        for y in y0.max(0)..=y1.min(self.height as i32 - 1) {
            for x in x0.max(0)..=x1.min(self.width as i32 - 1) {
                self.set_pixel(x, y, color);
            }
        }
    }
}
