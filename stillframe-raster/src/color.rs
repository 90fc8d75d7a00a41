//! Two-level pixel color

/// Pixel color on a monochrome panel.
///
/// A set bit in packed frame data means white, matching the controller
/// RAM convention where 1 releases the pixel to the light state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// Whether this color is stored as a set bit.
    pub const fn is_set(self) -> bool {
        matches!(self, Color::White)
    }

    /// Byte value that fills eight pixels of this color.
    pub const fn fill_byte(self) -> u8 {
        match self {
            Color::White => 0xFF,
            Color::Black => 0x00,
        }
    }
}
