//! Flash-resident digit font for the bring-up counter
//!
//! 8x12 cells, one byte per row, '0' through '9'.

use stillframe_raster::Font;

#[rustfmt::skip]
static DIGIT_GLYPHS: [u8; 120] = [
    // '0'
    0x00, 0x3C, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x3C, 0x00, 0x00,
    // '1'
    0x00, 0x18, 0x38, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x3C, 0x00, 0x00,
    // '2'
    0x00, 0x3C, 0x66, 0x06, 0x06, 0x0C, 0x18, 0x30, 0x60, 0x7E, 0x00, 0x00,
    // '3'
    0x00, 0x3C, 0x66, 0x06, 0x06, 0x1C, 0x06, 0x06, 0x66, 0x3C, 0x00, 0x00,
    // '4'
    0x00, 0x0C, 0x1C, 0x2C, 0x4C, 0x4C, 0x7E, 0x0C, 0x0C, 0x0C, 0x00, 0x00,
    // '5'
    0x00, 0x7E, 0x60, 0x60, 0x7C, 0x06, 0x06, 0x06, 0x66, 0x3C, 0x00, 0x00,
    // '6'
    0x00, 0x3C, 0x66, 0x60, 0x60, 0x7C, 0x66, 0x66, 0x66, 0x3C, 0x00, 0x00,
    // '7'
    0x00, 0x7E, 0x06, 0x0C, 0x0C, 0x18, 0x18, 0x30, 0x30, 0x30, 0x00, 0x00,
    // '8'
    0x00, 0x3C, 0x66, 0x66, 0x66, 0x3C, 0x66, 0x66, 0x66, 0x3C, 0x00, 0x00,
    // '9'
    0x00, 0x3C, 0x66, 0x66, 0x66, 0x3E, 0x06, 0x06, 0x66, 0x3C, 0x00, 0x00,
];

pub static DIGITS_8X12: Font = Font {
    width: 8,
    height: 12,
    first: b'0',
    glyphs: 10,
    data: &DIGIT_GLYPHS,
};
