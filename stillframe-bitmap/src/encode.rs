//! Snapshot encoding
//!
//! Serializes the framebuffer as a bottom-up 24-bit uncompressed BMP so
//! host tooling can read back exactly what the panel is showing.

use embedded_io::Write;
use stillframe_raster::{Color, CoopYield, FrameBuffer};

use crate::header::{self, BmpError};

/// Encode the logical contents of `frame`, bottom row first. Set bits
/// (white) become 0xFF gray triplets, clear bits 0x00, the exact inverse
/// of the decoder's threshold. Rows are zero padded to a 4 byte boundary
/// and the yield hook runs once per row.
pub fn encode<W, Y, const N: usize>(
    frame: &FrameBuffer<N>,
    writer: &mut W,
    pacer: &mut Y,
) -> Result<(), BmpError>
where
    W: Write,
    Y: CoopYield,
{
    let width = u32::from(frame.width());
    let height = u32::from(frame.height());
    header::write_headers(writer, width, height)?;

    let padding = (header::row_stride(width) - width * header::BYTES_PER_PIXEL) as usize;
    for row in (0..height).rev() {
        for col in 0..width {
            let level = match frame.pixel(col as i32, row as i32) {
                Some(Color::White) => 0xFF,
                _ => 0x00,
            };
            writer
                .write_all(&[level, level, level])
                .map_err(|_| BmpError::Io)?;
        }
        writer
            .write_all(&[0u8; 3][..padding])
            .map_err(|_| BmpError::Io)?;
        pacer.yield_now();
    }
    Ok(())
}
