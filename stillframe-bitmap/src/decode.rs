//! Streaming BMP decoding
//!
//! Rows are fetched by seeking straight to the bytes the destination will
//! show and reading them through a small scratch window, so neither the
//! pixel array nor whole skipped regions ever sit in RAM.

use embedded_io::{Read, Seek, SeekFrom};
use stillframe_raster::{Color, CoopYield, FrameBuffer};

use crate::header::{self, BmpError, BmpInfo};

/// Pixels held per scratch refill.
pub const SCRATCH_PIXELS: usize = 20;
const SCRATCH_BYTES: usize = SCRATCH_PIXELS * header::BYTES_PER_PIXEL as usize;

/// Buffered triplet reader that tracks the consumption position so row
/// seeks are skipped when the stream is already in place. Any real seek
/// drops the buffered window.
struct ScratchReader<'a, R: Read + Seek> {
    reader: &'a mut R,
    buf: [u8; SCRATCH_BYTES],
    len: usize,
    idx: usize,
    /// Stream position one past the last byte pulled from the reader
    stream_pos: u64,
}

impl<'a, R: Read + Seek> ScratchReader<'a, R> {
    fn new(reader: &'a mut R) -> Self {
        Self {
            reader,
            buf: [0; SCRATCH_BYTES],
            len: 0,
            idx: 0,
            // Unknown until the first seek lands
            stream_pos: u64::MAX,
        }
    }

    /// Position of the next byte a caller would consume.
    fn position(&self) -> u64 {
        self.stream_pos - (self.len - self.idx) as u64
    }

    fn seek_to(&mut self, pos: u64) -> Result<(), BmpError> {
        if self.position() == pos {
            return Ok(());
        }
        self.reader
            .seek(SeekFrom::Start(pos))
            .map_err(|_| BmpError::Io)?;
        self.stream_pos = pos;
        self.len = 0;
        self.idx = 0;
        Ok(())
    }

    fn next_triplet(&mut self) -> Result<[u8; 3], BmpError> {
        let mut out = [0u8; 3];
        for byte in &mut out {
            if self.idx == self.len {
                self.len = self.reader.read(&mut self.buf).map_err(|_| BmpError::Io)?;
                self.idx = 0;
                self.stream_pos += self.len as u64;
                if self.len == 0 {
                    return Err(BmpError::Truncated);
                }
            }
            *byte = self.buf[self.idx];
            self.idx += 1;
        }
        Ok(out)
    }
}

/// Decode a 24-bit uncompressed BMP into `frame` with the image's
/// top-left corner at `(x, y)`.
///
/// The destination is untouched until every header check has passed, and
/// the copied region is clipped to the frame bounds. A pixel is white
/// only when its triplet is exactly RGB(255, 255, 255); everything else
/// lands black. The yield hook runs once per copied row.
pub fn decode<R, Y, const N: usize>(
    reader: &mut R,
    frame: &mut FrameBuffer<N>,
    x: u16,
    y: u16,
    pacer: &mut Y,
) -> Result<BmpInfo, BmpError>
where
    R: Read + Seek,
    Y: CoopYield,
{
    let info = header::read_headers(reader)?;

    let frame_w = u32::from(frame.width());
    let frame_h = u32::from(frame.height());
    let (x, y) = (u32::from(x), u32::from(y));
    if x >= frame_w || y >= frame_h {
        return Ok(info);
    }
    let copy_w = info.width.min(frame_w - x);
    let copy_h = info.height.min(frame_h - y);

    let stride = u64::from(header::row_stride(info.width));
    let mut scratch = ScratchReader::new(reader);
    for row in 0..copy_h {
        let stored_row = if info.top_down {
            row
        } else {
            info.height - 1 - row
        };
        scratch.seek_to(u64::from(info.data_offset) + u64::from(stored_row) * stride)?;

        for col in 0..copy_w {
            let [b, g, r] = scratch.next_triplet()?;
            let color = if r == 0xFF && g == 0xFF && b == 0xFF {
                Color::White
            } else {
                Color::Black
            };
            frame.set_pixel((x + col) as i32, (y + row) as i32, color);
        }
        pacer.yield_now();
    }
    Ok(info)
}
