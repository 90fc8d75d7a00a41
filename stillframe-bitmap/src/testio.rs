//! In-memory stream doubles shared by the codec tests

use embedded_io::{ErrorType, Read, Seek, SeekFrom, Write};
use stillframe_raster::CoopYield;

use crate::header;

/// Growable writer over a heapless Vec. Overflow panics, which is fine
/// for fixtures of known size.
pub struct VecWriter {
    data: heapless::Vec<u8, 1024>,
}

impl VecWriter {
    pub fn new() -> Self {
        Self {
            data: heapless::Vec::new(),
        }
    }

    pub fn into_bytes(self) -> heapless::Vec<u8, 1024> {
        self.data
    }
}

impl ErrorType for VecWriter {
    type Error = core::convert::Infallible;
}

impl Write for VecWriter {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.data.extend_from_slice(buf).unwrap();
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Seekable reader over a byte slice. Seeking past the end is allowed;
/// reads there return zero bytes.
pub struct SliceStream<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceStream<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }
}

impl ErrorType for SliceStream<'_> {
    type Error = core::convert::Infallible;
}

impl Read for SliceStream<'_> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let available = self.data.len().saturating_sub(self.pos);
        let n = buf.len().min(available);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl Seek for SliceStream<'_> {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, Self::Error> {
        let target = match pos {
            SeekFrom::Start(p) => p as i64,
            SeekFrom::Current(d) => self.pos as i64 + d,
            SeekFrom::End(d) => self.data.len() as i64 + d,
        };
        self.pos = target.max(0) as usize;
        Ok(self.pos as u64)
    }
}

/// Yield hook that counts invocations.
pub struct CountingPacer(pub u32);

impl CoopYield for CountingPacer {
    fn yield_now(&mut self) {
        self.0 += 1;
    }
}

/// Assemble a BMP from stored rows given in file order. Pixels are BGR
/// triplets written verbatim; row padding is appended here. `top_down`
/// flips the height field negative.
pub fn build_bmp(width: u32, stored_rows: &[&[[u8; 3]]], top_down: bool) -> heapless::Vec<u8, 1024> {
    let mut out = VecWriter::new();
    header::write_headers(&mut out, width, stored_rows.len() as u32).unwrap();
    let mut bytes = out.into_bytes();
    if top_down {
        let height = stored_rows.len() as i32;
        bytes[22..26].copy_from_slice(&(-height).to_le_bytes());
    }

    let padding = (header::row_stride(width) - width * header::BYTES_PER_PIXEL) as usize;
    for row in stored_rows {
        assert_eq!(row.len(), width as usize, "fixture row width mismatch");
        for bgr in *row {
            bytes.extend_from_slice(bgr).unwrap();
        }
        bytes.extend_from_slice(&[0u8; 3][..padding]).unwrap();
    }
    bytes
}

pub const WHITE_BGR: [u8; 3] = [0xFF, 0xFF, 0xFF];
pub const BLACK_BGR: [u8; 3] = [0x00, 0x00, 0x00];
