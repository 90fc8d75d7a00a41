//! BMP header layout
//!
//! Only the fields this pipeline acts on are modeled: a 14 byte file
//! header followed by a 40 byte info header, always 24-bit uncompressed.

use embedded_io::{Read, ReadExactError, Write};

/// "BM" read as a little endian u16.
pub const SIGNATURE: u16 = 0x4D42;

pub const FILE_HEADER_LEN: u32 = 14;
pub const INFO_HEADER_LEN: u32 = 40;
pub const PIXEL_DATA_OFFSET: u32 = FILE_HEADER_LEN + INFO_HEADER_LEN;
pub const BYTES_PER_PIXEL: u32 = 3;

/// Largest width or height accepted from a stored image. Keeps row
/// strides and seek offsets well inside u32 range for untrusted headers.
pub const MAX_DIMENSION: u32 = 1 << 14;

/// Stored rows are padded to a 4 byte boundary. Callers pass widths
/// already validated against [`MAX_DIMENSION`].
pub const fn row_stride(width: u32) -> u32 {
    (width * BYTES_PER_PIXEL + 3) & !3
}

/// Codec failure. Header validation failures leave the destination frame
/// untouched; `Truncated` and `Io` can surface mid-copy, in which case
/// rows already written stay written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BmpError {
    /// Stream does not start with the BM signature
    InvalidSignature,
    /// Color planes field is not 1
    UnsupportedPlanes,
    /// Bit depth is not 24
    UnsupportedDepth,
    /// Compression field is not 0 (uncompressed)
    UnsupportedCompression,
    /// Width or height exceeds [`MAX_DIMENSION`]
    Oversized,
    /// Stream ended inside a header or pixel row
    Truncated,
    /// Underlying stream failure
    Io,
}

/// Header fields decoding acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BmpInfo {
    /// Stated total file size, informational only and never trusted
    pub file_size: u32,
    /// Offset of the first stored pixel row
    pub data_offset: u32,
    pub width: u32,
    pub height: u32,
    /// Negative stored height: rows run top to bottom
    pub top_down: bool,
}

fn map_read_err<E>(err: ReadExactError<E>) -> BmpError {
    match err {
        ReadExactError::UnexpectedEof => BmpError::Truncated,
        ReadExactError::Other(_) => BmpError::Io,
    }
}

pub(crate) fn read_u16_le<R: Read>(reader: &mut R) -> Result<u16, BmpError> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf).map_err(map_read_err)?;
    Ok(u16::from_le_bytes(buf))
}

pub(crate) fn read_u32_le<R: Read>(reader: &mut R) -> Result<u32, BmpError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf).map_err(map_read_err)?;
    Ok(u32::from_le_bytes(buf))
}

pub(crate) fn read_i32_le<R: Read>(reader: &mut R) -> Result<i32, BmpError> {
    Ok(read_u32_le(reader)? as i32)
}

/// Parse both headers from the start of the stream, validating the
/// signature, plane count, bit depth and compression mode in that order.
pub fn read_headers<R: Read>(reader: &mut R) -> Result<BmpInfo, BmpError> {
    if read_u16_le(reader)? != SIGNATURE {
        return Err(BmpError::InvalidSignature);
    }
    let file_size = read_u32_le(reader)?;
    let _reserved = read_u32_le(reader)?;
    let data_offset = read_u32_le(reader)?;

    let _header_size = read_u32_le(reader)?;
    let width = read_u32_le(reader)?;
    let height = read_i32_le(reader)?;
    if read_u16_le(reader)? != 1 {
        return Err(BmpError::UnsupportedPlanes);
    }
    if read_u16_le(reader)? != 24 {
        return Err(BmpError::UnsupportedDepth);
    }
    if read_u32_le(reader)? != 0 {
        return Err(BmpError::UnsupportedCompression);
    }

    let (height, top_down) = if height < 0 {
        (height.unsigned_abs(), true)
    } else {
        (height as u32, false)
    };
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(BmpError::Oversized);
    }
    Ok(BmpInfo {
        file_size,
        data_offset,
        width,
        height,
        top_down,
    })
}

/// Write the 54 byte header pair for a bottom-up 24-bit image. The file
/// size field carries the true byte count including row padding.
pub fn write_headers<W: Write>(writer: &mut W, width: u32, height: u32) -> Result<(), BmpError> {
    let file_size = PIXEL_DATA_OFFSET + row_stride(width) * height;

    let mut file_header = [0u8; FILE_HEADER_LEN as usize];
    file_header[0] = b'B';
    file_header[1] = b'M';
    file_header[2..6].copy_from_slice(&file_size.to_le_bytes());
    file_header[10..14].copy_from_slice(&PIXEL_DATA_OFFSET.to_le_bytes());
    writer.write_all(&file_header).map_err(|_| BmpError::Io)?;

    let mut info_header = [0u8; INFO_HEADER_LEN as usize];
    info_header[0..4].copy_from_slice(&INFO_HEADER_LEN.to_le_bytes());
    info_header[4..8].copy_from_slice(&width.to_le_bytes());
    info_header[8..12].copy_from_slice(&height.to_le_bytes());
    info_header[12..14].copy_from_slice(&1u16.to_le_bytes());
    info_header[14..16].copy_from_slice(&24u16.to_le_bytes());
    writer.write_all(&info_header).map_err(|_| BmpError::Io)?;
    Ok(())
}
