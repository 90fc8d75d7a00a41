//! Platform capability traits
//!
//! Deferred scheduling, randomness and external decoders are host
//! facilities. Each target platform provides one implementation; tests
//! substitute fakes.

use embedded_io::{Read, Seek};

use crate::config::SymbolGrid;
use crate::pipeline::{GridParams, RenderRequest};

/// Scheduling failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScheduleError {
    /// Host timer queue cannot take another entry
    QueueFull,
}

/// Queues a render request to run on the pipeline thread after a delay.
pub trait DeferredScheduler {
    fn schedule(&mut self, delay_ms: u32, request: RenderRequest) -> Result<(), ScheduleError>;
}

/// Digit source for provisioning identifiers.
pub trait RandomSource {
    /// Uniform digit in `0..=9`.
    fn random_digit(&mut self) -> u8;
}

/// Scanline decoding failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanError {
    /// This build has no decoder for the format
    Unsupported,
    /// Stream is not a valid image
    Malformed,
    /// Image dimensions beyond what the sink can take
    TooLarge,
    /// Underlying stream failure
    Io,
}

/// Receiver for decoded scanlines, one call per row top to bottom.
pub trait RowSink {
    /// `pixels[i]` is the luminance-ish sample for column `i`; zero is
    /// background, anything else is ink.
    fn push_row(&mut self, y: u16, pixels: &[u16]);
}

/// Row-callback decoder for compressed raster formats.
pub trait ScanlineDecoder {
    fn decode<R: Read + Seek>(
        &mut self,
        reader: &mut R,
        sink: &mut dyn RowSink,
    ) -> Result<(), ScanError>;
}

/// Decoder stub for builds without compressed raster support.
pub struct NoScanlines;

impl ScanlineDecoder for NoScanlines {
    fn decode<R: Read + Seek>(
        &mut self,
        _reader: &mut R,
        _sink: &mut dyn RowSink,
    ) -> Result<(), ScanError> {
        Err(ScanError::Unsupported)
    }
}

/// Symbol generation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GridError {
    /// Requested symbol does not fit the grid storage
    TooLarge,
    /// Payload cannot be encoded at the requested parameters
    Encoding,
}

/// Turns symbol parameters into a module grid.
///
/// Implementations reset the grid to their side length and mark dark
/// modules; the pipeline renders whatever the source produced.
pub trait GridSource {
    fn generate(&mut self, params: &GridParams, grid: &mut SymbolGrid) -> Result<(), GridError>;
}
