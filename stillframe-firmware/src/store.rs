//! Snapshot sink for boards without storage
//!
//! This board has no filesystem wired up yet, so the store discards
//! snapshot bytes while counting them, keeping the pipeline's encode path
//! exercised. Reads always miss.

use core::convert::Infallible;

use embedded_io::{ErrorType, Read, Seek, SeekFrom, Write};
use stillframe_core::traits::{ImageStore, StoreError};

pub struct SinkStore {
    last_written: usize,
}

impl SinkStore {
    pub fn new() -> Self {
        Self { last_written: 0 }
    }

    /// Bytes the most recent snapshot produced.
    pub fn last_written(&self) -> usize {
        self.last_written
    }
}

/// Reader type for a store that never holds a file.
pub struct EmptyReader;

impl ErrorType for EmptyReader {
    type Error = Infallible;
}

impl Read for EmptyReader {
    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> {
        Ok(0)
    }
}

impl Seek for EmptyReader {
    fn seek(&mut self, _pos: SeekFrom) -> Result<u64, Self::Error> {
        Ok(0)
    }
}

pub struct CountingWriter<'a> {
    written: &'a mut usize,
}

impl ErrorType for CountingWriter<'_> {
    type Error = Infallible;
}

impl Write for CountingWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        *self.written += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl ImageStore for SinkStore {
    type Reader<'a> = EmptyReader;
    type Writer<'a> = CountingWriter<'a>;

    fn open(&mut self, _name: &str) -> Result<Self::Reader<'_>, StoreError> {
        Err(StoreError::NotFound)
    }

    fn create(&mut self, _name: &str) -> Result<Self::Writer<'_>, StoreError> {
        self.last_written = 0;
        Ok(CountingWriter {
            written: &mut self.last_written,
        })
    }
}
