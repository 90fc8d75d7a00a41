//! Image storage abstraction
//!
//! Named stream access to the image filesystem. Readers and writers
//! borrow the store, so a stream is released when it goes out of scope
//! on success and failure paths alike.

use embedded_io::{Read, Seek, Write};

/// Storage failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// No file under that name
    NotFound,
    /// No room for another file
    Full,
    /// Underlying medium failure
    Storage,
}

/// Named image storage with seekable read streams.
pub trait ImageStore {
    type Reader<'a>: Read + Seek
    where
        Self: 'a;
    type Writer<'a>: Write
    where
        Self: 'a;

    /// Open an existing file for reading.
    fn open(&mut self, name: &str) -> Result<Self::Reader<'_>, StoreError>;

    /// Create a file, replacing any previous content under that name.
    fn create(&mut self, name: &str) -> Result<Self::Writer<'_>, StoreError>;
}
