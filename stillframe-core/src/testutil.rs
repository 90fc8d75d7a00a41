//! Shared test doubles
//!
//! - [`FakePanel`] records every device call for sequence assertions
//! - [`MemStore`] is an in-memory image filesystem
//! - [`FakeScans`] and [`FakeGrids`] stand in for external decoders
//! - [`FakeScheduler`], [`CountingPacer`] and [`FixedDigits`] cover the
//!   remaining platform traits

use core::convert::Infallible;

use embedded_io::{Read, Seek, SeekFrom, Write};
use heapless::{String, Vec};
use stillframe_raster::CoopYield;

use crate::config::{SymbolGrid, MAX_IMAGE_NAME};
use crate::pipeline::{GridParams, RenderRequest};
use crate::traits::{
    DeferredScheduler, GridError, GridSource, ImageStore, Orientation, PanelDevice, PanelError,
    RandomSource, RowSink, ScanError, ScanlineDecoder, ScheduleError, StoreError,
};

/// One recorded panel device call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCall {
    OrientationInit(Orientation),
    Clear,
    WriteFrame {
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        len: usize,
    },
    WritePartialFrame {
        len: usize,
    },
    Present,
    PresentPartial,
    WaitUntilIdle,
    Sleep,
}

/// Recording panel device.
pub struct FakePanel {
    pub calls: Vec<DeviceCall, 64>,
    pub width: u16,
    pub height: u16,
    /// Fails the next device call without recording it.
    pub fail_next: Option<PanelError>,
}

impl FakePanel {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            calls: Vec::new(),
            width,
            height,
            fail_next: None,
        }
    }

    /// 16x16 panel, 32 packed bytes per frame.
    pub fn small() -> Self {
        Self::new(16, 16)
    }

    fn record(&mut self, call: DeviceCall) -> Result<(), PanelError> {
        if let Some(err) = self.fail_next.take() {
            return Err(err);
        }
        self.calls.push(call).expect("call log capacity");
        Ok(())
    }
}

impl PanelDevice for FakePanel {
    fn dimensions(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn orientation_init(&mut self, direction: Orientation) -> Result<(), PanelError> {
        self.record(DeviceCall::OrientationInit(direction))
    }

    fn clear(&mut self) -> Result<(), PanelError> {
        self.record(DeviceCall::Clear)
    }

    fn write_frame(
        &mut self,
        frame: &[u8],
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    ) -> Result<(), PanelError> {
        self.record(DeviceCall::WriteFrame {
            x,
            y,
            width,
            height,
            len: frame.len(),
        })
    }

    fn write_partial_frame(&mut self, frame: &[u8]) -> Result<(), PanelError> {
        self.record(DeviceCall::WritePartialFrame { len: frame.len() })
    }

    fn present(&mut self) -> Result<(), PanelError> {
        self.record(DeviceCall::Present)
    }

    fn present_partial(&mut self) -> Result<(), PanelError> {
        self.record(DeviceCall::PresentPartial)
    }

    fn wait_until_idle(&mut self) -> Result<(), PanelError> {
        self.record(DeviceCall::WaitUntilIdle)
    }

    fn sleep(&mut self) -> Result<(), PanelError> {
        self.record(DeviceCall::Sleep)
    }
}

/// In-memory image store.
pub struct MemStore {
    files: Vec<(String<MAX_IMAGE_NAME>, Vec<u8, 1024>), 4>,
}

impl MemStore {
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    pub fn insert(&mut self, name: &str, bytes: &[u8]) {
        let name = String::try_from(name).expect("test file name length");
        let content = Vec::from_slice(bytes).expect("test file capacity");
        self.files.push((name, content)).expect("test store capacity");
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.files
            .iter()
            .find(|(stored, _)| stored.as_str() == name)
            .map(|(_, content)| content.as_slice())
    }
}

pub struct MemReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl embedded_io::ErrorType for MemReader<'_> {
    type Error = Infallible;
}

impl Read for MemReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let n = buf.len().min(self.bytes.len().saturating_sub(self.pos));
        buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl Seek for MemReader<'_> {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, Self::Error> {
        let target = match pos {
            SeekFrom::Start(offset) => offset as i64,
            SeekFrom::End(offset) => self.bytes.len() as i64 + offset,
            SeekFrom::Current(offset) => self.pos as i64 + offset,
        };
        self.pos = target.max(0) as usize;
        Ok(self.pos as u64)
    }
}

pub struct MemWriter<'a> {
    bytes: &'a mut Vec<u8, 1024>,
}

impl embedded_io::ErrorType for MemWriter<'_> {
    type Error = Infallible;
}

impl Write for MemWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.bytes
            .extend_from_slice(buf)
            .expect("test file capacity");
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl ImageStore for MemStore {
    type Reader<'a> = MemReader<'a>;
    type Writer<'a> = MemWriter<'a>;

    fn open(&mut self, name: &str) -> Result<Self::Reader<'_>, StoreError> {
        let content = self
            .files
            .iter()
            .find(|(stored, _)| stored.as_str() == name)
            .map(|(_, content)| content.as_slice())
            .ok_or(StoreError::NotFound)?;
        Ok(MemReader {
            bytes: content,
            pos: 0,
        })
    }

    fn create(&mut self, name: &str) -> Result<Self::Writer<'_>, StoreError> {
        if let Some(index) = self
            .files
            .iter()
            .position(|(stored, _)| stored.as_str() == name)
        {
            self.files[index].1.clear();
            return Ok(MemWriter {
                bytes: &mut self.files[index].1,
            });
        }
        let name = String::try_from(name).map_err(|_| StoreError::Full)?;
        self.files
            .push((name, Vec::new()))
            .map_err(|_| StoreError::Full)?;
        let index = self.files.len() - 1;
        Ok(MemWriter {
            bytes: &mut self.files[index].1,
        })
    }
}

/// Decoder fake that emits a checkerboard of the configured size.
pub struct FakeScans {
    pub width: u16,
    pub rows: u16,
    pub fail: Option<ScanError>,
}

impl ScanlineDecoder for FakeScans {
    fn decode<R: Read + Seek>(
        &mut self,
        reader: &mut R,
        sink: &mut dyn RowSink,
    ) -> Result<(), ScanError> {
        if let Some(err) = self.fail.take() {
            return Err(err);
        }
        let mut byte = [0u8; 1];
        while reader.read(&mut byte).map_err(|_| ScanError::Io)? > 0 {}
        let mut pixels = [0u16; 16];
        let width = usize::from(self.width.min(16));
        for y in 0..self.rows {
            for (x, sample) in pixels[..width].iter_mut().enumerate() {
                *sample = (x as u16 + y) % 2;
            }
            sink.push_row(y, &pixels[..width]);
        }
        Ok(())
    }
}

/// Grid source fake that marks the main diagonal.
pub struct FakeGrids {
    pub side: u16,
    pub fail: Option<GridError>,
}

impl GridSource for FakeGrids {
    fn generate(&mut self, _params: &GridParams, grid: &mut SymbolGrid) -> Result<(), GridError> {
        if let Some(err) = self.fail.take() {
            return Err(err);
        }
        grid.reset(self.side).map_err(|_| GridError::TooLarge)?;
        for i in 0..self.side {
            grid.set(i, i);
        }
        Ok(())
    }
}

/// Scheduler fake that records requests instead of arming timers.
pub struct FakeScheduler {
    pub scheduled: Vec<(u32, RenderRequest), 8>,
    pub fail: bool,
}

impl FakeScheduler {
    pub fn new() -> Self {
        Self {
            scheduled: Vec::new(),
            fail: false,
        }
    }
}

impl DeferredScheduler for FakeScheduler {
    fn schedule(&mut self, delay_ms: u32, request: RenderRequest) -> Result<(), ScheduleError> {
        if self.fail {
            return Err(ScheduleError::QueueFull);
        }
        self.scheduled
            .push((delay_ms, request))
            .map_err(|_| ScheduleError::QueueFull)
    }
}

/// Pacer that counts yields.
pub struct CountingPacer(pub u32);

impl CoopYield for CountingPacer {
    fn yield_now(&mut self) {
        self.0 += 1;
    }
}

/// Digit source replaying a fixed sequence.
pub struct FixedDigits {
    digits: &'static [u8],
    next: usize,
}

impl FixedDigits {
    pub fn new(digits: &'static [u8]) -> Self {
        Self { digits, next: 0 }
    }
}

impl RandomSource for FixedDigits {
    fn random_digit(&mut self) -> u8 {
        let digit = self.digits[self.next % self.digits.len()];
        self.next += 1;
        digit
    }
}
