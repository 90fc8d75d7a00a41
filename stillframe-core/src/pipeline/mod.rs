//! Image pipeline orchestration
//!
//! - [`ImagePipeline`] ties the framebuffer, the codec, the panel link
//!   and the image store together
//! - [`RenderRequest`] describes work; [`PipelineError`] is the single
//!   failure type callers see, with a coarse [`ErrorClass`] driving
//!   recovery decisions

mod orchestrator;
mod request;

pub use orchestrator::{Activity, ImagePipeline, MessageLine, RenderOutcome, ScheduleOutcome};
pub use request::{GridParams, RenderRequest};

use stillframe_bitmap::BmpError;
use stillframe_raster::CapacityError;

use crate::display::LinkError;
use crate::traits::{GridError, ScanError, ScheduleError, StoreError};

/// Anything a pipeline operation can fail with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PipelineError {
    /// Stored image bytes are not a renderable file
    Format(BmpError),
    /// Compressed raster decode failed
    Scan(ScanError),
    /// Symbol generation failed
    Grid(GridError),
    /// Symbol does not fit the panel at the requested block size
    GridExceedsDisplay,
    /// Frame storage cannot back the requested dimensions
    Capacity(CapacityError),
    /// Image store failure
    Store(StoreError),
    /// Panel sequencing or device failure
    Link(LinkError),
    /// Deferred render queue cannot take another request
    QueueFull,
}

/// Recovery grouping for [`PipelineError`].
///
/// `Format` and `Size` mean the input can never succeed; `Io` means a
/// retry might; `Sequence` means a command ordering bug upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorClass {
    Format,
    Size,
    Io,
    Sequence,
}

impl PipelineError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Format(BmpError::Truncated) | Self::Format(BmpError::Io) => ErrorClass::Io,
            Self::Format(BmpError::Oversized) => ErrorClass::Size,
            Self::Format(_) => ErrorClass::Format,
            Self::Scan(ScanError::Io) => ErrorClass::Io,
            Self::Scan(ScanError::TooLarge) => ErrorClass::Size,
            Self::Scan(_) => ErrorClass::Format,
            Self::Grid(GridError::TooLarge) => ErrorClass::Size,
            Self::Grid(_) => ErrorClass::Format,
            Self::GridExceedsDisplay | Self::Capacity(_) | Self::QueueFull => ErrorClass::Size,
            Self::Store(_) => ErrorClass::Io,
            Self::Link(LinkError::FrameSizeMismatch) => ErrorClass::Size,
            Self::Link(LinkError::Device(_)) => ErrorClass::Io,
            Self::Link(LinkError::SequenceViolation { .. }) => ErrorClass::Sequence,
        }
    }
}

impl From<BmpError> for PipelineError {
    fn from(err: BmpError) -> Self {
        Self::Format(err)
    }
}

impl From<ScanError> for PipelineError {
    fn from(err: ScanError) -> Self {
        Self::Scan(err)
    }
}

impl From<GridError> for PipelineError {
    fn from(err: GridError) -> Self {
        Self::Grid(err)
    }
}

impl From<CapacityError> for PipelineError {
    fn from(err: CapacityError) -> Self {
        Self::Capacity(err)
    }
}

impl From<StoreError> for PipelineError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<LinkError> for PipelineError {
    fn from(err: LinkError) -> Self {
        Self::Link(err)
    }
}

impl From<ScheduleError> for PipelineError {
    fn from(_: ScheduleError) -> Self {
        Self::QueueFull
    }
}
