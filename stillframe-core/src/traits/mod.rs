//! Hardware and platform abstraction traits
//!
//! Everything the pipeline needs from the outside world sits behind a
//! trait here, so the core stays testable on the host.

pub mod panel;
pub mod runtime;
pub mod storage;

pub use panel::{Orientation, PanelDevice, PanelError};
pub use runtime::{
    DeferredScheduler, GridError, GridSource, NoScanlines, RandomSource, RowSink, ScanError,
    ScanlineDecoder, ScheduleError,
};
pub use storage::{ImageStore, StoreError};
