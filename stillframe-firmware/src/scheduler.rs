//! Deferred render scheduling on embassy-time
//!
//! [`TimerScheduler`] parks requests on a channel; [`defer_task`] sleeps
//! out each delay and hands the request back through [`READY`]. The render
//! loop in `main` is the only consumer, so requests never interleave.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Timer};

use stillframe_core::config::MAX_PENDING_RENDERS;
use stillframe_core::pipeline::RenderRequest;
use stillframe_core::traits::{DeferredScheduler, ScheduleError};

static DEFERRED: Channel<CriticalSectionRawMutex, (u32, RenderRequest), MAX_PENDING_RENDERS> =
    Channel::new();

/// Requests whose delay has elapsed, ready to render.
pub static READY: Channel<CriticalSectionRawMutex, RenderRequest, MAX_PENDING_RENDERS> =
    Channel::new();

/// Arms render requests on the host timer.
pub struct TimerScheduler;

impl DeferredScheduler for TimerScheduler {
    fn schedule(&mut self, delay_ms: u32, request: RenderRequest) -> Result<(), ScheduleError> {
        DEFERRED
            .try_send((delay_ms, request))
            .map_err(|_| ScheduleError::QueueFull)
    }
}

#[embassy_executor::task]
pub async fn defer_task() {
    loop {
        let (delay_ms, request) = DEFERRED.receive().await;
        Timer::after(Duration::from_millis(u64::from(delay_ms))).await;
        READY.send(request).await;
    }
}
