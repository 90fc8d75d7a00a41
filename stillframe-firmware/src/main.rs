//! Stillframe bring-up firmware
//!
//! RP2040 binary driving a 1.54" SSD1681 panel over SPI1. Brings the
//! pipeline up, runs a deferred checkerboard render through the
//! partial-refresh path, then shows a full-refresh counter before putting
//! the panel into deep sleep.

#![no_std]
#![no_main]

mod font;
mod pattern;
mod scheduler;
mod store;

use core::fmt::Write;

use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::SPI1;
use embassy_rp::spi::{self, Blocking, Spi};
use embassy_rp::watchdog::Watchdog;
use embassy_time::{Delay, Duration, Timer};
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use stillframe_core::config::PipelineConfig;
use stillframe_core::pipeline::{GridParams, ImagePipeline, MessageLine, RenderRequest};
use stillframe_core::traits::NoScanlines;
use stillframe_drivers::ssd1681::{self, Ssd1681};
use stillframe_raster::CoopYield;

use crate::font::DIGITS_8X12;
use crate::pattern::CheckerSource;
use crate::scheduler::{defer_task, TimerScheduler, READY};
use crate::store::SinkStore;

type EpdBus = Spi<'static, SPI1, Blocking>;
type EpdSpi = ExclusiveDevice<EpdBus, Output<'static>, NoDelay>;
type Panel = Ssd1681<EpdSpi, Output<'static>, Output<'static>, Input<'static>, Delay>;

/// Full refreshes shown by the counter before deep sleep.
const DEMO_REFRESHES: u32 = 5;
const COUNTER_PERIOD: Duration = Duration::from_secs(30);
const WATCHDOG_TIMEOUT: Duration = Duration::from_millis(8_000);

static PIPELINE: StaticCell<ImagePipeline<Panel, { ssd1681::FRAME_BYTES }>> = StaticCell::new();

/// Row-loop yield hook wired to the hardware watchdog.
struct WatchdogPacer(Watchdog);

impl CoopYield for WatchdogPacer {
    fn yield_now(&mut self) {
        self.0.feed();
    }
}

/// Sleep in short slices so the watchdog stays fed across long waits.
async fn paced_sleep(pacer: &mut WatchdogPacer, period: Duration) {
    let mut remaining = period;
    while remaining > Duration::from_ticks(0) {
        let slice = remaining.min(Duration::from_secs(1));
        Timer::after(slice).await;
        pacer.yield_now();
        remaining = remaining - slice;
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("stillframe firmware starting...");

    let p = embassy_rp::init(Default::default());

    // Panel wiring per the 1.54" Pico e-paper module
    let mut config = spi::Config::default();
    config.frequency = 4_000_000;
    let bus = Spi::new_blocking_txonly(p.SPI1, p.PIN_10, p.PIN_11, config);
    let cs = Output::new(p.PIN_9, Level::High);
    let dc = Output::new(p.PIN_8, Level::Low);
    let rst = Output::new(p.PIN_12, Level::High);
    let busy = Input::new(p.PIN_13, Pull::None);

    let spi_dev = ExclusiveDevice::new_no_delay(bus, cs).unwrap();
    let panel = Ssd1681::new(spi_dev, dc, rst, busy, Delay);

    let mut watchdog = Watchdog::new(p.WATCHDOG);
    watchdog.start(WATCHDOG_TIMEOUT);
    let mut pacer = WatchdogPacer(watchdog);

    let pipeline = PIPELINE.init(
        ImagePipeline::new(panel, PipelineConfig::default()).unwrap(),
    );

    pipeline.initialize().unwrap();
    info!("panel ready: {}", pipeline.status_label());

    spawner.spawn(defer_task()).unwrap();

    let mut store = SinkStore::new();
    let mut scans = NoScanlines;
    let mut grids = CheckerSource { side: 21 };
    let mut timer_scheduler = TimerScheduler;

    // Test pattern, deferred the way an upload-triggered render would be.
    pipeline
        .schedule_render(
            &mut timer_scheduler,
            RenderRequest::Symbol(GridParams::default()),
        )
        .unwrap();

    let request = READY.receive().await;
    match pipeline.run_deferred(
        &mut store,
        &mut scans,
        &mut grids,
        &mut timer_scheduler,
        &mut pacer,
        &request,
    ) {
        Ok(_) => info!(
            "test pattern on panel, snapshot {} bytes",
            store.last_written()
        ),
        Err(err) => warn!("test pattern failed: {:?}", err),
    }

    // Full-refresh counter
    let mut shown = 0;
    while shown < DEMO_REFRESHES {
        paced_sleep(&mut pacer, COUNTER_PERIOD).await;
        shown += 1;

        let mut text: heapless::String<8> = heapless::String::new();
        let _ = write!(text, "{shown:04}");
        let lines = [MessageLine {
            text: text.as_str(),
            font: &DIGITS_8X12,
        }];
        match pipeline.show_status_message(&mut pacer, &lines) {
            Ok(()) => info!("counter refresh {}", shown),
            Err(err) => warn!("counter refresh failed: {:?}", err),
        }

        if pipeline.needs_full_clear() {
            info!("partial hygiene limit reached, clearing");
            let _ = pipeline.clear_panel();
        }
    }

    info!("demo complete, panel to deep sleep");
    if let Err(err) = pipeline.sleep() {
        warn!("sleep failed: {:?}", err);
    }

    loop {
        paced_sleep(&mut pacer, Duration::from_secs(1)).await;
    }
}
