//! Render orchestration
//!
//! Every panel update flows through [`ImagePipeline`]: rasterize into the
//! frame first, then walk the panel link. A request that fails while
//! rasterizing never issues a single device command.

use heapless::{Deque, String};
use stillframe_bitmap as bitmap;
use stillframe_raster::{
    centered_origin, fitted_block, render_grid, Color, CoopYield, Font, FrameBuffer, ModuleGrid,
};

use super::{PipelineError, RenderRequest};
use crate::config::{PipelineConfig, SymbolGrid, MAX_IMAGE_NAME, MAX_PENDING_RENDERS};
use crate::display::{DisplayState, PanelLink};
use crate::traits::{
    DeferredScheduler, GridSource, ImageStore, Orientation, PanelDevice, RowSink, ScanError,
    ScanlineDecoder,
};

const NO_IMAGE: &str = "<none>";

/// Whether a render request produced panel output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderOutcome {
    /// The frame was drawn and presented
    Rendered,
    /// The request named a format this build cannot draw
    Skipped,
}

/// Where a deferred request ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScheduleOutcome {
    /// Armed on the host timer
    Scheduled,
    /// A render is already outstanding, parked behind it
    Queued,
}

/// What the pipeline last put on the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Activity {
    Idle,
    Cleared,
    DisplayingImage,
    ShowingSymbol,
    Sleeping,
}

impl Activity {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Cleared => "cleared",
            Self::DisplayingImage => "displaying image",
            Self::ShowingSymbol => "showing generated code",
            Self::Sleeping => "sleeping",
        }
    }
}

/// One line of a status screen.
pub struct MessageLine<'a> {
    pub text: &'a str,
    pub font: &'a Font,
}

/// Owns the frame, the panel link and the render queue.
///
/// `FRAME_BYTES` must cover one packed frame for the attached panel;
/// [`new`](Self::new) rejects a device the storage cannot back.
pub struct ImagePipeline<P: PanelDevice, const FRAME_BYTES: usize> {
    frame: FrameBuffer<FRAME_BYTES>,
    link: PanelLink<P>,
    config: PipelineConfig,
    pending: Deque<RenderRequest, MAX_PENDING_RENDERS>,
    deferred_outstanding: bool,
    current_image: String<MAX_IMAGE_NAME>,
    activity: Activity,
}

impl<P: PanelDevice, const FRAME_BYTES: usize> ImagePipeline<P, FRAME_BYTES> {
    pub fn new(device: P, config: PipelineConfig) -> Result<Self, PipelineError> {
        let (width, height) = device.dimensions();
        let frame = FrameBuffer::new(width, height)?;
        let mut current_image = String::new();
        let _ = current_image.push_str(NO_IMAGE);
        Ok(Self {
            frame,
            link: PanelLink::new(device),
            config,
            pending: Deque::new(),
            deferred_outstanding: false,
            current_image,
            activity: Activity::Idle,
        })
    }

    /// Name of the image currently on the panel, `<none>` after a clear.
    pub fn current_image(&self) -> &str {
        self.current_image.as_str()
    }

    pub fn state(&self) -> DisplayState {
        self.link.state()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn frame(&self) -> &FrameBuffer<FRAME_BYTES> {
        &self.frame
    }

    pub fn partial_refreshes(&self) -> u32 {
        self.link.partial_refreshes()
    }

    /// True once enough partial refreshes have run that the next render
    /// should go through a full clear anyway.
    pub fn needs_full_clear(&self) -> bool {
        self.link.needs_full_clear(self.config.partial_refresh_limit)
    }

    /// One-word state summary for status reporting.
    pub fn status_label(&self) -> &'static str {
        match self.link.state() {
            DisplayState::Uninitialized => "uninitialized",
            DisplayState::Busy => "busy",
            DisplayState::Sleeping => "sleeping",
            DisplayState::Idle | DisplayState::PartialMode => self.activity.label(),
        }
    }

    /// Bring the panel up and clear it.
    pub fn initialize(&mut self) -> Result<(), PipelineError> {
        self.link.orientation_init(Orientation::Portrait)?;
        self.link.clear()?;
        self.activity = Activity::Idle;
        Ok(())
    }

    /// Clear the panel and forget the current image.
    pub fn clear_panel(&mut self) -> Result<(), PipelineError> {
        self.link.orientation_init(Orientation::Landscape)?;
        self.link.clear()?;
        self.set_no_image();
        self.activity = Activity::Cleared;
        Ok(())
    }

    /// Put the panel into deep sleep. It keeps showing its last image.
    pub fn sleep(&mut self) -> Result<(), PipelineError> {
        self.link.sleep()?;
        self.activity = Activity::Sleeping;
        Ok(())
    }

    /// Render a stored image picked by its file suffix.
    ///
    /// `.bmp`/`.BMP` files go through the built-in codec, `.png` through
    /// the scanline decoder. Anything else, and `.png` on builds whose
    /// decoder is [`NoScanlines`](crate::traits::NoScanlines), is skipped
    /// without touching the panel.
    pub fn render_stored_image<S, D, Y>(
        &mut self,
        store: &mut S,
        scans: &mut D,
        pacer: &mut Y,
        name: &str,
    ) -> Result<RenderOutcome, PipelineError>
    where
        S: ImageStore,
        D: ScanlineDecoder,
        Y: CoopYield,
    {
        if name.ends_with(".bmp") || name.ends_with(".BMP") {
            self.raster_bmp(store, pacer, name)?;
        } else if name.ends_with(".png") {
            match self.raster_scan(store, scans, pacer, name) {
                Err(PipelineError::Scan(ScanError::Unsupported)) => {
                    return Ok(RenderOutcome::Skipped)
                }
                other => other?,
            }
        } else {
            return Ok(RenderOutcome::Skipped);
        }
        self.present_partial_frame(Orientation::Portrait)?;
        self.remember_image(name);
        self.activity = Activity::DisplayingImage;
        Ok(RenderOutcome::Rendered)
    }

    /// Render a module grid centered on the panel and snapshot it to the
    /// store under the configured name.
    ///
    /// With `scale_to_fit` the block size is derived from the panel, else
    /// the configured fixed size is used. A grid that cannot fit fails
    /// before the first device command.
    pub fn render_module_grid<S, Y>(
        &mut self,
        store: &mut S,
        pacer: &mut Y,
        grid: &SymbolGrid,
        scale_to_fit: bool,
    ) -> Result<(), PipelineError>
    where
        S: ImageStore,
        Y: CoopYield,
    {
        let (panel_w, panel_h) = self.link.dimensions();
        let side = grid.side();
        let block = if scale_to_fit {
            fitted_block(panel_w, panel_h, side)
        } else {
            self.config.grid_block_size
        };
        let shortest = panel_w.min(panel_h);
        if block == 0 || u32::from(side) * u32::from(block) > u32::from(shortest) {
            return Err(PipelineError::GridExceedsDisplay);
        }

        self.frame.clear(Color::White);
        let origin_x = centered_origin(panel_w, side, block);
        let origin_y = centered_origin(panel_h, side, block);
        render_grid(
            &mut self.frame,
            grid,
            block,
            origin_x,
            origin_y,
            Color::Black,
            pacer,
        );

        self.present_partial_frame(Orientation::Landscape)?;
        self.activity = Activity::ShowingSymbol;

        let mut writer = store.create(self.config.snapshot_name.as_str())?;
        bitmap::encode(&self.frame, &mut writer, pacer)?;
        self.current_image = self.config.snapshot_name.clone();
        Ok(())
    }

    /// Draw text lines top to bottom and show them with a full refresh.
    pub fn show_status_message<Y: CoopYield>(
        &mut self,
        pacer: &mut Y,
        lines: &[MessageLine<'_>],
    ) -> Result<(), PipelineError> {
        self.frame.clear(Color::White);
        let mut offset = 0i32;
        for line in lines {
            self.frame.draw_text(0, offset, line.text, line.font, Color::Black);
            offset += i32::from(line.font.height);
            pacer.yield_now();
        }
        let (width, height) = self.link.dimensions();
        self.link.orientation_init(Orientation::Portrait)?;
        self.link
            .write_frame(self.frame.raw_bytes(), 0, 0, width, height)?;
        self.link.present()?;
        self.link.wait_until_idle()?;
        Ok(())
    }

    /// Hand a request to the host timer, or park it when a deferred
    /// render is already outstanding.
    pub fn schedule_render<T: DeferredScheduler>(
        &mut self,
        scheduler: &mut T,
        request: RenderRequest,
    ) -> Result<ScheduleOutcome, PipelineError> {
        if self.deferred_outstanding || !self.pending.is_empty() {
            self.pending
                .push_back(request)
                .map_err(|_| PipelineError::QueueFull)?;
            self.arm_next(scheduler);
            return Ok(ScheduleOutcome::Queued);
        }
        let delay = self.delay_for(&request);
        scheduler.schedule(delay, request)?;
        self.deferred_outstanding = true;
        Ok(ScheduleOutcome::Scheduled)
    }

    /// Run a request whose timer fired, then arm the next parked one.
    ///
    /// The next request is armed even when this render fails, so one bad
    /// image cannot stall the queue.
    pub fn run_deferred<S, D, G, T, Y>(
        &mut self,
        store: &mut S,
        scans: &mut D,
        grids: &mut G,
        scheduler: &mut T,
        pacer: &mut Y,
        request: &RenderRequest,
    ) -> Result<RenderOutcome, PipelineError>
    where
        S: ImageStore,
        D: ScanlineDecoder,
        G: GridSource,
        T: DeferredScheduler,
        Y: CoopYield,
    {
        self.deferred_outstanding = false;
        let result = self.dispatch(store, scans, grids, pacer, request);
        self.arm_next(scheduler);
        result
    }

    fn dispatch<S, D, G, Y>(
        &mut self,
        store: &mut S,
        scans: &mut D,
        grids: &mut G,
        pacer: &mut Y,
        request: &RenderRequest,
    ) -> Result<RenderOutcome, PipelineError>
    where
        S: ImageStore,
        D: ScanlineDecoder,
        G: GridSource,
        Y: CoopYield,
    {
        match request {
            RenderRequest::StoredImage(name) => {
                self.render_stored_image(store, scans, pacer, name.as_str())
            }
            RenderRequest::Symbol(params) => {
                let mut grid = SymbolGrid::new(0)?;
                grids.generate(params, &mut grid)?;
                self.render_module_grid(store, pacer, &grid, params.scale_to_fit)?;
                Ok(RenderOutcome::Rendered)
            }
        }
    }

    fn arm_next<T: DeferredScheduler>(&mut self, scheduler: &mut T) {
        if self.deferred_outstanding {
            return;
        }
        if let Some(request) = self.pending.pop_front() {
            let delay = self.delay_for(&request);
            if scheduler.schedule(delay, request.clone()).is_ok() {
                self.deferred_outstanding = true;
            } else {
                // Keep it queued; a later schedule or run retries.
                let _ = self.pending.push_front(request);
            }
        }
    }

    fn delay_for(&self, request: &RenderRequest) -> u32 {
        match request {
            RenderRequest::StoredImage(_) => self.config.image_render_delay_ms,
            RenderRequest::Symbol(_) => self.config.grid_render_delay_ms,
        }
    }

    fn raster_bmp<S, Y>(
        &mut self,
        store: &mut S,
        pacer: &mut Y,
        name: &str,
    ) -> Result<(), PipelineError>
    where
        S: ImageStore,
        Y: CoopYield,
    {
        let mut reader = store.open(name)?;
        self.frame.clear(Color::White);
        bitmap::decode(&mut reader, &mut self.frame, 0, 0, pacer)?;
        Ok(())
    }

    fn raster_scan<S, D, Y>(
        &mut self,
        store: &mut S,
        scans: &mut D,
        pacer: &mut Y,
        name: &str,
    ) -> Result<(), PipelineError>
    where
        S: ImageStore,
        D: ScanlineDecoder,
        Y: CoopYield,
    {
        let mut reader = store.open(name)?;
        self.frame.clear(Color::White);
        let mut sink = FrameSink {
            frame: &mut self.frame,
            pacer,
        };
        scans.decode(&mut reader, &mut sink).map_err(PipelineError::Scan)?;
        Ok(())
    }

    /// Shared tail of every content render: re-init, full clear for a
    /// fresh base, then a flash-free partial refresh of the frame.
    fn present_partial_frame(&mut self, orientation: Orientation) -> Result<(), PipelineError> {
        self.link.orientation_init(orientation)?;
        self.link.clear()?;
        self.link.write_partial_frame(self.frame.raw_bytes())?;
        self.link.present_partial()?;
        self.link.wait_until_idle()?;
        Ok(())
    }

    fn remember_image(&mut self, name: &str) {
        self.current_image.clear();
        for ch in name.chars() {
            if self.current_image.push(ch).is_err() {
                break;
            }
        }
    }

    fn set_no_image(&mut self) {
        self.current_image.clear();
        let _ = self.current_image.push_str(NO_IMAGE);
    }
}

/// Adapts decoded scanlines onto the frame: zero samples keep the white
/// background, everything else is drawn as ink.
struct FrameSink<'a, Y: CoopYield, const N: usize> {
    frame: &'a mut FrameBuffer<N>,
    pacer: &'a mut Y,
}

impl<Y: CoopYield, const N: usize> RowSink for FrameSink<'_, Y, N> {
    fn push_row(&mut self, y: u16, pixels: &[u16]) {
        for (x, sample) in pixels.iter().enumerate() {
            if *sample != 0 {
                self.frame.set_pixel(x as i32, i32::from(y), Color::Black);
            }
        }
        self.pacer.yield_now();
    }
}
