//! Command-order enforcement for the panel link

use crate::traits::{Orientation, PanelDevice, PanelError};

/// Host-side model of the panel controller.
///
/// - `Uninitialized`: power-on, nothing configured yet
/// - `Idle`: configured, RAM writable, no refresh running
/// - `Busy`: a refresh waveform is running
/// - `PartialMode`: idle, and the last refresh was partial
/// - `Sleeping`: deep sleep, only re-init wakes the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayState {
    Uninitialized,
    Idle,
    Busy,
    PartialMode,
    Sleeping,
}

impl DisplayState {
    /// True when the controller is configured and not mid-refresh.
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Idle | Self::PartialMode)
    }
}

/// Operation names for sequencing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelOp {
    OrientationInit,
    Clear,
    WriteFrame,
    WritePartialFrame,
    Present,
    PresentPartial,
    WaitUntilIdle,
    Sleep,
}

/// Waveform class of a staged or running refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RefreshKind {
    Full,
    Partial,
}

/// Errors surfaced by [`PanelLink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// The operation is not legal in the current state.
    SequenceViolation { state: DisplayState, op: PanelOp },
    /// Buffer length or window does not match the panel.
    FrameSizeMismatch,
    /// The device itself reported a failure.
    Device(PanelError),
}

impl From<PanelError> for LinkError {
    fn from(err: PanelError) -> Self {
        Self::Device(err)
    }
}

/// Wraps a [`PanelDevice`] and rejects out-of-order commands before they
/// reach the bus.
///
/// A refresh is staged by a RAM write, kicked by a present, and settled by
/// a wait. Partial writes additionally require a base image, which only a
/// hardware clear establishes and a re-init invalidates.
pub struct PanelLink<P: PanelDevice> {
    device: P,
    state: DisplayState,
    staged: Option<RefreshKind>,
    in_flight: Option<RefreshKind>,
    base_valid: bool,
    partials_since_clear: u32,
}

impl<P: PanelDevice> PanelLink<P> {
    pub fn new(device: P) -> Self {
        Self {
            device,
            state: DisplayState::Uninitialized,
            staged: None,
            in_flight: None,
            base_valid: false,
            partials_since_clear: 0,
        }
    }

    pub fn state(&self) -> DisplayState {
        self.state
    }

    pub fn dimensions(&self) -> (u16, u16) {
        self.device.dimensions()
    }

    pub fn device(&self) -> &P {
        &self.device
    }

    /// Raw device access. Commands issued here bypass sequencing, so the
    /// tracked state can go stale.
    pub fn device_mut(&mut self) -> &mut P {
        &mut self.device
    }

    /// Partial refreshes completed since the last hardware clear.
    pub fn partial_refreshes(&self) -> u32 {
        self.partials_since_clear
    }

    /// Advises a full clear once enough partials have accumulated to
    /// risk ghosting.
    pub fn needs_full_clear(&self, limit: u32) -> bool {
        self.partials_since_clear >= limit
    }

    fn violation(&self, op: PanelOp) -> LinkError {
        LinkError::SequenceViolation {
            state: self.state,
            op,
        }
    }

    fn check_window(
        &self,
        len: usize,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    ) -> Result<(), LinkError> {
        let (panel_w, panel_h) = self.device.dimensions();
        let bits = usize::from(width) * usize::from(height);
        if (bits + 7) / 8 != len
            || u32::from(x) + u32::from(width) > u32::from(panel_w)
            || u32::from(y) + u32::from(height) > u32::from(panel_h)
        {
            return Err(LinkError::FrameSizeMismatch);
        }
        Ok(())
    }

    /// Configures the controller for the given orientation.
    ///
    /// Legal from every state except `Busy`, and the only way out of
    /// `Sleeping`. Drops any staged write and invalidates the partial base.
    pub fn orientation_init(&mut self, orientation: Orientation) -> Result<(), LinkError> {
        if self.state == DisplayState::Busy {
            return Err(self.violation(PanelOp::OrientationInit));
        }
        self.device.orientation_init(orientation)?;
        self.state = DisplayState::Idle;
        self.staged = None;
        self.base_valid = false;
        Ok(())
    }

    /// Clears the panel and establishes a base for partial refreshes.
    pub fn clear(&mut self) -> Result<(), LinkError> {
        if !self.state.is_settled() {
            return Err(self.violation(PanelOp::Clear));
        }
        self.device.clear()?;
        self.state = DisplayState::Idle;
        self.staged = None;
        self.base_valid = true;
        self.partials_since_clear = 0;
        Ok(())
    }

    /// Stages packed rows for a full refresh window.
    pub fn write_frame(
        &mut self,
        frame: &[u8],
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    ) -> Result<(), LinkError> {
        if !self.state.is_settled() || self.staged.is_some() {
            return Err(self.violation(PanelOp::WriteFrame));
        }
        self.check_window(frame.len(), x, y, width, height)?;
        self.device.write_frame(frame, x, y, width, height)?;
        self.staged = Some(RefreshKind::Full);
        Ok(())
    }

    /// Stages a full-panel buffer for a partial refresh.
    pub fn write_partial_frame(&mut self, frame: &[u8]) -> Result<(), LinkError> {
        if !self.state.is_settled() || self.staged.is_some() || !self.base_valid {
            return Err(self.violation(PanelOp::WritePartialFrame));
        }
        let (panel_w, panel_h) = self.device.dimensions();
        let bits = usize::from(panel_w) * usize::from(panel_h);
        if (bits + 7) / 8 != frame.len() {
            return Err(LinkError::FrameSizeMismatch);
        }
        self.device.write_partial_frame(frame)?;
        self.staged = Some(RefreshKind::Partial);
        Ok(())
    }

    /// Kicks a full refresh of the staged frame. Returns immediately; the
    /// panel is busy until [`wait_until_idle`](Self::wait_until_idle).
    pub fn present(&mut self) -> Result<(), LinkError> {
        if !self.state.is_settled() || self.staged != Some(RefreshKind::Full) {
            return Err(self.violation(PanelOp::Present));
        }
        self.device.present()?;
        self.staged = None;
        self.in_flight = Some(RefreshKind::Full);
        self.state = DisplayState::Busy;
        Ok(())
    }

    /// Kicks a partial refresh of the staged frame.
    pub fn present_partial(&mut self) -> Result<(), LinkError> {
        if !self.state.is_settled() || self.staged != Some(RefreshKind::Partial) {
            return Err(self.violation(PanelOp::PresentPartial));
        }
        self.device.present_partial()?;
        self.staged = None;
        self.in_flight = Some(RefreshKind::Partial);
        self.state = DisplayState::Busy;
        Ok(())
    }

    /// Blocks until the controller reports idle.
    ///
    /// From `Busy` this settles the running refresh. From `Idle` or
    /// `PartialMode` it is a legal no-op settle that abandons any staged
    /// write rather than carrying it across the wait.
    pub fn wait_until_idle(&mut self) -> Result<(), LinkError> {
        match self.state {
            DisplayState::Busy => {
                self.device.wait_until_idle()?;
                match self.in_flight.take() {
                    Some(RefreshKind::Partial) => {
                        self.partials_since_clear += 1;
                        self.state = DisplayState::PartialMode;
                    }
                    _ => self.state = DisplayState::Idle,
                }
                Ok(())
            }
            DisplayState::Idle | DisplayState::PartialMode => {
                self.device.wait_until_idle()?;
                self.staged = None;
                Ok(())
            }
            DisplayState::Uninitialized | DisplayState::Sleeping => {
                Err(self.violation(PanelOp::WaitUntilIdle))
            }
        }
    }

    /// Puts the controller into deep sleep.
    pub fn sleep(&mut self) -> Result<(), LinkError> {
        if !self.state.is_settled() {
            return Err(self.violation(PanelOp::Sleep));
        }
        self.device.sleep()?;
        self.state = DisplayState::Sleeping;
        self.staged = None;
        Ok(())
    }
}
