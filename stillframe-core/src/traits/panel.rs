//! Panel device abstraction
//!
//! The command surface a monochrome e-paper controller exposes to the
//! sequencing layer. Implementations live in driver crates; tests use a
//! recording fake.

/// Addressing direction selected at panel init.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Orientation {
    /// Native gate scan direction
    Portrait,
    /// Mirrored scan for content built with swapped axes
    Landscape,
}

/// Failure surfaced by a panel device implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelError {
    /// SPI or control line failure
    Bus,
    /// Busy line did not release within the device timeout
    Timeout,
    /// Write window not representable by the controller
    Alignment,
}

/// Command surface of a monochrome e-paper panel.
///
/// `present`/`present_partial` only kick the refresh; the panel stays
/// busy until `wait_until_idle` observes the busy line release. There is
/// no frame readback, so callers rely on command ordering alone.
pub trait PanelDevice {
    /// Panel width and height in pixels.
    fn dimensions(&self) -> (u16, u16);

    /// Reset and initialize the controller for the given direction.
    fn orientation_init(&mut self, direction: Orientation) -> Result<(), PanelError>;

    /// Write white to the full panel and run a full refresh, leaving a
    /// base image partial refreshes can diff against.
    fn clear(&mut self) -> Result<(), PanelError>;

    /// Stage packed 1-bpp rows into the controller RAM window at
    /// `(x, y)`, `width` by `height` pixels.
    fn write_frame(
        &mut self,
        frame: &[u8],
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    ) -> Result<(), PanelError>;

    /// Stage a full-size frame for a flash-free partial refresh.
    fn write_partial_frame(&mut self, frame: &[u8]) -> Result<(), PanelError>;

    /// Kick a full refresh of the staged frame.
    fn present(&mut self) -> Result<(), PanelError>;

    /// Kick a partial refresh of the staged frame.
    fn present_partial(&mut self) -> Result<(), PanelError>;

    /// Block until the busy line releases.
    fn wait_until_idle(&mut self) -> Result<(), PanelError>;

    /// Enter deep sleep. The panel keeps showing its last image.
    fn sleep(&mut self) -> Result<(), PanelError>;
}
