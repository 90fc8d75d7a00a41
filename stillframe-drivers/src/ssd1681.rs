//! SSD1681 e-paper controller driver
//!
//! Drives the 1.54" 200x200 monochrome panel over 4-wire SPI (data/command
//! pin, reset pin, busy line). RAM polarity matches the raster crate: a set
//! bit releases the pixel to white.
//!
//! `present`/`present_partial` only kick the waveform; the controller holds
//! the busy line high until it settles, which `wait_until_idle` polls for.
//! There is no readback, so the sequencing layer above owns correctness.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;

use stillframe_core::traits::{Orientation, PanelDevice, PanelError};

pub const WIDTH: u16 = 200;
pub const HEIGHT: u16 = 200;

/// Packed bytes in one full frame.
pub const FRAME_BYTES: usize = (WIDTH as usize / 8) * HEIGHT as usize;

const RESET_SETTLE_MS: u32 = 10;
const SW_RESET_MS: u32 = 10;
const SLEEP_SETTLE_MS: u32 = 100;

// A full GC waveform runs around two seconds on this panel.
const REFRESH_TIMEOUT_MS: u32 = 5_000;
const BUSY_POLL_MS: u32 = 1;

// SSD1681 command set
mod cmd {
    pub const DRIVER_OUTPUT_CONTROL: u8 = 0x01;
    pub const DEEP_SLEEP: u8 = 0x10;
    pub const DATA_ENTRY_MODE: u8 = 0x11;
    pub const SW_RESET: u8 = 0x12;
    pub const TEMPERATURE_SENSOR: u8 = 0x18;
    pub const MASTER_ACTIVATION: u8 = 0x20;
    pub const DISPLAY_UPDATE_CONTROL_2: u8 = 0x22;
    pub const WRITE_RAM_BW: u8 = 0x24; // new frame plane
    pub const WRITE_RAM_RED: u8 = 0x26; // previous frame plane (differential)
    pub const BORDER_WAVEFORM: u8 = 0x3C;
    pub const SET_RAM_X_RANGE: u8 = 0x44;
    pub const SET_RAM_Y_RANGE: u8 = 0x45;
    pub const SET_RAM_X_COUNTER: u8 = 0x4E;
    pub const SET_RAM_Y_COUNTER: u8 = 0x4F;
}

// Display update control 2 sequences
const UPDATE_FULL: u8 = 0xF7; // Mode 1, GC waveform
const UPDATE_PARTIAL: u8 = 0xFC; // Mode 2, DU waveform

const BORDER_FULL: u8 = 0x01;
const BORDER_PARTIAL: u8 = 0x80;

/// SSD1681 over an owned SPI device, two output pins and the busy input.
pub struct Ssd1681<SPI, DC, RST, BUSY, D> {
    spi: SPI,
    dc: DC,
    rst: RST,
    busy: BUSY,
    delay: D,
    orientation: Orientation,
}

impl<SPI, DC, RST, BUSY, D> Ssd1681<SPI, DC, RST, BUSY, D>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
    D: DelayNs,
{
    pub fn new(spi: SPI, dc: DC, rst: RST, busy: BUSY, delay: D) -> Self {
        Self {
            spi,
            dc,
            rst,
            busy,
            delay,
            orientation: Orientation::Portrait,
        }
    }

    fn send_command(&mut self, command: u8) -> Result<(), PanelError> {
        self.dc.set_low().map_err(|_| PanelError::Bus)?;
        self.spi.write(&[command]).map_err(|_| PanelError::Bus)?;
        self.dc.set_high().map_err(|_| PanelError::Bus)
    }

    fn send_data(&mut self, data: &[u8]) -> Result<(), PanelError> {
        self.dc.set_high().map_err(|_| PanelError::Bus)?;
        self.spi.write(data).map_err(|_| PanelError::Bus)
    }

    fn hardware_reset(&mut self) {
        let _ = self.rst.set_high();
        self.delay.delay_ms(RESET_SETTLE_MS);
        let _ = self.rst.set_low();
        self.delay.delay_ms(RESET_SETTLE_MS);
        let _ = self.rst.set_high();
        self.delay.delay_ms(RESET_SETTLE_MS);
    }

    fn wait_busy(&mut self, timeout_ms: u32) -> Result<(), PanelError> {
        let mut elapsed = 0;
        loop {
            if !self.busy.is_high().map_err(|_| PanelError::Bus)? {
                return Ok(());
            }
            if elapsed >= timeout_ms {
                return Err(PanelError::Timeout);
            }
            self.delay.delay_ms(BUSY_POLL_MS);
            elapsed += BUSY_POLL_MS;
        }
    }

    /// Program data entry mode, RAM window and address counters for a
    /// byte-aligned window. Landscape mirrors the gate scan, so its Y
    /// addresses run downward from the flipped origin.
    fn set_ram_window(&mut self, x: u16, y: u16, w: u16, h: u16) -> Result<(), PanelError> {
        let x_start = (x / 8) as u8;
        let x_end = ((x + w - 1) / 8) as u8;
        match self.orientation {
            Orientation::Portrait => {
                // X and Y both increment
                self.send_command(cmd::DATA_ENTRY_MODE)?;
                self.send_data(&[0x03])?;

                self.send_command(cmd::SET_RAM_X_RANGE)?;
                self.send_data(&[x_start, x_end])?;

                let y_end = y + h - 1;
                self.send_command(cmd::SET_RAM_Y_RANGE)?;
                self.send_data(&[
                    (y & 0xFF) as u8,
                    (y >> 8) as u8,
                    (y_end & 0xFF) as u8,
                    (y_end >> 8) as u8,
                ])?;

                self.send_command(cmd::SET_RAM_X_COUNTER)?;
                self.send_data(&[x_start])?;

                self.send_command(cmd::SET_RAM_Y_COUNTER)?;
                self.send_data(&[(y & 0xFF) as u8, (y >> 8) as u8])?;
            }
            Orientation::Landscape => {
                // X increments, Y decrements against the flipped gate order
                self.send_command(cmd::DATA_ENTRY_MODE)?;
                self.send_data(&[0x01])?;

                self.send_command(cmd::SET_RAM_X_RANGE)?;
                self.send_data(&[x_start, x_end])?;

                let y_flipped = HEIGHT - y - h;
                let y_top = y_flipped + h - 1;
                self.send_command(cmd::SET_RAM_Y_RANGE)?;
                self.send_data(&[
                    (y_top & 0xFF) as u8,
                    (y_top >> 8) as u8,
                    (y_flipped & 0xFF) as u8,
                    (y_flipped >> 8) as u8,
                ])?;

                self.send_command(cmd::SET_RAM_X_COUNTER)?;
                self.send_data(&[x_start])?;

                self.send_command(cmd::SET_RAM_Y_COUNTER)?;
                self.send_data(&[(y_top & 0xFF) as u8, (y_top >> 8) as u8])?;
            }
        }
        Ok(())
    }

    fn write_plane(&mut self, ram_cmd: u8, frame: &[u8]) -> Result<(), PanelError> {
        self.set_ram_window(0, 0, WIDTH, HEIGHT)?;
        self.send_command(ram_cmd)?;
        self.send_data(frame)
    }

    fn fill_plane(&mut self, ram_cmd: u8, value: u8) -> Result<(), PanelError> {
        self.set_ram_window(0, 0, WIDTH, HEIGHT)?;
        self.send_command(ram_cmd)?;
        let row = [value; (WIDTH / 8) as usize];
        for _ in 0..HEIGHT {
            self.send_data(&row)?;
        }
        Ok(())
    }

    fn kick_update(&mut self, sequence: u8) -> Result<(), PanelError> {
        self.send_command(cmd::DISPLAY_UPDATE_CONTROL_2)?;
        self.send_data(&[sequence])?;
        self.send_command(cmd::MASTER_ACTIVATION)
    }
}

impl<SPI, DC, RST, BUSY, D> PanelDevice for Ssd1681<SPI, DC, RST, BUSY, D>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
    D: DelayNs,
{
    fn dimensions(&self) -> (u16, u16) {
        (WIDTH, HEIGHT)
    }

    fn orientation_init(&mut self, direction: Orientation) -> Result<(), PanelError> {
        self.orientation = direction;
        self.hardware_reset();
        self.wait_busy(REFRESH_TIMEOUT_MS)?;

        self.send_command(cmd::SW_RESET)?;
        self.delay.delay_ms(SW_RESET_MS);
        self.wait_busy(REFRESH_TIMEOUT_MS)?;

        // 200 gates, no interlace
        self.send_command(cmd::DRIVER_OUTPUT_CONTROL)?;
        self.send_data(&[((HEIGHT - 1) & 0xFF) as u8, ((HEIGHT - 1) >> 8) as u8, 0x00])?;

        self.send_command(cmd::BORDER_WAVEFORM)?;
        self.send_data(&[BORDER_FULL])?;

        // Internal temperature sensor
        self.send_command(cmd::TEMPERATURE_SENSOR)?;
        self.send_data(&[0x80])?;

        self.set_ram_window(0, 0, WIDTH, HEIGHT)?;
        self.wait_busy(REFRESH_TIMEOUT_MS)
    }

    fn clear(&mut self) -> Result<(), PanelError> {
        // White in both planes so the following refresh leaves a clean
        // base for differential updates.
        self.send_command(cmd::BORDER_WAVEFORM)?;
        self.send_data(&[BORDER_FULL])?;
        self.fill_plane(cmd::WRITE_RAM_BW, 0xFF)?;
        self.fill_plane(cmd::WRITE_RAM_RED, 0xFF)?;
        self.kick_update(UPDATE_FULL)?;
        self.wait_busy(REFRESH_TIMEOUT_MS)
    }

    fn write_frame(
        &mut self,
        frame: &[u8],
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    ) -> Result<(), PanelError> {
        // RAM X addresses step in whole bytes.
        if x % 8 != 0 || width % 8 != 0 {
            return Err(PanelError::Alignment);
        }
        self.set_ram_window(x, y, width, height)?;
        self.send_command(cmd::WRITE_RAM_BW)?;
        self.send_data(frame)
    }

    fn write_partial_frame(&mut self, frame: &[u8]) -> Result<(), PanelError> {
        self.send_command(cmd::BORDER_WAVEFORM)?;
        self.send_data(&[BORDER_PARTIAL])?;
        self.write_plane(cmd::WRITE_RAM_BW, frame)
    }

    fn present(&mut self) -> Result<(), PanelError> {
        self.kick_update(UPDATE_FULL)
    }

    fn present_partial(&mut self) -> Result<(), PanelError> {
        self.kick_update(UPDATE_PARTIAL)
    }

    fn wait_until_idle(&mut self) -> Result<(), PanelError> {
        self.wait_busy(REFRESH_TIMEOUT_MS)
    }

    fn sleep(&mut self) -> Result<(), PanelError> {
        self.send_command(cmd::DEEP_SLEEP)?;
        self.send_data(&[0x01])?;
        self.delay.delay_ms(SLEEP_SETTLE_MS);
        Ok(())
    }
}

impl<SPI, DC, RST, BUSY, D> Ssd1681<SPI, DC, RST, BUSY, D>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin + embedded_hal_async::digital::Wait,
    D: DelayNs,
{
    /// Awaits the busy line instead of spinning, letting the executor run
    /// other tasks during the one-to-two-second refresh.
    pub async fn wait_until_idle_async(&mut self) -> Result<(), PanelError> {
        self.busy.wait_for_low().await.map_err(|_| PanelError::Bus)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use core::convert::Infallible;
    use embedded_hal::spi::Operation;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    /// One SPI write, split by the state of the D/C line.
    #[derive(Debug, Clone, PartialEq, Eq)]
    enum BusWrite {
        Command(u8),
        Data(Vec<u8>),
    }

    #[derive(Default)]
    struct BusState {
        dc_high: bool,
        writes: Vec<BusWrite>,
    }

    type SharedBus = Rc<RefCell<BusState>>;

    struct MockSpi(SharedBus);

    impl embedded_hal::spi::ErrorType for MockSpi {
        type Error = Infallible;
    }

    impl SpiDevice for MockSpi {
        fn transaction(
            &mut self,
            operations: &mut [Operation<'_, u8>],
        ) -> Result<(), Self::Error> {
            let mut state = self.0.borrow_mut();
            for op in operations {
                if let Operation::Write(bytes) = op {
                    let write = if state.dc_high {
                        BusWrite::Data(bytes.to_vec())
                    } else {
                        BusWrite::Command(bytes[0])
                    };
                    state.writes.push(write);
                }
            }
            Ok(())
        }
    }

    struct MockDc(SharedBus);

    impl embedded_hal::digital::ErrorType for MockDc {
        type Error = Infallible;
    }

    impl OutputPin for MockDc {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.0.borrow_mut().dc_high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.0.borrow_mut().dc_high = true;
            Ok(())
        }
    }

    struct MockRst;

    impl embedded_hal::digital::ErrorType for MockRst {
        type Error = Infallible;
    }

    impl OutputPin for MockRst {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    /// Busy line that stays high for a fixed number of polls.
    struct MockBusy {
        busy_polls: u32,
    }

    impl embedded_hal::digital::ErrorType for MockBusy {
        type Error = Infallible;
    }

    impl InputPin for MockBusy {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            if self.busy_polls > 0 {
                self.busy_polls -= 1;
                return Ok(true);
            }
            Ok(false)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            self.is_high().map(|high| !high)
        }
    }

    struct MockDelay;

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    type MockPanel = Ssd1681<MockSpi, MockDc, MockRst, MockBusy, MockDelay>;

    fn panel(busy_polls: u32) -> (MockPanel, SharedBus) {
        let bus: SharedBus = Rc::default();
        let driver = Ssd1681::new(
            MockSpi(bus.clone()),
            MockDc(bus.clone()),
            MockRst,
            MockBusy { busy_polls },
            MockDelay,
        );
        (driver, bus)
    }

    fn commands(bus: &SharedBus) -> Vec<u8> {
        bus.borrow()
            .writes
            .iter()
            .filter_map(|write| match write {
                BusWrite::Command(command) => Some(*command),
                BusWrite::Data(_) => None,
            })
            .collect()
    }

    fn data_after(bus: &SharedBus, command: u8) -> Vec<u8> {
        let state = bus.borrow();
        let index = state
            .writes
            .iter()
            .position(|write| *write == BusWrite::Command(command))
            .expect("command on bus");
        match &state.writes[index + 1] {
            BusWrite::Data(bytes) => bytes.clone(),
            BusWrite::Command(_) => panic!("no data after command"),
        }
    }

    #[test]
    fn test_init_sequence() {
        let (mut driver, bus) = panel(0);
        driver.orientation_init(Orientation::Portrait).unwrap();

        let commands = commands(&bus);
        assert_eq!(commands[0], cmd::SW_RESET);
        assert!(commands.contains(&cmd::DRIVER_OUTPUT_CONTROL));
        assert!(commands.contains(&cmd::DATA_ENTRY_MODE));
        assert!(commands.contains(&cmd::SET_RAM_X_RANGE));
        assert!(commands.contains(&cmd::SET_RAM_Y_RANGE));

        // 199 gates counted from zero
        assert_eq!(data_after(&bus, cmd::DRIVER_OUTPUT_CONTROL), &[0xC7, 0x00, 0x00]);
        // Portrait: X and Y increment
        assert_eq!(data_after(&bus, cmd::DATA_ENTRY_MODE), &[0x03]);
        // 25 byte columns
        assert_eq!(data_after(&bus, cmd::SET_RAM_X_RANGE), &[0x00, 0x18]);
        assert_eq!(
            data_after(&bus, cmd::SET_RAM_Y_RANGE),
            &[0x00, 0x00, 0xC7, 0x00]
        );
    }

    #[test]
    fn test_landscape_flips_y_window() {
        let (mut driver, bus) = panel(0);
        driver.orientation_init(Orientation::Landscape).unwrap();

        assert_eq!(data_after(&bus, cmd::DATA_ENTRY_MODE), &[0x01]);
        // Y range runs from the top flipped address downward.
        assert_eq!(
            data_after(&bus, cmd::SET_RAM_Y_RANGE),
            &[0xC7, 0x00, 0x00, 0x00]
        );
        assert_eq!(data_after(&bus, cmd::SET_RAM_Y_COUNTER), &[0xC7, 0x00]);
    }

    #[test]
    fn test_clear_fills_both_planes() {
        let (mut driver, bus) = panel(0);
        driver.clear().unwrap();

        let commands = commands(&bus);
        assert!(commands.contains(&cmd::WRITE_RAM_BW));
        assert!(commands.contains(&cmd::WRITE_RAM_RED));
        assert_eq!(
            data_after(&bus, cmd::DISPLAY_UPDATE_CONTROL_2),
            &[UPDATE_FULL]
        );
        assert_eq!(*commands.last().unwrap(), cmd::MASTER_ACTIVATION);

        // One full plane of white rows after each RAM command.
        let state = bus.borrow();
        let white_bytes: usize = state
            .writes
            .iter()
            .filter_map(|write| match write {
                BusWrite::Data(bytes) if bytes.iter().all(|&b| b == 0xFF) => Some(bytes.len()),
                _ => None,
            })
            .sum();
        assert!(white_bytes >= 2 * FRAME_BYTES);
    }

    #[test]
    fn test_write_frame_window() {
        let (mut driver, bus) = panel(0);
        let frame = [0xA5u8; 16]; // 16x8 window
        driver.write_frame(&frame, 8, 4, 16, 8).unwrap();

        assert_eq!(data_after(&bus, cmd::SET_RAM_X_RANGE), &[0x01, 0x02]);
        assert_eq!(
            data_after(&bus, cmd::SET_RAM_Y_RANGE),
            &[0x04, 0x00, 0x0B, 0x00]
        );
        assert_eq!(data_after(&bus, cmd::WRITE_RAM_BW), frame.to_vec());
    }

    #[test]
    fn test_unaligned_window_rejected() {
        let (mut driver, bus) = panel(0);
        let frame = [0u8; 16];
        assert_eq!(
            driver.write_frame(&frame, 4, 0, 16, 8),
            Err(PanelError::Alignment)
        );
        assert_eq!(
            driver.write_frame(&frame, 0, 0, 12, 8),
            Err(PanelError::Alignment)
        );
        assert!(bus.borrow().writes.is_empty());
    }

    #[test]
    fn test_partial_present_uses_du_waveform() {
        let (mut driver, bus) = panel(0);
        let frame = [0u8; FRAME_BYTES];
        driver.write_partial_frame(&frame).unwrap();
        driver.present_partial().unwrap();

        assert_eq!(data_after(&bus, cmd::BORDER_WAVEFORM), &[BORDER_PARTIAL]);
        assert_eq!(
            data_after(&bus, cmd::DISPLAY_UPDATE_CONTROL_2),
            &[UPDATE_PARTIAL]
        );
        assert_eq!(*commands(&bus).last().unwrap(), cmd::MASTER_ACTIVATION);
    }

    #[test]
    fn test_present_does_not_wait() {
        // Busy stays high; present must still return immediately.
        let (mut driver, bus) = panel(u32::MAX);
        driver.present().unwrap();
        assert_eq!(
            data_after(&bus, cmd::DISPLAY_UPDATE_CONTROL_2),
            &[UPDATE_FULL]
        );
    }

    #[test]
    fn test_wait_until_idle_polls_busy() {
        let (mut driver, _bus) = panel(40);
        assert_eq!(driver.wait_until_idle(), Ok(()));
    }

    #[test]
    fn test_busy_timeout() {
        let (mut driver, _bus) = panel(u32::MAX);
        assert_eq!(driver.wait_until_idle(), Err(PanelError::Timeout));
    }

    #[test]
    fn test_sleep_command() {
        let (mut driver, bus) = panel(0);
        driver.sleep().unwrap();
        assert_eq!(data_after(&bus, cmd::DEEP_SLEEP), &[0x01]);
    }
}
