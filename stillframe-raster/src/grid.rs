//! Module grid rendering
//!
//! Turns a square boolean matrix (a generated symbol such as a QR code)
//! into filled blocks on the framebuffer. One dark module becomes one
//! `block x block` square.

use crate::buffer::{CapacityError, FrameBuffer};
use crate::color::Color;
use crate::coop::CoopYield;

/// Square boolean matrix produced by a symbol generator.
pub trait ModuleGrid {
    /// Modules per side.
    fn side(&self) -> u16;

    /// Whether the module at (x, y) is dark. Out-of-range queries are false.
    fn module(&self, x: u16, y: u16) -> bool;
}

/// Packed storage for a module grid, one bit per module, row major,
/// most significant bit first.
pub struct BitGrid<const BYTES: usize> {
    side: u16,
    bits: [u8; BYTES],
}

impl<const BYTES: usize> BitGrid<BYTES> {
    /// Total modules the backing array can hold.
    pub const fn capacity_modules() -> usize {
        BYTES * 8
    }

    /// All-light grid with the given side length.
    pub fn new(side: u16) -> Result<Self, CapacityError> {
        let mut grid = Self {
            side: 0,
            bits: [0; BYTES],
        };
        grid.reset(side)?;
        Ok(grid)
    }

    /// Clear every module and adopt a new side length.
    pub fn reset(&mut self, side: u16) -> Result<(), CapacityError> {
        if side as usize * side as usize > Self::capacity_modules() {
            return Err(CapacityError {
                width: side,
                height: side,
            });
        }
        self.side = side;
        self.bits.fill(0);
        Ok(())
    }

    /// Mark the module at (x, y) dark. Out-of-range coordinates are ignored.
    pub fn set(&mut self, x: u16, y: u16) {
        if x >= self.side || y >= self.side {
            return;
        }
        let bit = y as usize * self.side as usize + x as usize;
        self.bits[bit / 8] |= 0x80 >> (bit % 8);
    }
}

impl<const BYTES: usize> ModuleGrid for BitGrid<BYTES> {
    fn side(&self) -> u16 {
        self.side
    }

    fn module(&self, x: u16, y: u16) -> bool {
        if x >= self.side || y >= self.side {
            return false;
        }
        let bit = y as usize * self.side as usize + x as usize;
        self.bits[bit / 8] & (0x80 >> (bit % 8)) != 0
    }
}

/// Origin that centers `side` modules of `block` pixels on a span.
///
/// Negative when the grid does not fit; callers must reject that case
/// before touching the panel.
pub const fn centered_origin(span: u16, side: u16, block: u16) -> i32 {
    (span as i32 - side as i32 * block as i32) / 2
}

/// Largest block size that fits the grid inside the given bounds. Zero
/// when even 1-pixel modules would not fit.
pub const fn fitted_block(width: u16, height: u16, side: u16) -> u16 {
    if side == 0 {
        return 0;
    }
    let min = if width < height { width } else { height };
    min / side
}

/// Draw each dark module as a filled `block` square at
/// `origin + module_index * block`. The yield hook runs once per module
/// row. A zero block size draws nothing.
pub fn render_grid<const N: usize>(
    frame: &mut FrameBuffer<N>,
    grid: &impl ModuleGrid,
    block: u16,
    origin_x: i32,
    origin_y: i32,
    color: Color,
    pacer: &mut impl CoopYield,
) {
    if block == 0 {
        return;
    }
    let block = i32::from(block);
    for my in 0..grid.side() {
        let y = origin_y + i32::from(my) * block;
        for mx in 0..grid.side() {
            if grid.module(mx, my) {
                let x = origin_x + i32::from(mx) * block;
                frame.fill_rect(x, y, x + block - 1, y + block - 1, color);
            }
        }
        pacer.yield_now();
    }
}
