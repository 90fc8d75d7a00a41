//! Packed monochrome raster primitives for small e-paper panels
//!
//! Everything a 1-bit-per-pixel display pipeline draws with:
//!
//! - Fixed-capacity framebuffer with mutable logical bounds
//! - Two-level color with the panel RAM bit convention
//! - Fixed-cell font blitting from flash-resident glyph tables
//! - Module-grid storage and block renderer for generated symbols
//! - Cooperative yield hook for long row loops

#![no_std]
#![deny(unsafe_code)]

pub mod buffer;
pub mod color;
pub mod coop;
pub mod font;
pub mod grid;

pub use buffer::{CapacityError, FrameBuffer};
pub use color::Color;
pub use coop::{CoopYield, NoYield};
pub use font::Font;
pub use grid::{centered_origin, fitted_block, render_grid, BitGrid, ModuleGrid};
