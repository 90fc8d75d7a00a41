//! Streaming BMP codec for packed monochrome frames
//!
//! Handles the 24-bit uncompressed subset the panel pipeline works with:
//!
//! ```text
//! offset 0   file header   "BM", file size, pixel data offset
//! offset 14  info header   size 40, width, height, planes 1, depth 24
//! offset 54  pixel rows    BGR triplets, each row padded to 4 bytes
//! ```
//!
//! Decoding streams rows through a small fixed scratch window and
//! thresholds every pixel to black or white. Encoding writes the exact
//! inverse mapping, so decoding a snapshot reproduces the frame that
//! produced it.

#![no_std]
#![deny(unsafe_code)]

pub mod decode;
pub mod encode;
pub mod header;

#[cfg(test)]
mod testio;

pub use decode::{decode, SCRATCH_PIXELS};
pub use encode::encode;
pub use header::{BmpError, BmpInfo};
