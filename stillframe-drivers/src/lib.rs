//! Panel controller drivers for the stillframe firmware
//!
//! Each driver implements the [`PanelDevice`](stillframe_core::traits::PanelDevice)
//! command surface over `embedded-hal` 1.0 traits, so any board that can
//! hand over an SPI device and three GPIO lines can attach a panel.

#![no_std]
#![deny(unsafe_code)]

pub mod ssd1681;

pub use ssd1681::Ssd1681;
