//! Board-agnostic core logic for the stillframe e-paper frame
//!
//! This crate contains all pipeline logic that does not depend on a
//! specific panel controller or host platform:
//!
//! - Hardware and platform abstraction traits (panel, storage, scheduling)
//! - Panel sequencing state machine
//! - Image pipeline orchestration (stored images, generated symbols,
//!   status messages, deferred renders)
//! - Configuration type definitions
//! - Setup network provisioning helpers

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod display;
pub mod pipeline;
pub mod provision;
pub mod traits;

#[cfg(test)]
mod testutil;
