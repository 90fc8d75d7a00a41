//! Render request descriptors

use heapless::String;

use crate::config::{MAX_IMAGE_NAME, MAX_SYMBOL_TEXT};

/// Parameters for a generated symbol render.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridParams {
    /// Symbol version hint passed through to the generator
    pub version: u8,
    /// Error correction level hint
    pub ecc_level: u8,
    /// Payload text to encode
    pub text: String<MAX_SYMBOL_TEXT>,
    /// Scale modules to fill the panel instead of using the fixed block size
    pub scale_to_fit: bool,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            version: 5,
            ecc_level: 0,
            text: String::new(),
            scale_to_fit: true,
        }
    }
}

/// A render the pipeline has been asked to perform, now or later.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RenderRequest {
    /// Draw a named image from the store
    StoredImage(String<MAX_IMAGE_NAME>),
    /// Generate and draw a module grid
    Symbol(GridParams),
}
