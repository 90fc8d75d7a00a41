//! Pipeline configuration types

use heapless::String;
use stillframe_raster::BitGrid;

/// Longest stored image name, including the extension.
pub const MAX_IMAGE_NAME: usize = 32;

/// Longest symbol payload text.
pub const MAX_SYMBOL_TEXT: usize = 128;

/// Pending render queue depth.
pub const MAX_PENDING_RENDERS: usize = 4;

/// Modules per side of the largest supported symbol (a version 40 QR).
pub const MAX_SYMBOL_SIDE: u16 = 177;

/// Packed bytes covering the largest supported symbol.
pub const SYMBOL_GRID_BYTES: usize =
    (MAX_SYMBOL_SIDE as usize * MAX_SYMBOL_SIDE as usize + 7) / 8;

/// Grid storage sized for any supported symbol.
pub type SymbolGrid = BitGrid<SYMBOL_GRID_BYTES>;

/// Tunables for the render pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PipelineConfig {
    /// Module block size in pixels when not scaling to fit
    pub grid_block_size: u16,
    /// Delay before a deferred symbol render runs
    pub grid_render_delay_ms: u32,
    /// Delay before a freshly stored image is rendered
    pub image_render_delay_ms: u32,
    /// Partial refreshes after which a full clear is advised
    pub partial_refresh_limit: u32,
    /// Name symbol snapshots are stored under
    pub snapshot_name: String<MAX_IMAGE_NAME>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            grid_block_size: 3,
            grid_render_delay_ms: 500,
            image_render_delay_ms: 2000,
            // Roughly a day at one partial refresh per minute
            partial_refresh_limit: 1440,
            snapshot_name: String::try_from("generated-qr-code.bmp").unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stillframe_raster::ModuleGrid;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.grid_block_size, 3);
        assert_eq!(config.grid_render_delay_ms, 500);
        assert_eq!(config.image_render_delay_ms, 2000);
        assert_eq!(config.snapshot_name.as_str(), "generated-qr-code.bmp");
    }

    #[test]
    fn test_symbol_grid_capacity() {
        assert!(SymbolGrid::capacity_modules() >= 177 * 177);
        let grid = SymbolGrid::new(MAX_SYMBOL_SIDE).unwrap();
        assert_eq!(grid.side(), 177);
    }
}
