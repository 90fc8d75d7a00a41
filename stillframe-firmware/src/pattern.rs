//! Built-in test pattern for panel bring-up

use stillframe_core::config::SymbolGrid;
use stillframe_core::pipeline::GridParams;
use stillframe_core::traits::{GridError, GridSource};

/// Grid source producing a checkerboard, standing in for a symbol
/// generator until one is wired up.
pub struct CheckerSource {
    pub side: u16,
}

impl GridSource for CheckerSource {
    fn generate(&mut self, _params: &GridParams, grid: &mut SymbolGrid) -> Result<(), GridError> {
        grid.reset(self.side).map_err(|_| GridError::TooLarge)?;
        for y in 0..self.side {
            for x in 0..self.side {
                if (x + y) % 2 == 0 {
                    grid.set(x, y);
                }
            }
        }
        Ok(())
    }
}
