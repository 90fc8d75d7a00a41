//! Cooperative yield hook for long pixel loops
//!
//! The pipeline is single threaded. Row loops call the hook at least once
//! per row so the host can feed a watchdog or service I/O between rows.

/// Yield point invoked between rows of long raster operations.
pub trait CoopYield {
    fn yield_now(&mut self);
}

impl<T: CoopYield + ?Sized> CoopYield for &mut T {
    fn yield_now(&mut self) {
        (**self).yield_now();
    }
}

/// Hook that does nothing, for hosts with no cooperative scheduling.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoYield;

impl CoopYield for NoYield {
    fn yield_now(&mut self) {}
}
