//! Display state tracking
//!
//! - [`PanelLink`] wraps a [`PanelDevice`](crate::traits::PanelDevice) and
//!   enforces the legal command order before anything reaches the bus
//! - [`DisplayState`] is the host-side model of the panel controller

mod link;

pub use link::{DisplayState, LinkError, PanelLink, PanelOp, RefreshKind};
