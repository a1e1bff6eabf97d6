//! Hardware abstraction traits
//!
//! These traits define the interface between the gauge logic and the
//! board-specific display and receiver implementations.

pub mod display;
pub mod source;

pub use display::{BarSurface, DisplayError, MAX_BRIGHTNESS};
pub use source::DmxSource;
