//! Embassy async tasks
//!
//! Each task runs independently and communicates via signals.

pub mod dmx_rx;
pub mod drive;

pub use dmx_rx::dmx_rx_task;
pub use drive::drive_task;
