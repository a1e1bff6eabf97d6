//! Board-agnostic core logic for the SID-DMX bar display
//!
//! This crate turns decoded DMX footprints into bar-graph frames without
//! touching hardware:
//!
//! - Configuration types (operation mode, idle profile, smoothing policy)
//! - Constant sequence and weighting tables
//! - Mode selection (raw columns, pattern rows, speed ramp)
//! - Baseline synthesis (idle walk, speed gauge, time-travel sweep)
//! - Bar rendering onto an abstract display surface
//! - The cooperative drive loop tying it all together

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod engine;
pub mod frame;
pub mod mode;
pub mod render;
pub mod synth;
pub mod tables;
pub mod traits;

pub use config::{OperationMode, SidConfig};
pub use engine::{Activity, Drive, Engine};
pub use frame::{BarFrame, BarHeights, PaintStyle, BAR_COUNT, MAX_HEIGHT};
pub use mode::RenderCommand;
pub use render::BarRenderer;
pub use synth::{Synthesizer, TickInput};
pub use traits::{BarSurface, DisplayError, DmxSource};
