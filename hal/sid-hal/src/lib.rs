//! SID-DMX Hardware Abstraction Layer
//!
//! Hardware traits implemented by the board crate so the display and
//! gauge logic never touch chip registers directly.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  sid-firmware (board wiring)            │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  sid-hal (this crate - traits)          │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ sid-display   │       │ feedback LED  │
//! │ (HT16K33 x2)  │       │  indicators   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Digital outputs
//! - [`i2c::I2cBus`] - I2C bus operations for the LED matrix drivers

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod i2c;

pub use gpio::OutputPin;
pub use i2c::{I2cBus, I2cConfig};
