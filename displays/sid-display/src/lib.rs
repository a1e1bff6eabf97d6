//! Bar matrix driver for the SID-DMX display
//!
//! This crate provides:
//! - `BarMatrix`, the 16-word frame buffer behind the 10x20 segment grid
//! - `Ht16k33Pair`, a driver for the two HT16K33 chips that implements
//!   [`sid_core::BarSurface`]
//! - Status indicators for boot ("waiting" hourglass) and fatal errors
//!
//! # Layout
//!
//! ```text
//!   bar:  0 1 2 3 4 5 6 7 8 9
//!   row 19 ─┐                 ┐
//!    ...    │ top 4 rows      │ chip 2 (words 10..13)
//!   row 16 ─┘                 ┘
//!   row 15 ─┐
//!    ...    │ bottom 16 rows    bars 0-7: chip 1 (words 0..7)
//!   row 0  ─┘                   bars 8-9: chip 2 (words 8..9)
//! ```
//!
//! Nothing reaches the LEDs until [`Ht16k33Pair::flush`] writes the buffer.

#![no_std]
#![deny(unsafe_code)]

pub mod ht16k33;
pub mod indicator;
pub mod matrix;

pub use ht16k33::{Ht16k33Pair, DEFAULT_ADDRESSES};
pub use indicator::{end_waiting, show_failure, show_waiting};
pub use matrix::{BarMatrix, Field, FIELD_ROWS};
