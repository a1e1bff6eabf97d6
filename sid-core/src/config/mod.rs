//! Configuration types
//!
//! Configuration is fixed at build time; nothing here changes at runtime.

pub mod types;

pub use types::*;
