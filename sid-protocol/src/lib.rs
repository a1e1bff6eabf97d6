//! DMX512 footprint protocol for the SID bar display
//!
//! The fixture occupies a 12-channel footprint inside a DMX universe:
//! ```text
//! ┌────────────┬────────┬──────────────────────────────┐
//! │ MASTER BRI │ EFFECT │ COLUMN 1 .. COLUMN 10        │
//! │ ch base+0  │ base+1 │ base+2 .. base+11            │
//! └────────────┴────────┴──────────────────────────────┘
//! ```
//!
//! Packets are validated (null start code, optional verification slot),
//! deduplicated against the last accepted footprint, and used to track
//! whether a desk is currently connected.

#![no_std]
#![deny(unsafe_code)]

pub mod decoder;
pub mod footprint;
pub mod frame;

pub use decoder::{Decoded, FrameDecoder, LinkEvent, LinkState, CONNECTION_TIMEOUT_MS};
pub use footprint::{ChannelSnapshot, Footprint, COLUMN_COUNT, FOOTPRINT_LEN};
pub use frame::{DmxLayout, DmxPacket, ProtocolError, MAX_PACKET_LEN, NULL_START_CODE};
