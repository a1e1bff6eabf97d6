//! Inter-task communication
//!
//! The receiver only ever hands over the newest packet; a packet the drive
//! loop has not picked up yet is simply replaced.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use sid_protocol::{DmxPacket, ProtocolError};

/// Latest packet (or receive error) from the DMX UART
pub static DMX_PACKET: Signal<CriticalSectionRawMutex, Result<DmxPacket, ProtocolError>> =
    Signal::new();
