//! DMX512 packet layout and validation
//!
//! Packet format as delivered by the receiver (break and MAB stripped):
//! - SLOT 0 (1 byte): start code, must be 0x00 (dimmer data)
//! - SLOTS 1..=512: channel values, channel N at index N
//!
//! The fixture reads its footprint at the configured base channel. An
//! optional verification slot guards against a desk patched to the wrong
//! universe: when enabled, the slot must carry a fixed sentinel value.

use core::ops::Range;

use heapless::Vec;

use crate::footprint::FOOTPRINT_LEN;

/// Start code for standard dimmer data
pub const NULL_START_CODE: u8 = 0x00;

/// Channels in a DMX universe
pub const DMX_SLOTS: usize = 512;

/// Maximum packet size (start code + all channels)
pub const MAX_PACKET_LEN: usize = DMX_SLOTS + 1;

/// Default first channel of the footprint
pub const DEFAULT_BASE_CHANNEL: u16 = 34;

/// Channel carrying the verification sentinel
pub const VERIFY_CHANNEL: u16 = 46;

/// Value the verification channel must carry
pub const VERIFY_VALUE: u8 = 100;

/// Reasons a packet is dropped
///
/// None of these are fatal: the packet is discarded, the previous display
/// state is kept, and the next packet is the retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// Slot 0 was not the null start code (RDM, text packets, ...)
    UnrecognizedStartCode(u8),
    /// Verification channel did not carry the sentinel
    VerificationFailed {
        /// Value found in the verification channel
        found: u8,
    },
    /// Receiver reported a framing/overrun/break error
    TransportError,
    /// Packet ended before the footprint (or verification slot)
    Truncated {
        /// Number of slots received, start code included
        len: usize,
    },
}

/// Where the fixture lives inside the universe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DmxLayout {
    /// First channel of the footprint (1-based, as patched on the desk)
    pub base_channel: u16,
    /// Require the verification sentinel
    pub verify: bool,
}

impl Default for DmxLayout {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_CHANNEL, false)
    }
}

impl DmxLayout {
    /// Create a layout
    pub const fn new(base_channel: u16, verify: bool) -> Self {
        Self {
            base_channel,
            verify,
        }
    }

    /// Last base channel that still fits the whole footprint
    pub const fn max_base_channel() -> u16 {
        (DMX_SLOTS - FOOTPRINT_LEN + 1) as u16
    }

    /// Check that the footprint fits in the universe and does not overlap
    /// the verification channel
    pub const fn is_valid(&self) -> bool {
        if self.base_channel == 0 || self.base_channel > Self::max_base_channel() {
            return false;
        }
        if self.verify {
            let end = self.base_channel + FOOTPRINT_LEN as u16;
            if VERIFY_CHANNEL >= self.base_channel && VERIFY_CHANNEL < end {
                return false;
            }
        }
        true
    }

    /// Packet slot indices holding the footprint
    pub const fn footprint_range(&self) -> Range<usize> {
        let start = self.base_channel as usize;
        start..start + FOOTPRINT_LEN
    }

    /// Minimum packet length (start code included) this layout needs
    pub const fn slots_to_receive(&self) -> usize {
        let footprint_end = self.base_channel as usize + FOOTPRINT_LEN;
        let verify_end = VERIFY_CHANNEL as usize + 1;
        if self.verify && verify_end > footprint_end {
            verify_end
        } else {
            footprint_end
        }
    }

    /// Validate a packet against this layout
    ///
    /// Returns the footprint window on success.
    pub fn validate<'a>(&self, packet: &'a [u8]) -> Result<&'a [u8], ProtocolError> {
        let start_code = *packet
            .first()
            .ok_or(ProtocolError::Truncated { len: 0 })?;
        if start_code != NULL_START_CODE {
            return Err(ProtocolError::UnrecognizedStartCode(start_code));
        }

        if packet.len() < self.slots_to_receive() {
            return Err(ProtocolError::Truncated { len: packet.len() });
        }

        if self.verify {
            let found = packet[VERIFY_CHANNEL as usize];
            if found != VERIFY_VALUE {
                return Err(ProtocolError::VerificationFailed { found });
            }
        }

        Ok(&packet[self.footprint_range()])
    }
}

/// An owned packet handed from the receiver to the drive loop
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DmxPacket {
    slots: Vec<u8, MAX_PACKET_LEN>,
}

impl DmxPacket {
    /// Create an empty packet
    pub const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Copy received slots, truncating anything past a full universe
    pub fn from_slice(slots: &[u8]) -> Self {
        let len = slots.len().min(MAX_PACKET_LEN);
        let mut packet = Self::new();
        // Cannot fail: `len` is bounded by the capacity
        let _ = packet.slots.extend_from_slice(&slots[..len]);
        packet
    }

    /// Slots received, start code first
    pub fn as_slice(&self) -> &[u8] {
        &self.slots
    }

    /// Number of slots received
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True if nothing was received
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
