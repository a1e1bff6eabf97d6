//! Footprint layout and channel snapshots

/// Number of DMX channels consumed by the fixture
pub const FOOTPRINT_LEN: usize = 12;

/// Number of bar columns addressed by the footprint
pub const COLUMN_COUNT: usize = 10;

/// Offset of the master brightness channel within the footprint
pub const MASTER_BRIGHTNESS_OFFSET: usize = 0;

/// Offset of the effect ramp channel within the footprint
pub const EFFECT_OFFSET: usize = 1;

/// Offset of the first column channel within the footprint
pub const COLUMNS_OFFSET: usize = 2;

/// The fixture's slice of a DMX universe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Footprint([u8; FOOTPRINT_LEN]);

impl Footprint {
    /// Wrap raw footprint bytes
    pub const fn new(bytes: [u8; FOOTPRINT_LEN]) -> Self {
        Self(bytes)
    }

    /// Copy a footprint out of a slice, `None` if the slice is too short
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let window = bytes.get(..FOOTPRINT_LEN)?;
        let mut out = [0u8; FOOTPRINT_LEN];
        out.copy_from_slice(window);
        Some(Self(out))
    }

    /// Master brightness (0 = display off)
    pub fn master_brightness(&self) -> u8 {
        self.0[MASTER_BRIGHTNESS_OFFSET]
    }

    /// Effect ramp value (0 = manual column control)
    pub fn effect(&self) -> u8 {
        self.0[EFFECT_OFFSET]
    }

    /// Raw per-column levels, left-most first
    pub fn columns(&self) -> [u8; COLUMN_COUNT] {
        core::array::from_fn(|i| self.0[COLUMNS_OFFSET + i])
    }

    /// Raw bytes in channel order
    pub fn as_bytes(&self) -> &[u8; FOOTPRINT_LEN] {
        &self.0
    }
}

/// An accepted footprint together with its arrival time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelSnapshot {
    /// Footprint bytes
    pub footprint: Footprint,
    /// Arrival timestamp (ms, monotonic, wrapping)
    pub received_ms: u32,
}
