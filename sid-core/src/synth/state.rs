//! Baseline animation state

use crate::frame::{BarHeights, BAR_COUNT};

/// Time-travel sweep: one bar is blanked per tick, walking 0..9 and back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sweep {
    /// Bar blanked on the next tick
    pub cursor: u8,
    /// Walking towards bar 0
    pub reversed: bool,
    /// Completed round trips
    pub passes: u16,
}

impl Sweep {
    /// Bar to blank this tick; advances the cursor
    pub fn advance(&mut self) -> usize {
        let bar = self.cursor as usize;
        if !self.reversed {
            if bar + 1 >= BAR_COUNT {
                self.reversed = true;
            } else {
                self.cursor += 1;
            }
        } else if bar == 0 {
            self.reversed = false;
            self.passes = self.passes.saturating_add(1);
        } else {
            self.cursor -= 1;
        }
        bar
    }

    /// Brightness flickers once the first round trip is done
    pub fn flickering(&self) -> bool {
        self.passes > 0
    }

    /// Back to bar 0, no passes
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Everything the synthesizer remembers between ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BaselineState {
    /// Procedural baseline, 0..=19
    pub level: i16,
    /// Strict table row
    pub index: i16,
    /// Time of the last tick
    pub last_tick_ms: u32,
    /// Idle tick interval, re-rolled every idle tick
    pub tick_interval_ms: u32,
    /// Idle table walk is heading up
    pub heading_up: bool,
    /// Time-travel sweep
    pub sweep: Sweep,
    /// Speed of the previous speed tick
    pub prev_speed: Option<u8>,
    /// Last tick was speed-driven; the next idle tick smooths the hand-off
    pub speed_driven: bool,
    /// Baseline held in place
    pub frozen: bool,
    /// Heights of the last procedural frame
    pub last_heights: BarHeights,
}

impl Default for BaselineState {
    fn default() -> Self {
        Self {
            level: 0,
            index: 0,
            last_tick_ms: 0,
            tick_interval_ms: 0,
            heading_up: true,
            sweep: Sweep::default(),
            prev_speed: None,
            speed_driven: false,
            frozen: false,
            last_heights: BarHeights::BLANK,
        }
    }
}
