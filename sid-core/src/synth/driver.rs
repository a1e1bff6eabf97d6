//! Baseline drivers
//!
//! Both drivers share the tick skeleton in [`Synthesizer`](super::Synthesizer);
//! they differ in what the baseline means and how a frame is drawn from it:
//!
//! - [`ProceduralDriver`]: a level 0-19 scales a weight row, with random
//!   per-bar jitter and the time-travel sweep at the top of the scale
//! - [`TableDriver`]: an index into a sequence table, drawn verbatim

use rand::{Rng, RngCore};

use super::state::BaselineState;
use crate::config::{Peaks, SidConfig, SmoothingPolicy, StrictSequence, MAX_SPEED};
use crate::frame::{BarFrame, BarHeights, BAR_COUNT};
use crate::tables::{self, SequenceTable};

/// Highest procedural level
pub const MAX_LEVEL: i16 = 19;

/// What drove the current tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Regime {
    /// Random walk
    Idle(Peaks),
    /// Speed gauge at the given speed
    Speed(u8),
}

/// Procedural level a speed aims for
///
/// Non-decreasing in speed; [`MAX_SPEED`] and above pins the top level.
pub fn procedural_target(speed: u8) -> i16 {
    if speed >= MAX_SPEED {
        return MAX_LEVEL;
    }
    let speed = speed.max(10) as i16;
    (speed * 20 / MAX_SPEED as i16 - 1).min(MAX_LEVEL)
}

/// Brightness used while the time-travel pose flickers
pub fn flicker_level<R: RngCore>(base: u8, rng: &mut R) -> u8 {
    let (span, floor) = if base >= 4 { (base - 2, 3) } else { (2, 0) };
    rng.random_range(0..span) + floor
}

/// One baseline flavour
pub trait BaselineDriver {
    /// Current baseline value
    fn baseline(&self, state: &BaselineState) -> i16;

    /// Overwrite the baseline value
    fn set_baseline(&self, state: &mut BaselineState, value: i16);

    /// Baseline a speed tick aims for
    fn speed_target(&self, speed: u8) -> i16;

    /// Advance the baseline on a speed tick
    fn speed_step<R: RngCore>(&self, state: &mut BaselineState, speed: u8, rng: &mut R);

    /// Advance the baseline on an idle tick
    fn idle_step<R: RngCore>(&self, state: &mut BaselineState, peaks: Peaks, rng: &mut R);

    /// Idle tick while frozen
    fn frozen_step<R: RngCore>(&self, _state: &mut BaselineState, _rng: &mut R) {}

    /// Smoothing for the first idle tick after the speed regime
    fn handoff(&self) -> SmoothingPolicy;

    /// Clamp the baseline into range
    fn clamp(&self, state: &mut BaselineState);

    /// Draw a frame from the (clamped) baseline
    fn render<R: RngCore>(
        &self,
        state: &mut BaselineState,
        regime: Regime,
        base_brightness: u8,
        rng: &mut R,
    ) -> BarFrame;
}

/// Loose modes: weighted, jittered bars
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProceduralDriver {
    smoothing: SmoothingPolicy,
}

impl ProceduralDriver {
    /// Create with the given per-tick smoothing
    pub const fn new(smoothing: SmoothingPolicy) -> Self {
        Self { smoothing }
    }

    /// Time travel: top speed and the baseline has caught up
    pub fn is_time_travel(state: &BaselineState, regime: Regime) -> bool {
        matches!(regime, Regime::Speed(speed) if speed >= MAX_SPEED) && state.level == MAX_LEVEL
    }
}

impl BaselineDriver for ProceduralDriver {
    fn baseline(&self, state: &BaselineState) -> i16 {
        state.level
    }

    fn set_baseline(&self, state: &mut BaselineState, value: i16) {
        state.level = value;
    }

    fn speed_target(&self, speed: u8) -> i16 {
        procedural_target(speed)
    }

    fn speed_step<R: RngCore>(&self, state: &mut BaselineState, speed: u8, _rng: &mut R) {
        state.level = self.smoothing.apply(state.level, self.speed_target(speed));
    }

    fn idle_step<R: RngCore>(&self, state: &mut BaselineState, peaks: Peaks, rng: &mut R) {
        let level = state.level;
        let delta: i16 = match peaks {
            Peaks::Normal => {
                if level > 14 {
                    rng.random_range(-3..=-1)
                } else if level > 8 {
                    rng.random_range(-5..=-1)
                } else if level < 3 {
                    rng.random_range(2..=4)
                } else {
                    rng.random_range(-1..=2)
                }
            }
            Peaks::High => {
                if level > 12 {
                    rng.random_range(-3..=-1)
                } else if level < 3 {
                    rng.random_range(2..=4)
                } else {
                    rng.random_range(-1..=3)
                }
            }
        };
        state.level = level + delta;
    }

    fn handoff(&self) -> SmoothingPolicy {
        self.smoothing
    }

    fn clamp(&self, state: &mut BaselineState) {
        state.level = state.level.clamp(0, MAX_LEVEL);
    }

    fn render<R: RngCore>(
        &self,
        state: &mut BaselineState,
        regime: Regime,
        base_brightness: u8,
        rng: &mut R,
    ) -> BarFrame {
        if state.frozen {
            return BarFrame::range(state.last_heights);
        }

        let time_travel = Self::is_time_travel(state, regime);
        let variation: i32 = match regime {
            Regime::Idle(Peaks::Normal) => 20,
            Regime::Idle(Peaks::High) => 40,
            Regime::Speed(_) if time_travel => 20,
            Regime::Speed(_) => 10,
        };
        // Time travel only ever pushes bars up
        let offset = if time_travel { 0 } else { variation / 2 };
        let bucket = if time_travel {
            tables::TIME_TRAVEL_BUCKET
        } else {
            state.level as usize
        };
        let weights = &tables::WEIGHTS[bucket.min(tables::TIME_TRAVEL_BUCKET)];

        let mut heights = BarHeights::BLANK;
        for (bar, &weight) in weights.iter().enumerate().take(BAR_COUNT) {
            let jitter = rng.random_range(0..variation) - offset;
            let mut top = (state.level as i32 * (weight as i32 + jitter) / 100)
                .clamp(0, MAX_LEVEL as i32) as u8;
            if time_travel {
                top = top.min(tables::TIME_TRAVEL_CAP[bar] - 1);
            }
            heights.set(bar, top + 1);
        }
        state.last_heights = heights;

        let mut frame = BarFrame::range(heights);
        if time_travel {
            let bar = state.sweep.advance();
            frame.heights.set(bar, 0);
            if state.sweep.flickering() {
                frame.flicker = Some(flicker_level(base_brightness, rng));
            }
        } else {
            state.sweep.reset();
        }
        frame
    }
}

/// Strict modes: verbatim table rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDriver {
    sequence: StrictSequence,
    table: SequenceTable,
    smoothing: SmoothingPolicy,
}

impl TableDriver {
    /// Create for the given sequence, with hand-off smoothing
    pub const fn new(sequence: StrictSequence, smoothing: SmoothingPolicy) -> Self {
        let table = match sequence {
            StrictSequence::Full => tables::FULL,
            StrictSequence::Canonical => tables::CANONICAL,
        };
        Self {
            sequence,
            table,
            smoothing,
        }
    }

    /// Table being played
    pub fn table(&self) -> &SequenceTable {
        &self.table
    }

    fn last(&self) -> i16 {
        self.table.last_index() as i16
    }
}

impl BaselineDriver for TableDriver {
    fn baseline(&self, state: &BaselineState) -> i16 {
        state.index
    }

    fn set_baseline(&self, state: &mut BaselineState, value: i16) {
        state.index = value;
    }

    fn speed_target(&self, speed: u8) -> i16 {
        match self.sequence {
            StrictSequence::Full => {
                let per_row = MAX_SPEED as i16 * 100 / self.last();
                (speed as i16 * 100 / per_row).min(self.last())
            }
            StrictSequence::Canonical if speed >= MAX_SPEED => self.last(),
            StrictSequence::Canonical => {
                let bucket = procedural_target(speed) as usize;
                tables::REMAP[bucket.min(tables::REMAP.len() - 1)] as i16
            }
        }
    }

    fn speed_step<R: RngCore>(&self, state: &mut BaselineState, speed: u8, rng: &mut R) {
        let mut index = self.speed_target(speed);
        if state.prev_speed == Some(speed) {
            if index < 5 {
                index += rng.random_range(0..=4i16);
            } else if index > self.table.len() as i16 - 9 {
                // Terminal approach stays on script
            } else {
                index += rng.random_range(-2..=2i16);
            }
        }
        state.index = index;
    }

    fn idle_step<R: RngCore>(&self, state: &mut BaselineState, peaks: Peaks, rng: &mut R) {
        let (ceiling, fall, rise): (i16, i16, i16) = match peaks {
            Peaks::Normal => (30, 3, 4),
            Peaks::High => (40, 5, 6),
        };
        let index = state.index;
        if index > ceiling {
            state.index = index - rng.random_range(1..=fall);
            state.heading_up = false;
        } else if index < 10 {
            state.index = index + rng.random_range(2..=rise);
            state.heading_up = true;
        } else {
            let pull: i16 = if state.heading_up { 2 } else { 4 };
            state.index = index + rng.random_range(0..=6i16) - pull;
        }
    }

    fn frozen_step<R: RngCore>(&self, state: &mut BaselineState, rng: &mut R) {
        if rng.random_range(0..5) >= 2 {
            state.index ^= 1;
        }
    }

    fn handoff(&self) -> SmoothingPolicy {
        self.smoothing
    }

    fn clamp(&self, state: &mut BaselineState) {
        state.index = state.index.clamp(0, self.last());
    }

    fn render<R: RngCore>(
        &self,
        state: &mut BaselineState,
        _regime: Regime,
        _base_brightness: u8,
        _rng: &mut R,
    ) -> BarFrame {
        BarFrame::full(self.table.row(state.index as usize))
    }
}

/// Driver chosen once from the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    /// Loose modes
    Procedural(ProceduralDriver),
    /// Strict modes
    Table(TableDriver),
}

impl Driver {
    /// Pick the driver for the configured mode
    pub fn from_config(config: &SidConfig) -> Self {
        if config.mode.is_strict() {
            Self::Table(TableDriver::new(config.sequence, config.table_smoothing))
        } else {
            Self::Procedural(ProceduralDriver::new(config.procedural_smoothing))
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $d:ident => $body:expr) => {
        match $self {
            Driver::Procedural($d) => $body,
            Driver::Table($d) => $body,
        }
    };
}

impl BaselineDriver for Driver {
    fn baseline(&self, state: &BaselineState) -> i16 {
        dispatch!(self, d => d.baseline(state))
    }

    fn set_baseline(&self, state: &mut BaselineState, value: i16) {
        dispatch!(self, d => d.set_baseline(state, value))
    }

    fn speed_target(&self, speed: u8) -> i16 {
        dispatch!(self, d => d.speed_target(speed))
    }

    fn speed_step<R: RngCore>(&self, state: &mut BaselineState, speed: u8, rng: &mut R) {
        dispatch!(self, d => d.speed_step(state, speed, rng))
    }

    fn idle_step<R: RngCore>(&self, state: &mut BaselineState, peaks: Peaks, rng: &mut R) {
        dispatch!(self, d => d.idle_step(state, peaks, rng))
    }

    fn frozen_step<R: RngCore>(&self, state: &mut BaselineState, rng: &mut R) {
        dispatch!(self, d => d.frozen_step(state, rng))
    }

    fn handoff(&self) -> SmoothingPolicy {
        dispatch!(self, d => d.handoff())
    }

    fn clamp(&self, state: &mut BaselineState) {
        dispatch!(self, d => d.clamp(state))
    }

    fn render<R: RngCore>(
        &self,
        state: &mut BaselineState,
        regime: Regime,
        base_brightness: u8,
        rng: &mut R,
    ) -> BarFrame {
        dispatch!(self, d => d.render(state, regime, base_brightness, rng))
    }
}
