//! Baseline synthesizer
//!
//! Evolves the gauge baseline on ticks of variable length and turns it into
//! bar frames. Two regimes are picked per tick:
//!
//! - **Speed**: a speed is set; ticks every 500 ms (or at once when forced),
//!   the baseline follows the speed
//! - **Idle**: no speed; ticks at the idle profile's tempo, the baseline
//!   wanders as a bounded random walk

pub mod driver;
pub mod state;

pub use driver::{BaselineDriver, Driver, ProceduralDriver, Regime, TableDriver};
pub use state::{BaselineState, Sweep};

use rand::{Rng, RngCore};

use crate::config::{IdleProfile, SidConfig};
use crate::frame::BarFrame;

/// Speed-regime tick interval
pub const SPEED_TICK_MS: u32 = 500;

/// Idle intervals are the tempo's mean ± this
pub const IDLE_JITTER_MS: u32 = 100;

/// Inputs for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickInput {
    /// Current speed, `None` for idle
    pub speed: Option<u8>,
    /// Monotonic time
    pub now_ms: u32,
    /// Tick now regardless of the interval
    pub force: bool,
    /// Persisted display brightness, used for time-travel flicker
    pub base_brightness: u8,
}

/// Owns the baseline state and the random source
pub struct Synthesizer<R> {
    driver: Driver,
    idle: IdleProfile,
    state: BaselineState,
    rng: R,
}

impl<R: RngCore> Synthesizer<R> {
    /// Create a synthesizer for the configured mode
    pub fn new(config: &SidConfig, rng: R) -> Self {
        Self {
            driver: Driver::from_config(config),
            idle: config.idle,
            state: BaselineState::default(),
            rng,
        }
    }

    /// Run one tick if it is due
    ///
    /// Returns the frame to render, or `None` when no tick was due (or a
    /// zero speed has already been blanked).
    pub fn tick(&mut self, input: TickInput) -> Option<BarFrame> {
        let elapsed = input.now_ms.wrapping_sub(self.state.last_tick_ms);

        let regime = match input.speed {
            Some(speed) => {
                if !input.force && elapsed < SPEED_TICK_MS {
                    return None;
                }
                self.state.last_tick_ms = input.now_ms;
                self.state.speed_driven = true;

                if speed == 0 {
                    let edge = self.state.prev_speed != Some(0);
                    self.state.prev_speed = Some(0);
                    self.state.sweep.reset();
                    return edge.then(BarFrame::blank);
                }

                if !self.state.frozen {
                    self.driver.speed_step(&mut self.state, speed, &mut self.rng);
                }
                self.state.prev_speed = Some(speed);
                Regime::Speed(speed)
            }
            None => {
                if !input.force && elapsed < self.state.tick_interval_ms {
                    return None;
                }
                self.state.last_tick_ms = input.now_ms;
                self.state.tick_interval_ms = self.idle_interval();

                if self.state.frozen {
                    self.driver.frozen_step(&mut self.state, &mut self.rng);
                } else {
                    let old = self.driver.baseline(&self.state);
                    self.driver
                        .idle_step(&mut self.state, self.idle.peaks(), &mut self.rng);
                    if self.state.speed_driven {
                        let new = self.driver.baseline(&self.state);
                        let smoothed = self.driver.handoff().midpoint(old, new);
                        self.driver.set_baseline(&mut self.state, smoothed);
                        self.state.speed_driven = false;
                    }
                }
                Regime::Idle(self.idle.peaks())
            }
        };

        self.driver.clamp(&mut self.state);
        Some(
            self.driver
                .render(&mut self.state, regime, input.base_brightness, &mut self.rng),
        )
    }

    /// Forget the previous speed so a later zero blanks again
    pub fn clear_speed(&mut self) {
        self.state.prev_speed = None;
    }

    /// Hold or release the baseline
    pub fn set_frozen(&mut self, frozen: bool) {
        self.state.frozen = frozen;
    }

    /// Baseline state
    pub fn state(&self) -> &BaselineState {
        &self.state
    }

    /// Active driver
    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    /// Random source, shared with the frame decoder
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    fn idle_interval(&mut self) -> u32 {
        let mean = self.idle.tempo().mean_interval_ms();
        mean - IDLE_JITTER_MS + self.rng.random_range(0..2 * IDLE_JITTER_MS)
    }
}
