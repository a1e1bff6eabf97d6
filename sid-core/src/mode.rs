//! Mode selection
//!
//! Footprint layout (offsets into the 12-channel window):
//!
//! | Offset | Channel use                                          |
//! |--------|------------------------------------------------------|
//! | 0      | Master brightness (0 = off, 1-255 = darkest-brightest)|
//! | 1      | Effect (0 = manual columns, 1-255 = ramp)            |
//! | 2..=11 | Column levels, left to right (manual only)           |

use sid_protocol::Footprint;

use crate::config::OperationMode;
use crate::frame::{BarFrame, BarHeights};
use crate::tables;

/// Speeds above this redraw on every change instead of waiting for a tick
pub const FORCE_UPDATE_SPEED: u8 = 75;

/// What a changed footprint asks the display to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderCommand {
    /// Master brightness is zero
    Off,
    /// Raw column levels, drawn once
    Manual {
        /// Scaled column heights
        heights: BarHeights,
        /// Brightness level 0-15
        brightness: u8,
    },
    /// Stale-sequence row picked by the effect channel, drawn once
    Pattern {
        /// Row contents
        heights: BarHeights,
        /// Brightness level 0-15
        brightness: u8,
    },
    /// Effect channel drives the speed gauge
    Speed {
        /// Speed in the mode's domain
        speed: u8,
        /// Tick immediately instead of waiting for the next interval
        force: bool,
        /// Brightness level 0-15
        brightness: u8,
    },
}

impl RenderCommand {
    /// Brightness level, `None` when off
    pub fn brightness(&self) -> Option<u8> {
        match *self {
            Self::Off => None,
            Self::Manual { brightness, .. }
            | Self::Pattern { brightness, .. }
            | Self::Speed { brightness, .. } => Some(brightness),
        }
    }

    /// Frame to draw once, for commands that bypass the synthesizer
    pub fn static_frame(&self) -> Option<BarFrame> {
        match *self {
            Self::Manual { heights, .. } | Self::Pattern { heights, .. } => {
                Some(BarFrame::full(heights))
            }
            Self::Off | Self::Speed { .. } => None,
        }
    }
}

/// Map the master channel onto the 16 display brightness levels
pub fn brightness_level(master: u8) -> u8 {
    master / 16
}

/// Interpret a footprint under the configured operation mode
pub fn interpret(footprint: &Footprint, mode: OperationMode) -> RenderCommand {
    let master = footprint.master_brightness();
    if master == 0 {
        return RenderCommand::Off;
    }
    let brightness = brightness_level(master);

    let effect = footprint.effect();
    if effect == 0 {
        return RenderCommand::Manual {
            heights: BarHeights::from_levels(footprint.columns()),
            brightness,
        };
    }

    match mode.speed_domain() {
        None => RenderCommand::Pattern {
            heights: tables::STALE.row(tables::stale_row_for_effect(effect)),
            brightness,
        },
        Some(domain) => {
            let speed = domain.speed_from_effect(effect);
            RenderCommand::Speed {
                speed,
                force: speed > FORCE_UPDATE_SPEED,
                brightness,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ALL_MODES: [OperationMode; 5] = [
        OperationMode::RawPattern,
        OperationMode::SpeedWideStrict,
        OperationMode::SpeedWideLoose,
        OperationMode::SpeedNarrowStrict,
        OperationMode::SpeedNarrowLoose,
    ];

    fn footprint(master: u8, effect: u8, columns: [u8; 10]) -> Footprint {
        let mut bytes = [0u8; 12];
        bytes[0] = master;
        bytes[1] = effect;
        bytes[2..].copy_from_slice(&columns);
        Footprint::new(bytes)
    }

    #[test]
    fn test_master_zero_is_off() {
        for mode in ALL_MODES {
            let cmd = interpret(&footprint(0, 200, [255; 10]), mode);
            assert_eq!(cmd, RenderCommand::Off);
            assert_eq!(cmd.brightness(), None);
        }
    }

    #[test]
    fn test_brightness_levels() {
        assert_eq!(brightness_level(1), 0);
        assert_eq!(brightness_level(16), 1);
        assert_eq!(brightness_level(255), 15);
    }

    #[test]
    fn test_effect_zero_is_manual_in_every_mode() {
        let columns = [0, 255, 128, 0, 0, 0, 0, 0, 0, 13];
        for mode in ALL_MODES {
            let cmd = interpret(&footprint(255, 0, columns), mode);
            match cmd {
                RenderCommand::Manual {
                    heights,
                    brightness,
                } => {
                    assert_eq!(brightness, 15);
                    assert_eq!(heights.as_array(), &[0, 20, 10, 0, 0, 0, 0, 0, 0, 1]);
                }
                other => panic!("expected manual, got {:?}", other),
            }
            assert!(cmd.static_frame().is_some());
        }
    }

    #[test]
    fn test_raw_pattern_picks_stale_row() {
        let cmd = interpret(&footprint(128, 255, [0; 10]), OperationMode::RawPattern);
        assert_eq!(
            cmd,
            RenderCommand::Pattern {
                heights: tables::STALE.row(51),
                brightness: 8,
            }
        );
    }

    #[test]
    fn test_speed_force_threshold() {
        // Wide: 218 / 2.87 = 75, not above the threshold
        let cmd = interpret(&footprint(255, 218, [0; 10]), OperationMode::SpeedWideLoose);
        assert_eq!(
            cmd,
            RenderCommand::Speed {
                speed: 75,
                force: false,
                brightness: 15
            }
        );
        let cmd = interpret(&footprint(255, 222, [0; 10]), OperationMode::SpeedWideLoose);
        assert!(matches!(cmd, RenderCommand::Speed { speed: 77, force: true, .. }));
        assert_eq!(cmd.static_frame(), None);
    }

    #[test]
    fn test_narrow_domain_floor() {
        let cmd = interpret(&footprint(255, 1, [0; 10]), OperationMode::SpeedNarrowStrict);
        assert!(matches!(cmd, RenderCommand::Speed { speed: 30, .. }));
    }

    proptest! {
        #[test]
        fn speed_stays_in_domain(effect in 1u8..=255, narrow in any::<bool>()) {
            let mode = if narrow {
                OperationMode::SpeedNarrowLoose
            } else {
                OperationMode::SpeedWideLoose
            };
            let (lo, hi) = if narrow { (30, 88) } else { (0, 88) };
            match interpret(&footprint(10, effect, [0; 10]), mode) {
                RenderCommand::Speed { speed, .. } => {
                    prop_assert!(speed >= lo && speed <= hi);
                }
                other => prop_assert!(false, "unexpected {:?}", other),
            }
        }
    }
}
