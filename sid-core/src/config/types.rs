//! Configuration type definitions
//!
//! These types describe how the fixture interprets its footprint and how
//! the gauge animates. The firmware builds a [`SidConfig`] constant from
//! `sid.toml` at compile time.

use sid_protocol::DmxLayout;

/// Top of the speed scale; reaching it starts time travel
pub const MAX_SPEED: u8 = 88;

/// Bottom of the narrow speed domain
pub const NARROW_MIN_SPEED: u8 = 30;

/// How the effect channel is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperationMode {
    /// Effect channel picks a row of the stale sequence directly
    RawPattern,
    /// Effect is a 0-88 speed, gauge follows the sequence table
    SpeedWideStrict,
    /// Effect is a 0-88 speed, gauge is procedurally animated
    SpeedWideLoose,
    /// Effect is a 30-88 speed, gauge follows the sequence table
    #[default]
    SpeedNarrowStrict,
    /// Effect is a 30-88 speed, gauge is procedurally animated
    SpeedNarrowLoose,
}

impl OperationMode {
    /// Parse the numeric mode used in `sid.toml`
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::RawPattern),
            1 => Some(Self::SpeedWideStrict),
            2 => Some(Self::SpeedWideLoose),
            3 => Some(Self::SpeedNarrowStrict),
            4 => Some(Self::SpeedNarrowLoose),
            _ => None,
        }
    }

    /// Numeric mode used in `sid.toml`
    pub fn index(self) -> u8 {
        match self {
            Self::RawPattern => 0,
            Self::SpeedWideStrict => 1,
            Self::SpeedWideLoose => 2,
            Self::SpeedNarrowStrict => 3,
            Self::SpeedNarrowLoose => 4,
        }
    }

    /// Gauge follows the sequence table verbatim
    pub fn is_strict(self) -> bool {
        matches!(self, Self::SpeedWideStrict | Self::SpeedNarrowStrict)
    }

    /// Speed domain of the effect channel, `None` in pattern mode
    pub fn speed_domain(self) -> Option<SpeedDomain> {
        match self {
            Self::RawPattern => None,
            Self::SpeedWideStrict | Self::SpeedWideLoose => Some(SpeedDomain::Wide),
            Self::SpeedNarrowStrict | Self::SpeedNarrowLoose => Some(SpeedDomain::Narrow),
        }
    }
}

/// Range the effect channel is mapped onto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpeedDomain {
    /// 0-88
    Wide,
    /// 30-88
    Narrow,
}

impl SpeedDomain {
    /// Lowest speed the domain produces
    pub fn min(self) -> u8 {
        match self {
            Self::Wide => 0,
            Self::Narrow => NARROW_MIN_SPEED,
        }
    }

    /// Highest speed the domain produces
    pub fn max(self) -> u8 {
        MAX_SPEED
    }

    /// Map an effect byte onto the domain
    ///
    /// Wide: `effect / 2.87`, narrow: `effect / 4.329 + 30`, both clamped.
    pub fn speed_from_effect(self, effect: u8) -> u8 {
        let effect = effect as u32;
        let speed = match self {
            Self::Wide => effect * 100 / 287,
            Self::Narrow => effect * 1000 / 4329 + NARROW_MIN_SPEED as u32,
        };
        (speed.min(self.max() as u32) as u8).max(self.min())
    }
}

/// Idle animation tempo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tempo {
    /// 800 ms ± 100 ms between ticks
    Normal,
    /// 300 ms ± 100 ms between ticks
    Fast,
}

impl Tempo {
    /// Mean idle tick interval
    pub fn mean_interval_ms(self) -> u32 {
        match self {
            Self::Normal => 800,
            Self::Fast => 300,
        }
    }
}

/// Idle animation peak height
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Peaks {
    /// Walk stays mostly in the lower half
    Normal,
    /// Walk reaches higher and jitters wider
    High,
}

/// Idle animation profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IdleProfile {
    /// Normal tempo, normal peaks
    #[default]
    Calm,
    /// Normal tempo, higher peaks
    Tall,
    /// Fast tempo, normal peaks
    Brisk,
    /// Fast tempo, higher peaks
    Frantic,
}

impl IdleProfile {
    /// Parse the numeric profile used in `sid.toml`
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Calm),
            1 => Some(Self::Tall),
            2 => Some(Self::Brisk),
            3 => Some(Self::Frantic),
            _ => None,
        }
    }

    /// Tick tempo
    pub fn tempo(self) -> Tempo {
        match self {
            Self::Calm | Self::Tall => Tempo::Normal,
            Self::Brisk | Self::Frantic => Tempo::Fast,
        }
    }

    /// Walk amplitude
    pub fn peaks(self) -> Peaks {
        match self {
            Self::Calm | Self::Brisk => Peaks::Normal,
            Self::Tall | Self::Frantic => Peaks::High,
        }
    }
}

/// Which table strict modes play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StrictSequence {
    /// 51-row sequence, indexed linearly by speed
    #[default]
    Full,
    /// 29-row progression, indexed through the baseline remap
    Canonical,
}

/// Baseline smoothing between ticks
///
/// The delta towards a new target is first clamped to `max_step`; if the
/// remaining jump is still larger than `midpoint_above`, the baseline only
/// moves halfway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SmoothingPolicy {
    /// Largest per-tick move
    pub max_step: u8,
    /// Jumps larger than this are halved
    pub midpoint_above: u8,
}

impl SmoothingPolicy {
    /// Default for the procedural gauge
    pub const PROCEDURAL: Self = Self {
        max_step: 6,
        midpoint_above: 3,
    };

    /// Default for the table-driven gauge (midpoint only)
    pub const TABLE: Self = Self {
        max_step: u8::MAX,
        midpoint_above: 7,
    };

    /// Clamp then halve
    pub fn apply(&self, old: i16, target: i16) -> i16 {
        let step = self.max_step as i16;
        let next = old + (target - old).clamp(-step, step);
        self.midpoint(old, next)
    }

    /// Halve only
    pub fn midpoint(&self, old: i16, next: i16) -> i16 {
        if (next - old).abs() > self.midpoint_above as i16 {
            (old + next) / 2
        } else {
            next
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Footprint does not fit in the universe
    BaseChannelOutOfRange(u16),
    /// Verification channel lies inside the footprint
    VerifyInsideFootprint,
    /// Unknown operation mode number
    InvalidModeIndex(u8),
    /// Unknown idle profile number
    InvalidIdleIndex(u8),
    /// A smoothing step of zero would freeze the gauge
    ZeroSmoothingStep,
}

impl TryFrom<u8> for OperationMode {
    type Error = ConfigError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::from_index(index).ok_or(ConfigError::InvalidModeIndex(index))
    }
}

impl TryFrom<u8> for IdleProfile {
    type Error = ConfigError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::from_index(index).ok_or(ConfigError::InvalidIdleIndex(index))
    }
}

/// Complete fixture configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SidConfig {
    /// Effect channel interpretation
    pub mode: OperationMode,
    /// Idle animation profile
    pub idle: IdleProfile,
    /// Table played in strict modes
    pub sequence: StrictSequence,
    /// Footprint placement
    pub dmx: DmxLayout,
    /// Smoothing for the procedural gauge
    pub procedural_smoothing: SmoothingPolicy,
    /// Smoothing for the table-driven gauge
    pub table_smoothing: SmoothingPolicy,
}

impl Default for SidConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl SidConfig {
    /// Factory configuration
    pub const DEFAULT: Self = Self {
        mode: OperationMode::SpeedNarrowStrict,
        idle: IdleProfile::Calm,
        sequence: StrictSequence::Full,
        dmx: DmxLayout::new(sid_protocol::frame::DEFAULT_BASE_CHANNEL, false),
        procedural_smoothing: SmoothingPolicy::PROCEDURAL,
        table_smoothing: SmoothingPolicy::TABLE,
    };

    /// Check internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dmx.base_channel == 0 || self.dmx.base_channel > DmxLayout::max_base_channel() {
            return Err(ConfigError::BaseChannelOutOfRange(self.dmx.base_channel));
        }
        if !self.dmx.is_valid() {
            return Err(ConfigError::VerifyInsideFootprint);
        }
        if self.procedural_smoothing.max_step == 0 || self.table_smoothing.max_step == 0 {
            return Err(ConfigError::ZeroSmoothingStep);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_index_roundtrip() {
        for index in 0..5 {
            let mode = OperationMode::from_index(index).unwrap();
            assert_eq!(mode.index(), index);
        }
        assert_eq!(OperationMode::from_index(5), None);
        assert_eq!(
            OperationMode::try_from(9),
            Err(ConfigError::InvalidModeIndex(9))
        );
        assert_eq!(IdleProfile::try_from(2), Ok(IdleProfile::Brisk));
        assert_eq!(IdleProfile::try_from(7), Err(ConfigError::InvalidIdleIndex(7)));
    }

    #[test]
    fn test_mode_properties() {
        assert!(OperationMode::SpeedWideStrict.is_strict());
        assert!(!OperationMode::SpeedNarrowLoose.is_strict());
        assert!(!OperationMode::RawPattern.is_strict());
        assert_eq!(OperationMode::RawPattern.speed_domain(), None);
        assert_eq!(
            OperationMode::SpeedNarrowStrict.speed_domain(),
            Some(SpeedDomain::Narrow)
        );
    }

    #[test]
    fn test_speed_domains_cover_range() {
        assert_eq!(SpeedDomain::Wide.speed_from_effect(1), 0);
        assert_eq!(SpeedDomain::Wide.speed_from_effect(128), 44);
        assert_eq!(SpeedDomain::Wide.speed_from_effect(255), 88);
        assert_eq!(SpeedDomain::Narrow.speed_from_effect(1), 30);
        assert_eq!(SpeedDomain::Narrow.speed_from_effect(130), 60);
        assert_eq!(SpeedDomain::Narrow.speed_from_effect(255), 88);
    }

    #[test]
    fn test_idle_profiles() {
        assert_eq!(IdleProfile::Calm.tempo(), Tempo::Normal);
        assert_eq!(IdleProfile::Frantic.tempo(), Tempo::Fast);
        assert_eq!(IdleProfile::Tall.peaks(), Peaks::High);
        assert_eq!(IdleProfile::Brisk.peaks(), Peaks::Normal);
        assert_eq!(IdleProfile::from_index(4), None);
    }

    #[test]
    fn test_smoothing_clamps_then_halves() {
        let policy = SmoothingPolicy::PROCEDURAL;
        // 0 -> 19: clamped to 6, then halved to 3
        assert_eq!(policy.apply(0, 19), 3);
        // Small moves pass straight through
        assert_eq!(policy.apply(10, 12), 12);
        assert_eq!(policy.apply(10, 7), 7);
        // Downward jumps are symmetric
        assert_eq!(policy.apply(19, 0), 16);
    }

    #[test]
    fn test_smoothing_converges() {
        let policy = SmoothingPolicy::PROCEDURAL;
        let mut level = 0;
        for _ in 0..10 {
            level = policy.apply(level, 19);
        }
        assert_eq!(level, 19);
    }

    #[test]
    fn test_table_smoothing_midpoint_only() {
        let policy = SmoothingPolicy::TABLE;
        assert_eq!(policy.apply(0, 50), 25);
        assert_eq!(policy.apply(20, 27), 27);
    }

    #[test]
    fn test_validate() {
        assert_eq!(SidConfig::DEFAULT.validate(), Ok(()));

        let mut config = SidConfig::DEFAULT;
        config.dmx.base_channel = 505;
        assert_eq!(
            config.validate(),
            Err(ConfigError::BaseChannelOutOfRange(505))
        );

        let mut config = SidConfig::DEFAULT;
        config.dmx = DmxLayout::new(40, true);
        assert_eq!(config.validate(), Err(ConfigError::VerifyInsideFootprint));

        let mut config = SidConfig::DEFAULT;
        config.procedural_smoothing.max_step = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroSmoothingStep));
    }
}
