//! Bar frames produced by the synthesizer

/// Number of bars on the gauge
pub const BAR_COUNT: usize = 10;

/// Tallest bar height (LEDs lit)
pub const MAX_HEIGHT: u8 = 20;

/// Ten bar heights, each in `0..=MAX_HEIGHT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BarHeights([u8; BAR_COUNT]);

impl BarHeights {
    /// All bars dark
    pub const BLANK: Self = Self([0; BAR_COUNT]);

    /// Create from raw heights, clamping each to [`MAX_HEIGHT`]
    pub fn new(heights: [u8; BAR_COUNT]) -> Self {
        Self(heights.map(|h| h.min(MAX_HEIGHT)))
    }

    /// Scale raw DMX column levels (0-255) onto bar heights (0-20)
    pub fn from_levels(levels: [u8; BAR_COUNT]) -> Self {
        Self(levels.map(|v| ((v as u16 * MAX_HEIGHT as u16 + 127) / 255) as u8))
    }

    /// Height of one bar
    pub fn get(&self, bar: usize) -> u8 {
        self.0.get(bar).copied().unwrap_or(0)
    }

    /// Set one bar, clamped; out-of-range bars are ignored
    pub fn set(&mut self, bar: usize, height: u8) {
        if let Some(slot) = self.0.get_mut(bar) {
            *slot = height.min(MAX_HEIGHT);
        }
    }

    /// All heights
    pub fn as_array(&self) -> &[u8; BAR_COUNT] {
        &self.0
    }

    /// True if every bar is dark
    pub fn is_blank(&self) -> bool {
        self.0.iter().all(|&h| h == 0)
    }
}

/// How the renderer paints a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PaintStyle {
    /// Each bar is redrawn at its height, everything above cleared
    Full,
    /// Each bar is lit from the bottom to its height, height 0 clears it
    Range,
}

/// One rendered frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BarFrame {
    /// Bar heights
    pub heights: BarHeights,
    /// Paint style
    pub paint: PaintStyle,
    /// Brightness override for this frame (time-travel flicker)
    pub flicker: Option<u8>,
}

impl BarFrame {
    /// Frame painted with full-height draws
    pub const fn full(heights: BarHeights) -> Self {
        Self {
            heights,
            paint: PaintStyle::Full,
            flicker: None,
        }
    }

    /// Frame painted with range draws
    pub const fn range(heights: BarHeights) -> Self {
        Self {
            heights,
            paint: PaintStyle::Range,
            flicker: None,
        }
    }

    /// All bars dark
    pub const fn blank() -> Self {
        Self::full(BarHeights::BLANK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps() {
        let heights = BarHeights::new([0, 5, 20, 21, 255, 0, 0, 0, 0, 0]);
        assert_eq!(heights.get(2), 20);
        assert_eq!(heights.get(3), 20);
        assert_eq!(heights.get(4), 20);
        assert_eq!(heights.get(10), 0);
    }

    #[test]
    fn test_from_levels_spans_range() {
        let heights = BarHeights::from_levels([0, 6, 7, 128, 255, 12, 13, 243, 244, 250]);
        assert_eq!(
            heights.as_array(),
            &[0, 0, 1, 10, 20, 1, 1, 19, 19, 20]
        );
    }

    #[test]
    fn test_set_ignores_out_of_range() {
        let mut heights = BarHeights::BLANK;
        heights.set(3, 30);
        heights.set(12, 4);
        assert_eq!(heights.get(3), 20);
        assert!(!heights.is_blank());
        assert!(BarFrame::blank().heights.is_blank());
    }
}
