//! Bar renderer
//!
//! Turns [`BarFrame`]s into surface draw calls and flushes them.

use crate::frame::{BarFrame, PaintStyle, BAR_COUNT};
use crate::traits::BarSurface;

/// Paints frames onto a [`BarSurface`]
#[derive(Debug, Clone, Default)]
pub struct BarRenderer {
    /// Last frame overrode the persisted brightness
    flickering: bool,
}

impl BarRenderer {
    /// Create a renderer
    pub const fn new() -> Self {
        Self { flickering: false }
    }

    /// Paint a frame, apply its brightness, flush
    pub fn render<S: BarSurface>(
        &mut self,
        surface: &mut S,
        frame: &BarFrame,
    ) -> Result<(), S::Error> {
        for bar in 0..BAR_COUNT {
            let height = frame.heights.get(bar);
            match frame.paint {
                PaintStyle::Full => surface.draw_bar_height(bar, height),
                PaintStyle::Range if height == 0 => surface.clear_bar(bar),
                PaintStyle::Range => surface.draw_bar_range(bar, 0, height - 1),
            }
        }

        match frame.flicker {
            Some(level) => {
                surface.set_brightness_immediate(level)?;
                self.flickering = true;
            }
            None if self.flickering => {
                let level = surface.brightness();
                surface.set_brightness_immediate(level)?;
                self.flickering = false;
            }
            None => {}
        }

        surface.flush()
    }

    /// Clear everything and flush
    pub fn blank<S: BarSurface>(&mut self, surface: &mut S) -> Result<(), S::Error> {
        surface.clear();
        surface.flush()
    }
}
