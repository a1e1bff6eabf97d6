//! Bar display surface trait

/// Brightest display level
pub const MAX_BRIGHTNESS: u8 = 15;

/// Errors that can occur driving the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Bus transaction failed
    Communication,
    /// Display used before `begin`
    NotInitialized,
}

/// Trait for a 10-bar, 20-segment display
///
/// Draw calls only touch a frame buffer; nothing is visible until
/// [`flush`](BarSurface::flush). Out-of-range bars and heights are clamped
/// or ignored by the implementation.
pub trait BarSurface {
    /// Bus error type
    type Error;

    /// Light bar `bar` from the bottom to `height` segments, clear the rest
    fn draw_bar_height(&mut self, bar: usize, height: u8);

    /// Light segments `bottom..=top` of bar `bar` (0 = lowest)
    fn draw_bar_range(&mut self, bar: usize, bottom: u8, top: u8);

    /// Clear one bar
    fn clear_bar(&mut self, bar: usize);

    /// Clear the frame buffer
    fn clear(&mut self);

    /// Set and remember the brightness level (0-15)
    ///
    /// Returns the level actually applied.
    fn set_brightness(&mut self, level: u8) -> Result<u8, Self::Error>;

    /// Apply a brightness level without remembering it
    fn set_brightness_immediate(&mut self, level: u8) -> Result<(), Self::Error>;

    /// Remembered brightness level
    fn brightness(&self) -> u8;

    /// Switch the display on or off, keeping the frame buffer
    fn set_enabled(&mut self, on: bool) -> Result<(), Self::Error>;

    /// Push the frame buffer to the hardware
    fn flush(&mut self) -> Result<(), Self::Error>;
}
