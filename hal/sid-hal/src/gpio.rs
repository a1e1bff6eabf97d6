//! GPIO pin abstractions
//!
//! Digital pins used outside the LED matrix, such as the IR feedback LED
//! that doubles as the failure indicator.

/// Digital output pin
pub trait OutputPin {
    /// Drive the pin high (LED on for active-high wiring)
    fn set_high(&mut self);

    /// Drive the pin low
    fn set_low(&mut self);

    /// Check if the pin is currently driven high
    fn is_set_high(&self) -> bool;

    /// Drive the pin to a specific level
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Invert the current output level
    fn toggle(&mut self) {
        let high = self.is_set_high();
        self.set_state(!high);
    }
}
