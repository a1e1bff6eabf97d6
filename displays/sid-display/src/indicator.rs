//! Boot and failure indicators
//!
//! While the controller waits for its first DMX frame the matrix shows an
//! hourglass. A fatal startup error blinks the board LED instead, since the
//! matrix may be the thing that failed.

use embedded_hal::delay::DelayNs;
use sid_core::{BarSurface, DisplayError};
use sid_hal::{I2cBus, OutputPin};

use crate::ht16k33::Ht16k33Pair;
use crate::matrix::{Field, FIELD_ROWS};

/// Blinks in the failure pattern
pub const FAILURE_BLINKS: u8 = 10;

/// On and off time of each failure blink
pub const FAILURE_BLINK_MS: u32 = 250;

const fn hourglass() -> Field {
    let glyph: [u16; 10] = [
        0b11_1111_1111,
        0b01_0000_0010,
        0b00_1000_0100,
        0b00_0100_1000,
        0b00_0011_0000,
        0b00_0011_0000,
        0b00_0100_1000,
        0b00_1011_0100,
        0b01_0111_1010,
        0b11_1111_1111,
    ];
    let mut field = [0u16; FIELD_ROWS];
    let mut i = 0;
    while i < glyph.len() {
        field[8 + i] = glyph[i];
        i += 1;
    }
    field
}

/// Hourglass in the lower half of the grid
pub const HOURGLASS: Field = hourglass();

/// Show the hourglass
pub fn show_waiting<I2C: I2cBus>(display: &mut Ht16k33Pair<I2C>) -> Result<(), DisplayError> {
    display.clear_direct()?;
    display.matrix_mut().draw_field(&HOURGLASS);
    display.flush()
}

/// Drop the hourglass and leave the grid dark
pub fn end_waiting<I2C: I2cBus>(display: &mut Ht16k33Pair<I2C>) -> Result<(), DisplayError> {
    display.clear();
    display.flush()
}

/// Blink the status LED ten times, 250 ms on and 250 ms off
pub fn show_failure<P: OutputPin, D: DelayNs>(led: &mut P, delay: &mut D) {
    for _ in 0..FAILURE_BLINKS {
        led.set_high();
        delay.delay_ms(FAILURE_BLINK_MS);
        led.set_low();
        delay.delay_ms(FAILURE_BLINK_MS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ht16k33::tests::MockBus;
    use crate::ht16k33::DEFAULT_ADDRESSES;

    #[derive(Default)]
    struct CountingLed {
        high: bool,
        rises: u32,
    }

    impl OutputPin for CountingLed {
        fn set_high(&mut self) {
            if !self.high {
                self.rises += 1;
            }
            self.high = true;
        }

        fn set_low(&mut self) {
            self.high = false;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    #[derive(Default)]
    struct TotalDelay {
        ns: u64,
    }

    impl DelayNs for TotalDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.ns += u64::from(ns);
        }
    }

    #[test]
    fn test_failure_blink_pattern() {
        let mut led = CountingLed::default();
        let mut delay = TotalDelay::default();
        show_failure(&mut led, &mut delay);
        assert_eq!(led.rises, 10);
        assert!(!led.is_set_high());
        assert_eq!(delay.ns, 5_000_000_000);
    }

    #[test]
    fn test_hourglass_placement() {
        assert!(HOURGLASS[..8].iter().all(|&r| r == 0));
        assert_eq!(HOURGLASS[8], 0x3FF);
        assert_eq!(HOURGLASS[17], 0x3FF);
        assert!(HOURGLASS[18..].iter().all(|&r| r == 0));
    }

    #[test]
    fn test_waiting_then_end() {
        let mut display = Ht16k33Pair::new(MockBus::default(), DEFAULT_ADDRESSES);
        display.begin().unwrap();
        show_waiting(&mut display).unwrap();
        // glyph spans levels 2..=11: bottom row lights every bar
        assert!(display.matrix().is_lit(0, 2));
        assert!(display.matrix().is_lit(9, 11));
        assert!(!display.matrix().is_lit(0, 1));

        end_waiting(&mut display).unwrap();
        assert_eq!(display.read_ram(0).unwrap(), [0; 8]);
        assert_eq!(display.read_ram(1).unwrap(), [0; 8]);
    }
}
