//! HT16K33 pair driver
//!
//! Two HT16K33 LED controllers share one I2C bus. Each holds eight 16-bit
//! RAM words; the driver keeps a [`BarMatrix`] image of both and writes it
//! out on [`flush`](Ht16k33Pair::flush).

use sid_core::traits::MAX_BRIGHTNESS;
use sid_core::{BarSurface, DisplayError};
use sid_hal::I2cBus;

use crate::matrix::{BarMatrix, WORDS_PER_CHIP};

/// Factory addresses of chip 1 and chip 2
pub const DEFAULT_ADDRESSES: [u8; 2] = [0x74, 0x72];

/// HT16K33 commands
mod cmd {
    /// System setup: oscillator on
    pub const OSCILLATOR_ON: u8 = 0x21;
    /// Display setup: on, no blink
    pub const DISPLAY_ON: u8 = 0x81;
    /// Display setup: off
    pub const DISPLAY_OFF: u8 = 0x80;
    /// Dimming set, level in the low nibble
    pub const DIMMING: u8 = 0xE0;
    /// Display RAM address pointer
    pub const RAM_START: u8 = 0x00;
}

/// Bytes in one RAM write: address pointer plus 8 little-endian words
const RAM_WRITE_LEN: usize = 1 + 2 * WORDS_PER_CHIP;

/// Driver for the two-chip bar matrix
pub struct Ht16k33Pair<I2C> {
    i2c: I2C,
    addresses: [u8; 2],
    matrix: BarMatrix,
    /// Persisted brightness, 0..=15
    brightness: u8,
    initialized: bool,
}

impl<I2C: I2cBus> Ht16k33Pair<I2C> {
    /// Wrap a bus; call [`begin`](Self::begin) before flushing
    pub fn new(i2c: I2C, addresses: [u8; 2]) -> Self {
        Self {
            i2c,
            addresses,
            matrix: BarMatrix::new(),
            brightness: MAX_BRIGHTNESS,
            initialized: false,
        }
    }

    /// Start both oscillators, clear RAM, full brightness, display on
    pub fn begin(&mut self) -> Result<(), DisplayError> {
        self.command(cmd::OSCILLATOR_ON)?;
        self.matrix.clear();
        self.apply_brightness(MAX_BRIGHTNESS)?;
        self.brightness = MAX_BRIGHTNESS;
        self.clear_direct()?;
        self.command(cmd::DISPLAY_ON)?;
        self.initialized = true;
        Ok(())
    }

    /// Send one command byte to both chips
    pub fn command(&mut self, byte: u8) -> Result<(), DisplayError> {
        for address in self.addresses {
            self.i2c
                .write(address, &[byte])
                .map_err(|_| DisplayError::Communication)?;
        }
        Ok(())
    }

    /// Display on
    pub fn on(&mut self) -> Result<(), DisplayError> {
        self.command(cmd::DISPLAY_ON)
    }

    /// Display off; RAM is kept
    pub fn off(&mut self) -> Result<(), DisplayError> {
        self.command(cmd::DISPLAY_OFF)
    }

    fn apply_brightness(&mut self, level: u8) -> Result<(), DisplayError> {
        self.command(cmd::DIMMING | level.min(MAX_BRIGHTNESS))
    }

    /// Re-apply the persisted brightness after an immediate override
    pub fn restore_brightness(&mut self) -> Result<(), DisplayError> {
        self.apply_brightness(self.brightness)
    }

    fn write_ram(&mut self, chip: usize, words: &[u16]) -> Result<(), DisplayError> {
        let mut bytes = [0u8; RAM_WRITE_LEN];
        bytes[0] = cmd::RAM_START;
        for (i, word) in words.iter().take(WORDS_PER_CHIP).enumerate() {
            bytes[1 + 2 * i..3 + 2 * i].copy_from_slice(&word.to_le_bytes());
        }
        self.i2c
            .write(self.addresses[chip], &bytes)
            .map_err(|_| DisplayError::Communication)
    }

    /// Zero both chips' RAM without touching the buffer
    pub fn clear_direct(&mut self) -> Result<(), DisplayError> {
        for chip in 0..2 {
            self.write_ram(chip, &[0; WORDS_PER_CHIP])?;
        }
        Ok(())
    }

    /// Light every LED without touching the buffer
    pub fn lamp_test(&mut self) -> Result<(), DisplayError> {
        for chip in 0..2 {
            self.write_ram(chip, &[0xFFFF; WORDS_PER_CHIP])?;
        }
        Ok(())
    }

    /// Read one chip's RAM back
    pub fn read_ram(&mut self, chip: usize) -> Result<[u16; WORDS_PER_CHIP], DisplayError> {
        let mut raw = [0u8; 2 * WORDS_PER_CHIP];
        let address = self.addresses[chip.min(1)];
        self.i2c
            .write_read(address, &[cmd::RAM_START], &mut raw)
            .map_err(|_| DisplayError::Communication)?;
        let mut words = [0u16; WORDS_PER_CHIP];
        for (word, pair) in words.iter_mut().zip(raw.chunks_exact(2)) {
            *word = u16::from_le_bytes([pair[0], pair[1]]);
        }
        Ok(words)
    }

    /// Frame buffer
    pub fn matrix(&self) -> &BarMatrix {
        &self.matrix
    }

    /// Mutable frame buffer
    pub fn matrix_mut(&mut self) -> &mut BarMatrix {
        &mut self.matrix
    }

    /// `begin` has completed
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Give the bus back
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2cBus> BarSurface for Ht16k33Pair<I2C> {
    type Error = DisplayError;

    fn draw_bar_height(&mut self, bar: usize, height: u8) {
        self.matrix.draw_bar_height(bar, height);
    }

    fn draw_bar_range(&mut self, bar: usize, bottom: u8, top: u8) {
        self.matrix.draw_bar_range(bar, bottom, top);
    }

    fn clear_bar(&mut self, bar: usize) {
        self.matrix.clear_bar(bar);
    }

    fn clear(&mut self) {
        self.matrix.clear();
    }

    fn set_brightness(&mut self, level: u8) -> Result<u8, DisplayError> {
        let level = level.min(MAX_BRIGHTNESS);
        self.apply_brightness(level)?;
        self.brightness = level;
        Ok(level)
    }

    fn set_brightness_immediate(&mut self, level: u8) -> Result<(), DisplayError> {
        self.apply_brightness(level)
    }

    fn brightness(&self) -> u8 {
        self.brightness
    }

    fn set_enabled(&mut self, on: bool) -> Result<(), DisplayError> {
        if on {
            self.on()
        } else {
            self.off()
        }
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        if !self.initialized {
            return Err(DisplayError::NotInitialized);
        }
        let words = *self.matrix.words();
        self.write_ram(0, &words[..WORDS_PER_CHIP])?;
        self.write_ram(1, &words[WORDS_PER_CHIP..])
    }
}
