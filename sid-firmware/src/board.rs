//! Board glue: embassy-rp peripherals behind the sid-hal traits

use embassy_rp::gpio::Output;
use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_rp::uart::{Config as UartConfig, DataBits, Parity, StopBits};
use sid_display::Ht16k33Pair;
use sid_hal::{I2cBus, OutputPin};

/// DMX512 line rate
pub const DMX_BAUDRATE: u32 = 250_000;

/// 250 kbaud, 8 data bits, no parity, 2 stop bits
pub fn dmx_uart_config() -> UartConfig {
    let mut config = UartConfig::default();
    config.baudrate = DMX_BAUDRATE;
    config.data_bits = DataBits::DataBits8;
    config.parity = Parity::ParityNone;
    config.stop_bits = StopBits::STOP2;
    config
}

/// Any embedded-hal I2C master as an [`I2cBus`]
pub struct HalI2c<T>(T);

impl<T> HalI2c<T> {
    /// Wrap an I2C master
    pub fn new(inner: T) -> Self {
        Self(inner)
    }
}

impl<T: embedded_hal::i2c::I2c> I2cBus for HalI2c<T> {
    type Error = T::Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        embedded_hal::i2c::I2c::write(&mut self.0, address, data)
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        embedded_hal::i2c::I2c::write_read(&mut self.0, address, write_data, read_buf)
    }
}

/// The matrix as wired on this board
pub type Display = Ht16k33Pair<HalI2c<I2c<'static, I2C0, Blocking>>>;

/// Feedback LED
pub struct StatusLed {
    pin: Output<'static>,
}

impl StatusLed {
    /// Wrap the LED output, already configured low
    pub fn new(pin: Output<'static>) -> Self {
        Self { pin }
    }
}

impl OutputPin for StatusLed {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}
