//! SID-DMX - Spectral Indicator Display Firmware
//!
//! Main firmware binary for RP2040-based SID bar displays. The fixture
//! listens on a DMX512 universe and drives a 10x20 LED bar matrix through
//! two HT16K33 controllers.
//!
//! Two tasks do the work:
//! - `dmx_rx_task` receives break-delimited packets from the UART
//! - `drive_task` runs the engine: decode, animate, render

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::i2c::{Config as I2cBusConfig, I2c};
use embassy_rp::peripherals::UART1;
use embassy_rp::uart::{InterruptHandler as UartInterruptHandler, UartRx};
use embassy_time::{Delay, Instant, Timer};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use {defmt_rtt as _, panic_probe as _};

use sid_core::Engine;
use sid_display::{end_waiting, show_failure, show_waiting, Ht16k33Pair, DEFAULT_ADDRESSES};
use sid_hal::I2cConfig;

use crate::board::{dmx_uart_config, HalI2c, StatusLed};
use crate::config::SID_CONFIG;

mod board;
mod channels;
mod tasks;

mod config {
    //! Build-time configuration from sid.toml
    use sid_core::config::{IdleProfile, OperationMode, SidConfig, SmoothingPolicy, StrictSequence};
    use sid_protocol::DmxLayout;

    include!(concat!(env!("OUT_DIR"), "/sid_config.rs"));
}

bind_interrupts!(struct Irqs {
    UART1_IRQ => UartInterruptHandler<UART1>;
});

/// How long the hourglass stays up while the receiver starts
const WAITING_MS: u64 = 1000;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("SID-DMX firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Feedback LED, off until something goes wrong
    let mut led = StatusLed::new(Output::new(p.PIN_25, Level::Low));

    // Matrix controllers on I2C0 (SDA=GPIO4, SCL=GPIO5)
    let mut i2c_config = I2cBusConfig::default();
    i2c_config.frequency = I2cConfig::FAST.frequency;
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c_config);
    let mut display = Ht16k33Pair::new(HalI2c::new(i2c), DEFAULT_ADDRESSES);

    if let Err(e) = display.begin() {
        error!("Display init failed: {:?}", e);
        halt(&mut led).await;
    }
    info!("Display initialized");

    if let Err(e) = SID_CONFIG.validate() {
        error!("Invalid configuration: {:?}", e);
        halt(&mut led).await;
    }
    info!(
        "Config: mode={:?} idle={:?} base channel={} verify={}",
        SID_CONFIG.mode, SID_CONFIG.idle, SID_CONFIG.dmx.base_channel, SID_CONFIG.dmx.verify
    );

    if let Err(e) = show_waiting(&mut display) {
        warn!("Waiting indicator failed: {:?}", e);
    }

    // DMX receiver on UART1 (RX=GPIO9), 250 kbaud 8N2
    let rx = UartRx::new(p.UART1, p.PIN_9, Irqs, p.DMA_CH0, dmx_uart_config());
    info!("UART initialized for DMX reception");

    spawner.spawn(tasks::dmx_rx_task(rx)).unwrap();

    Timer::after_millis(WAITING_MS).await;
    if let Err(e) = end_waiting(&mut display) {
        warn!("Failed to clear waiting indicator: {:?}", e);
    }

    let rng = SmallRng::seed_from_u64(Instant::now().as_ticks());
    let engine = Engine::new(SID_CONFIG, rng);

    spawner.spawn(tasks::drive_task(engine, display)).unwrap();

    info!("All tasks spawned, firmware running");

    // Main task has nothing else to do - all work happens in spawned tasks
    loop {
        Timer::after_secs(60).await;
    }
}

/// Blink the failure pattern forever
async fn halt(led: &mut StatusLed) -> ! {
    loop {
        show_failure(led, &mut Delay);
        Timer::after_secs(2).await;
    }
}
