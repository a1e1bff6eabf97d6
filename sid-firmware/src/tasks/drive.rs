//! Drive task
//!
//! Runs the engine at a fixed cadence and logs what each iteration did.

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};
use rand::rngs::SmallRng;

use sid_core::{Activity, DmxSource, Engine};
use sid_protocol::{DmxPacket, LinkEvent, ProtocolError};

use crate::board::Display;
use crate::channels::DMX_PACKET;

/// Drive loop period in milliseconds
pub const DRIVE_INTERVAL_MS: u64 = 2;

/// [`DmxSource`] fed by the receive task
struct SignalSource {
    packet: DmxPacket,
}

impl SignalSource {
    const fn new() -> Self {
        Self {
            packet: DmxPacket::new(),
        }
    }
}

impl DmxSource for SignalSource {
    fn poll(&mut self) -> Result<Option<&[u8]>, ProtocolError> {
        match DMX_PACKET.try_take() {
            Some(Ok(packet)) => {
                self.packet = packet;
                Ok(Some(self.packet.as_slice()))
            }
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }
}

/// Drive task - owns the engine and the display
#[embassy_executor::task]
pub async fn drive_task(mut engine: Engine<SmallRng>, mut display: Display) {
    let config = engine.config();
    info!(
        "Drive task started: mode={:?} sequence={:?} footprint at {}",
        config.mode, config.sequence, config.dmx.base_channel
    );

    let mut source = SignalSource::new();
    let mut ticker = Ticker::every(Duration::from_millis(DRIVE_INTERVAL_MS));

    loop {
        ticker.next().await;

        let now_ms = Instant::now().as_millis() as u32;
        match engine.poll(&mut source, &mut display, now_ms) {
            Ok(activity) => log_activity(&engine, &activity),
            Err(e) => warn!("Display error: {:?}", e),
        }
    }
}

fn log_activity(engine: &Engine<SmallRng>, activity: &Activity) {
    match activity.link {
        Some(LinkEvent::Connected) => info!("DMX link up"),
        Some(LinkEvent::Lost) => info!("DMX link lost, idling"),
        None => {}
    }

    if let Some(e) = activity.rejected {
        warn!("Dropped packet: {:?}", e);
    }

    if let Some(frame) = activity.frame.filter(|f| f.changed) {
        let footprint = frame.snapshot.footprint;
        debug!(
            "Footprint: master={} effect={} drive={:?}",
            footprint.master_brightness(),
            footprint.effect(),
            engine.drive()
        );
    }

    if activity.rendered {
        trace!("Rendered frame");
    }
}
