//! DMX UART receive task
//!
//! Every DMX packet starts after a line break, so one `read_to_break`
//! returns one packet: start code first, then the channel slots.

use defmt::*;
use embassy_rp::uart::{Async, ReadToBreakError, UartRx};

use sid_protocol::{DmxPacket, ProtocolError, MAX_PACKET_LEN};

use crate::channels::DMX_PACKET;

/// DMX RX task - receives packets and hands the newest to the drive task
#[embassy_executor::task]
pub async fn dmx_rx_task(mut rx: UartRx<'static, Async>) {
    info!("DMX RX task started");

    let mut buf = [0u8; MAX_PACKET_LEN];

    loop {
        let received = match rx.read_to_break(&mut buf).await {
            Ok(n) => Ok(n),
            // A full universe fills the buffer before the next break
            Err(ReadToBreakError::MissingBreak(n)) => Ok(n),
            Err(ReadToBreakError::Other(e)) => {
                debug!("UART error: {:?}", e);
                Err(ProtocolError::TransportError)
            }
        };

        match received {
            Ok(0) => {}
            Ok(n) => {
                trace!("RX: {} slots", n);
                DMX_PACKET.signal(Ok(DmxPacket::from_slice(&buf[..n])));
            }
            Err(e) => DMX_PACKET.signal(Err(e)),
        }
    }
}
