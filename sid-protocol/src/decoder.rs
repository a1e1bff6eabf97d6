//! Frame decoding, deduplication and link tracking
//!
//! Desks retransmit the whole universe 20-44 times a second even when
//! nothing moves. The decoder compares every accepted footprint with the
//! last one so downstream work only happens on real changes, and watches
//! the packet stream to decide whether a desk is connected at all.

use rand::RngCore;

use crate::footprint::{ChannelSnapshot, Footprint, FOOTPRINT_LEN};
use crate::frame::{DmxLayout, ProtocolError};

/// Time without an accepted packet before the link counts as lost
pub const CONNECTION_TIMEOUT_MS: u32 = 1250;

/// Desk connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// No packet accepted yet, or the stream went quiet
    #[default]
    Disconnected,
    /// Packets are arriving
    Connected,
}

/// Link transitions reported to the drive loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// First packet accepted after a disconnect
    Connected,
    /// Stream quiet for at least [`CONNECTION_TIMEOUT_MS`]
    Lost,
}

/// Result of decoding one accepted packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Decoded {
    /// The accepted footprint
    pub snapshot: ChannelSnapshot,
    /// Footprint differs from the cached one (or a redraw was forced)
    pub changed: bool,
    /// Link transition caused by this packet
    pub link: Option<LinkEvent>,
}

/// Validates packets, deduplicates footprints, tracks the link
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    layout: DmxLayout,
    /// Last accepted footprint bytes
    cache: [u8; FOOTPRINT_LEN],
    /// Cache contents are garbage; next accepted packet is a change
    stale: bool,
    /// Next accepted packet is a change even if identical
    force_next: bool,
    link: LinkState,
    last_accepted_ms: u32,
}

impl FrameDecoder {
    /// Create a decoder with an invalidated cache
    pub fn new<R: RngCore>(layout: DmxLayout, rng: &mut R) -> Self {
        let mut decoder = Self {
            layout,
            cache: [0; FOOTPRINT_LEN],
            stale: true,
            force_next: false,
            link: LinkState::Disconnected,
            last_accepted_ms: 0,
        };
        decoder.invalidate(rng);
        decoder
    }

    /// Decode one packet received at `now_ms`
    ///
    /// Rejected packets leave the cache and link state untouched.
    pub fn decode(&mut self, packet: &[u8], now_ms: u32) -> Result<Decoded, ProtocolError> {
        let window = self.layout.validate(packet)?;

        let link = if self.link == LinkState::Disconnected {
            self.link = LinkState::Connected;
            Some(LinkEvent::Connected)
        } else {
            None
        };
        self.last_accepted_ms = now_ms;

        let changed = self.stale || self.force_next || self.cache[..] != window[..];
        self.cache.copy_from_slice(window);
        self.stale = false;
        self.force_next = false;

        Ok(Decoded {
            snapshot: ChannelSnapshot {
                footprint: Footprint::new(self.cache),
                received_ms: now_ms,
            },
            changed,
            link,
        })
    }

    /// Re-evaluate link liveness
    ///
    /// On timeout the cache is filled with random bytes so the first packet
    /// after reconnecting is always treated as a change.
    pub fn check_timeout<R: RngCore>(&mut self, now_ms: u32, rng: &mut R) -> Option<LinkEvent> {
        if self.link != LinkState::Connected {
            return None;
        }
        if now_ms.wrapping_sub(self.last_accepted_ms) < CONNECTION_TIMEOUT_MS {
            return None;
        }

        self.link = LinkState::Disconnected;
        self.invalidate(rng);
        Some(LinkEvent::Lost)
    }

    /// Report the next accepted packet as changed, even if identical
    pub fn force_update(&mut self) {
        self.force_next = true;
    }

    /// Scramble the cache
    pub fn invalidate<R: RngCore>(&mut self, rng: &mut R) {
        rng.fill_bytes(&mut self.cache);
        self.stale = true;
    }

    /// Current link state
    pub fn link_state(&self) -> LinkState {
        self.link
    }

    /// True while packets are arriving
    pub fn is_connected(&self) -> bool {
        self.link == LinkState::Connected
    }

    /// Layout this decoder reads
    pub fn layout(&self) -> &DmxLayout {
        &self.layout
    }

    /// Last accepted footprint bytes (garbage after invalidation)
    pub fn cached(&self) -> &[u8; FOOTPRINT_LEN] {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::MAX_PACKET_LEN;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(0x51D)
    }

    fn packet(footprint: [u8; FOOTPRINT_LEN]) -> [u8; MAX_PACKET_LEN] {
        let mut packet = [0u8; MAX_PACKET_LEN];
        packet[DmxLayout::default().footprint_range()].copy_from_slice(&footprint);
        packet
    }

    #[test]
    fn test_first_packet_connects_and_changes() {
        let mut rng = rng();
        let mut decoder = FrameDecoder::new(DmxLayout::default(), &mut rng);
        assert_eq!(decoder.link_state(), LinkState::Disconnected);

        let decoded = decoder.decode(&packet([255, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10]), 10).unwrap();
        assert!(decoded.changed);
        assert_eq!(decoded.link, Some(LinkEvent::Connected));
        assert_eq!(decoded.snapshot.received_ms, 10);
        assert_eq!(decoded.snapshot.footprint.master_brightness(), 255);
        assert!(decoder.is_connected());
    }

    #[test]
    fn test_identical_packet_is_unchanged() {
        let mut rng = rng();
        let mut decoder = FrameDecoder::new(DmxLayout::default(), &mut rng);
        let p = packet([100; FOOTPRINT_LEN]);

        assert!(decoder.decode(&p, 0).unwrap().changed);
        let second = decoder.decode(&p, 25).unwrap();
        assert!(!second.changed);
        assert_eq!(second.link, None);
    }

    #[test]
    fn test_single_byte_difference_is_changed() {
        let mut rng = rng();
        let mut decoder = FrameDecoder::new(DmxLayout::default(), &mut rng);
        let mut fp = [100; FOOTPRINT_LEN];
        decoder.decode(&packet(fp), 0).unwrap();
        fp[11] = 101;
        assert!(decoder.decode(&packet(fp), 25).unwrap().changed);
    }

    #[test]
    fn test_rejected_packet_keeps_state() {
        let mut rng = rng();
        let mut decoder = FrameDecoder::new(DmxLayout::default(), &mut rng);
        let good = packet([42; FOOTPRINT_LEN]);
        decoder.decode(&good, 0).unwrap();

        let mut bad = packet([1; FOOTPRINT_LEN]);
        bad[0] = 0x17;
        assert_eq!(
            decoder.decode(&bad, 10),
            Err(ProtocolError::UnrecognizedStartCode(0x17))
        );
        assert_eq!(decoder.cached(), &[42; FOOTPRINT_LEN]);
        assert!(!decoder.decode(&good, 20).unwrap().changed);
    }

    #[test]
    fn test_rejected_packet_does_not_connect() {
        let mut rng = rng();
        let mut decoder = FrameDecoder::new(DmxLayout::new(34, true), &mut rng);
        let p = packet([1; FOOTPRINT_LEN]); // verification slot is 0
        assert_eq!(
            decoder.decode(&p, 0),
            Err(ProtocolError::VerificationFailed { found: 0 })
        );
        assert!(!decoder.is_connected());
    }

    #[test]
    fn test_timeout_disconnects_and_invalidates() {
        let mut rng = rng();
        let mut decoder = FrameDecoder::new(DmxLayout::default(), &mut rng);
        let p = packet([9; FOOTPRINT_LEN]);
        decoder.decode(&p, 1000).unwrap();

        assert_eq!(decoder.check_timeout(999 + CONNECTION_TIMEOUT_MS, &mut rng), None);
        assert!(decoder.is_connected());

        assert_eq!(
            decoder.check_timeout(1000 + CONNECTION_TIMEOUT_MS, &mut rng),
            Some(LinkEvent::Lost)
        );
        assert_eq!(decoder.link_state(), LinkState::Disconnected);
        // Only reported once
        assert_eq!(decoder.check_timeout(5000, &mut rng), None);

        let again = decoder.decode(&p, 6000).unwrap();
        assert!(again.changed);
        assert_eq!(again.link, Some(LinkEvent::Connected));
    }

    #[test]
    fn test_timeout_survives_clock_wrap() {
        let mut rng = rng();
        let mut decoder = FrameDecoder::new(DmxLayout::default(), &mut rng);
        decoder.decode(&packet([3; FOOTPRINT_LEN]), u32::MAX - 100).unwrap();
        assert_eq!(decoder.check_timeout(200, &mut rng), None);
        assert_eq!(decoder.check_timeout(1200, &mut rng), Some(LinkEvent::Lost));
    }

    #[test]
    fn test_force_update_marks_identical_packet() {
        let mut rng = rng();
        let mut decoder = FrameDecoder::new(DmxLayout::default(), &mut rng);
        let p = packet([5; FOOTPRINT_LEN]);
        decoder.decode(&p, 0).unwrap();

        decoder.force_update();
        assert!(decoder.decode(&p, 10).unwrap().changed);
        // Override is one-shot
        assert!(!decoder.decode(&p, 20).unwrap().changed);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn reconnect_after_timeout_always_changes(
                fp in proptest::array::uniform12(any::<u8>()),
                seed in any::<u64>(),
                gap in CONNECTION_TIMEOUT_MS..60_000u32,
            ) {
                let mut rng = SmallRng::seed_from_u64(seed);
                let mut decoder = FrameDecoder::new(DmxLayout::default(), &mut rng);
                let p = packet(fp);
                decoder.decode(&p, 0).unwrap();
                prop_assert_eq!(decoder.check_timeout(gap, &mut rng), Some(LinkEvent::Lost));
                prop_assert!(decoder.decode(&p, gap + 1).unwrap().changed);
            }
        }
    }
}
