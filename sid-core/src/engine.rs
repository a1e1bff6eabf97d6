//! Cooperative drive loop
//!
//! One [`Engine::poll`] is one loop iteration:
//!
//! ```text
//! source.poll ─► decode ─► (changed) interpret ─► apply command
//!                                                     │
//!           check link timeout ◄── render ◄── synth tick (if due)
//! ```
//!
//! All animation and link state is owned here; nothing blocks.

use rand::RngCore;
use sid_protocol::{Decoded, FrameDecoder, LinkEvent, LinkState, ProtocolError};

use crate::config::SidConfig;
use crate::mode::{self, RenderCommand};
use crate::render::BarRenderer;
use crate::synth::{Synthesizer, TickInput};
use crate::traits::{BarSurface, DmxSource};

/// What feeds the synthesizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Drive {
    /// No desk input: idle animation
    Idle,
    /// Speed gauge
    Speed(u8),
    /// A manual or pattern frame is on display; no ticks
    Static,
    /// Master brightness is zero; no ticks
    Off,
}

/// What happened during one loop iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Activity {
    /// Accepted packet
    pub frame: Option<Decoded>,
    /// Link transition
    pub link: Option<LinkEvent>,
    /// Packet dropped, and why
    pub rejected: Option<ProtocolError>,
    /// A frame was flushed to the display
    pub rendered: bool,
}

/// The whole gauge: decoder, synthesizer, renderer
pub struct Engine<R> {
    config: SidConfig,
    decoder: FrameDecoder,
    synth: Synthesizer<R>,
    renderer: BarRenderer,
    drive: Drive,
    display_on: bool,
}

impl<R: RngCore> Engine<R> {
    /// Create an engine in the idle state
    pub fn new(config: SidConfig, mut rng: R) -> Self {
        let decoder = FrameDecoder::new(config.dmx, &mut rng);
        let synth = Synthesizer::new(&config, rng);
        Self {
            config,
            decoder,
            synth,
            renderer: BarRenderer::new(),
            drive: Drive::Idle,
            display_on: true,
        }
    }

    /// Run one loop iteration at `now_ms`
    ///
    /// Protocol errors are reported in the returned [`Activity`]; only
    /// surface errors abort the iteration.
    pub fn poll<D, S>(
        &mut self,
        source: &mut D,
        surface: &mut S,
        now_ms: u32,
    ) -> Result<Activity, S::Error>
    where
        D: DmxSource,
        S: BarSurface,
    {
        let mut activity = Activity::default();
        let mut force = false;

        match source.poll() {
            Ok(Some(packet)) => match self.decoder.decode(packet, now_ms) {
                Ok(decoded) => {
                    activity.link = decoded.link;
                    activity.frame = Some(decoded);
                    if decoded.changed {
                        let command =
                            mode::interpret(&decoded.snapshot.footprint, self.config.mode);
                        let applied = self.apply(command, surface, &mut activity);
                        if applied.is_err() {
                            // Retry the same footprint on the next packet
                            self.decoder.force_update();
                        }
                        force = applied?;
                    }
                }
                Err(e) => activity.rejected = Some(e),
            },
            Ok(None) => {}
            Err(e) => activity.rejected = Some(e),
        }

        let speed = match self.drive {
            Drive::Idle if self.display_on => Some(None),
            Drive::Speed(speed) if self.display_on => Some(Some(speed)),
            _ => None,
        };
        if let Some(speed) = speed {
            let input = TickInput {
                speed,
                now_ms,
                force,
                base_brightness: surface.brightness(),
            };
            if let Some(frame) = self.synth.tick(input) {
                self.renderer.render(surface, &frame)?;
                activity.rendered = true;
            }
        }

        if let Some(event) = self.decoder.check_timeout(now_ms, self.synth.rng_mut()) {
            activity.link = Some(event);
            self.drive = Drive::Idle;
            self.synth.clear_speed();
            if !self.display_on {
                surface.set_enabled(true)?;
                self.display_on = true;
            }
        }

        Ok(activity)
    }

    /// Act on a changed footprint; returns the forced-tick flag
    fn apply<S: BarSurface>(
        &mut self,
        command: RenderCommand,
        surface: &mut S,
        activity: &mut Activity,
    ) -> Result<bool, S::Error> {
        let Some(brightness) = command.brightness() else {
            self.renderer.blank(surface)?;
            surface.set_enabled(false)?;
            self.display_on = false;
            self.drive = Drive::Off;
            return Ok(false);
        };

        if !self.display_on {
            surface.set_enabled(true)?;
            self.display_on = true;
        }
        surface.set_brightness(brightness)?;

        if let Some(frame) = command.static_frame() {
            self.renderer.render(surface, &frame)?;
            activity.rendered = true;
            self.drive = Drive::Static;
            self.synth.clear_speed();
            return Ok(false);
        }

        match command {
            RenderCommand::Speed { speed, force, .. } => {
                self.drive = Drive::Speed(speed);
                Ok(force)
            }
            _ => Ok(false),
        }
    }

    /// Hold the animation baseline in place
    pub fn set_frozen(&mut self, frozen: bool) {
        self.synth.set_frozen(frozen);
    }

    /// Treat the next accepted packet as changed
    pub fn request_redraw(&mut self) {
        self.decoder.force_update();
    }

    /// Current drive source
    pub fn drive(&self) -> Drive {
        self.drive
    }

    /// Desk link state
    pub fn link_state(&self) -> LinkState {
        self.decoder.link_state()
    }

    /// Display enabled
    pub fn is_display_on(&self) -> bool {
        self.display_on
    }

    /// Active configuration
    pub fn config(&self) -> &SidConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OperationMode;
    use crate::frame::BAR_COUNT;
    use crate::render::tests::RecordingSurface;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use sid_protocol::CONNECTION_TIMEOUT_MS;

    const LEN: usize = 47;
    const BASE: usize = 34;

    /// Hands out at most one queued packet per poll
    struct ScriptedSource {
        pending: Option<[u8; LEN]>,
        error: Option<ProtocolError>,
        buf: [u8; LEN],
    }

    impl ScriptedSource {
        fn queue(&mut self, master: u8, effect: u8, columns: [u8; 10]) {
            let mut packet = [0u8; LEN];
            packet[BASE] = master;
            packet[BASE + 1] = effect;
            packet[BASE + 2..BASE + 12].copy_from_slice(&columns);
            self.pending = Some(packet);
        }
    }

    impl Default for ScriptedSource {
        fn default() -> Self {
            Self {
                pending: None,
                error: None,
                buf: [0; LEN],
            }
        }
    }

    impl DmxSource for ScriptedSource {
        fn poll(&mut self) -> Result<Option<&[u8]>, ProtocolError> {
            if let Some(e) = self.error.take() {
                return Err(e);
            }
            match self.pending.take() {
                Some(packet) => {
                    self.buf = packet;
                    Ok(Some(&self.buf[..]))
                }
                None => Ok(None),
            }
        }
    }

    fn engine(mode: OperationMode) -> Engine<SmallRng> {
        let config = SidConfig {
            mode,
            ..SidConfig::DEFAULT
        };
        Engine::new(config, SmallRng::seed_from_u64(0xD3C))
    }

    #[test]
    fn test_idle_runs_without_desk() {
        let mut engine = engine(OperationMode::SpeedWideLoose);
        let mut source = ScriptedSource::default();
        let mut surface = RecordingSurface::default();

        let activity = engine.poll(&mut source, &mut surface, 0).unwrap();
        assert!(activity.rendered);
        assert_eq!(activity.frame, None);
        assert_eq!(engine.drive(), Drive::Idle);
        assert_eq!(engine.link_state(), LinkState::Disconnected);
    }

    #[test]
    fn test_manual_bypasses_synth_in_every_mode() {
        let columns = [255, 0, 128, 0, 0, 0, 0, 0, 0, 255];
        for index in 0..5 {
            let mut engine = engine(OperationMode::from_index(index).unwrap());
            let mut source = ScriptedSource::default();
            let mut surface = RecordingSurface::default();

            source.queue(255, 0, columns);
            let activity = engine.poll(&mut source, &mut surface, 10).unwrap();
            assert!(activity.rendered);
            assert_eq!(activity.link, Some(LinkEvent::Connected));
            assert_eq!(engine.drive(), Drive::Static);
            assert_eq!(surface.columns, [20, 0, 10, 0, 0, 0, 0, 0, 0, 20]);
            assert_eq!(surface.brightness, 15);
        }
    }

    #[test]
    fn test_identical_snapshot_renders_once() {
        let mut engine = engine(OperationMode::SpeedNarrowStrict);
        let mut source = ScriptedSource::default();
        let mut surface = RecordingSurface::default();

        source.queue(200, 0, [100; 10]);
        engine.poll(&mut source, &mut surface, 0).unwrap();
        let flushes = surface.flushes;

        source.queue(200, 0, [100; 10]);
        let activity = engine.poll(&mut source, &mut surface, 25).unwrap();
        assert!(!activity.frame.unwrap().changed);
        assert!(!activity.rendered);
        assert_eq!(surface.flushes, flushes);
    }

    #[test]
    fn test_bus_error_retries_same_footprint() {
        let mut engine = engine(OperationMode::SpeedWideLoose);
        let mut source = ScriptedSource::default();
        let mut surface = RecordingSurface {
            fail_brightness: true,
            ..Default::default()
        };

        source.queue(255, 0, [255; 10]);
        assert!(engine.poll(&mut source, &mut surface, 0).is_err());
        assert_eq!(engine.drive(), Drive::Idle);

        // Desk keeps sending the same bytes
        source.queue(255, 0, [255; 10]);
        let activity = engine.poll(&mut source, &mut surface, 25).unwrap();
        assert!(activity.frame.unwrap().changed);
        assert!(activity.rendered);
        assert_eq!(engine.drive(), Drive::Static);
        assert_eq!(surface.columns, [20; BAR_COUNT]);

        source.queue(255, 0, [255; 10]);
        let activity = engine.poll(&mut source, &mut surface, 50).unwrap();
        assert!(!activity.frame.unwrap().changed);
    }

    #[test]
    fn test_master_zero_darkens() {
        let mut engine = engine(OperationMode::SpeedWideLoose);
        let mut source = ScriptedSource::default();
        let mut surface = RecordingSurface {
            columns: [7; BAR_COUNT],
            enabled: true,
            ..Default::default()
        };

        source.queue(0, 200, [255; 10]);
        engine.poll(&mut source, &mut surface, 100).unwrap();
        assert_eq!(surface.columns, [0; BAR_COUNT]);
        assert!(!surface.enabled);
        assert!(!engine.is_display_on());

        // No animation while dark
        let flushes = surface.flushes;
        for t in 1..10 {
            engine.poll(&mut source, &mut surface, 100 + t * 1000).unwrap();
            source.queue(0, 200, [255; 10]);
        }
        assert_eq!(surface.flushes, flushes);
    }

    #[test]
    fn test_speed_zero_blanks_once() {
        let mut engine = engine(OperationMode::SpeedWideLoose);
        let mut source = ScriptedSource::default();
        let mut surface = RecordingSurface::default();

        // 121 / 2.87 = 42
        source.queue(255, 121, [0; 10]);
        engine.poll(&mut source, &mut surface, 1000).unwrap();
        assert_eq!(engine.drive(), Drive::Speed(42));

        // 1 / 2.87 = 0
        source.queue(255, 1, [0; 10]);
        let activity = engine.poll(&mut source, &mut surface, 1500).unwrap();
        assert!(activity.rendered);
        assert_eq!(surface.columns, [0; BAR_COUNT]);
        let flushes = surface.flushes;

        for t in [2000, 2500, 3000] {
            source.queue(255, 1, [0; 10]);
            let activity = engine.poll(&mut source, &mut surface, t).unwrap();
            assert!(!activity.rendered);
        }
        assert_eq!(surface.flushes, flushes);
    }

    #[test]
    fn test_timeout_resumes_idle_and_invalidates() {
        let mut engine = engine(OperationMode::SpeedWideLoose);
        let mut source = ScriptedSource::default();
        let mut surface = RecordingSurface::default();

        source.queue(0, 0, [0; 10]);
        engine.poll(&mut source, &mut surface, 1000).unwrap();
        assert!(!engine.is_display_on());

        let activity = engine
            .poll(&mut source, &mut surface, 1001 + CONNECTION_TIMEOUT_MS)
            .unwrap();
        assert_eq!(activity.link, Some(LinkEvent::Lost));
        assert_eq!(engine.drive(), Drive::Idle);
        assert!(engine.is_display_on());
        assert!(surface.enabled);

        // Same bytes again count as a change after the reconnect
        source.queue(0, 0, [0; 10]);
        let activity = engine.poll(&mut source, &mut surface, 5000).unwrap();
        let frame = activity.frame.unwrap();
        assert!(frame.changed);
        assert_eq!(frame.link, Some(LinkEvent::Connected));
        assert_eq!(engine.drive(), Drive::Off);
    }

    #[test]
    fn test_rejected_packets_are_reported() {
        let mut engine = engine(OperationMode::SpeedWideLoose);
        let mut source = ScriptedSource::default();
        let mut surface = RecordingSurface::default();

        source.queue(255, 0, [0; 10]);
        if let Some(packet) = source.pending.as_mut() {
            packet[0] = 0xCC;
        }
        let activity = engine.poll(&mut source, &mut surface, 0).unwrap();
        assert_eq!(
            activity.rejected,
            Some(ProtocolError::UnrecognizedStartCode(0xCC))
        );
        assert_eq!(engine.link_state(), LinkState::Disconnected);

        source.error = Some(ProtocolError::TransportError);
        let activity = engine.poll(&mut source, &mut surface, 10).unwrap();
        assert_eq!(activity.rejected, Some(ProtocolError::TransportError));
        assert_eq!(engine.drive(), Drive::Idle);
    }

    #[test]
    fn test_request_redraw_reapplies_identical_packet() {
        let mut engine = engine(OperationMode::SpeedWideLoose);
        let mut source = ScriptedSource::default();
        let mut surface = RecordingSurface::default();

        source.queue(255, 0, [50; 10]);
        engine.poll(&mut source, &mut surface, 0).unwrap();

        engine.request_redraw();
        source.queue(255, 0, [50; 10]);
        let activity = engine.poll(&mut source, &mut surface, 20).unwrap();
        assert!(activity.rendered);
    }

    #[test]
    fn test_near_top_speed_forces_tick() {
        let mut engine = engine(OperationMode::SpeedWideLoose);
        let mut source = ScriptedSource::default();
        let mut surface = RecordingSurface::default();

        source.queue(255, 240, [0; 10]);
        assert!(engine.poll(&mut source, &mut surface, 1000).unwrap().rendered);
        // Within the 500 ms gate, but the speed is above the force threshold
        source.queue(255, 250, [0; 10]);
        assert!(engine.poll(&mut source, &mut surface, 1100).unwrap().rendered);
        // Unchanged packets do not force
        source.queue(255, 250, [0; 10]);
        assert!(!engine.poll(&mut source, &mut surface, 1200).unwrap().rendered);
    }
}
