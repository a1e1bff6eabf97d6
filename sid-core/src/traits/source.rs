//! DMX packet source trait

use sid_protocol::ProtocolError;

/// Non-blocking supplier of received DMX packets
pub trait DmxSource {
    /// Take the next received packet, if any
    ///
    /// Returns `Ok(Some(slots))` with the start code at index 0,
    /// `Ok(None)` if nothing arrived since the last poll, or
    /// `Err(ProtocolError::TransportError)` if the receiver reported a
    /// framing error.
    fn poll(&mut self) -> Result<Option<&[u8]>, ProtocolError>;
}
