//! Splits a byte stream into `(tag, body)` packets per the common
//! length-prefixed envelope every protocol family shares: `[u16 length][u8
//! tag][body]`, where `length` counts itself.

use ottd_wire::PacketError;

/// Buffers partial reads and yields complete `(tag, body)` packets as
/// enough bytes arrive.
///
/// Equivalent to the source's `receive_data`, but returns fully-owned
/// packet bodies instead of queueing raw slices for a second parsing pass.
#[derive(Debug, Default)]
pub struct Framer {
    buf: Vec<u8>,
}

impl Framer {
    /// An empty framer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed newly received bytes, returning every packet that became
    /// complete as a result.
    ///
    /// # Errors
    ///
    /// Returns [`PacketError::PacketInvalidSize`] if a length prefix is
    /// smaller than 2 (it could never describe a real packet, since the
    /// prefix counts itself) — the source treats this as unrecoverable and
    /// closes the connection; callers here should do the same.
    pub fn feed(&mut self, data: &[u8]) -> Result<Vec<(u8, Vec<u8>)>, PacketError> {
        self.buf.extend_from_slice(data);

        let mut packets = Vec::new();
        let mut offset = 0;

        while self.buf.len() - offset > 2 {
            let length = u16::from_le_bytes([self.buf[offset], self.buf[offset + 1]]) as usize;

            if length < 2 {
                tracing::warn!(declared = length, "rejecting impossible length prefix, closing connection");
                return Err(PacketError::PacketInvalidSize { declared: length, actual: self.buf.len() - offset });
            }

            if self.buf.len() - offset < length {
                break;
            }

            let tag = self.buf[offset + 2];
            let body = self.buf[offset + 3..offset + length].to_vec();
            packets.push((tag, body));
            offset += length;
        }

        self.buf.drain(0..offset);
        Ok(packets)
    }
}
