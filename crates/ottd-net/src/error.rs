//! Session-level error type: the union of everything that can go wrong one
//! layer above the wire codec — malformed framing, a bad schema, or the
//! underlying transport.

use ottd_proto::SchemaError;
use ottd_wire::PacketError;
use thiserror::Error;

/// Failure processing a session event.
#[derive(Error, Debug)]
pub enum SessionError {
    /// A framing-level failure: an impossible length prefix.
    #[error(transparent)]
    Packet(#[from] PacketError),
    /// A family decoder rejected the packet body.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// The underlying transport failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SessionError {
    /// Whether retrying the operation that produced this error might
    /// succeed, as opposed to the connection being unrecoverably broken.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Io(err)
                if matches!(err.kind(), std::io::ErrorKind::WouldBlock | std::io::ErrorKind::Interrupted)
        )
    }
}
