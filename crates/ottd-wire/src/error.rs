//! Error taxonomy for the wire codec.
//!
//! Every variant carries the value that caused the failure rather than a
//! pre-formatted string, so callers can match on structured data and so
//! nothing is lost translating a failure into a log line.

use thiserror::Error;

/// A malformed or oversized packet.
///
/// `PacketInvalidSize`, `PacketInvalidType`, `PacketTooBig`, `PacketTooShort`
/// and `PacketInvalidData` together form the `PacketInvalid` family; callers
/// that only care "was this packet garbage" can match `_` against all five.
/// `SocketClosed` is orthogonal: a transport-observed close surfaced through
/// the same error type so a single `Result` can flow from send through the
/// session layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PacketError {
    /// Header length did not match the delivered body length.
    #[error("packet invalid size: header declared {declared} bytes, body was {actual} bytes")]
    PacketInvalidSize {
        /// Total length the header claimed, including the 2-byte length field.
        declared: usize,
        /// Actual number of bytes in the delivered packet, including the header.
        actual: usize,
    },

    /// Type tag was at or past the family's `END` sentinel, or has no decoder.
    #[error("packet invalid type: tag {tag} is not a recognized packet type")]
    PacketInvalidType {
        /// The offending tag byte.
        tag: u8,
    },

    /// Outbound packet exceeds the family's MTU ceiling.
    #[error("packet too big: {size} bytes exceeds ceiling of {max_size} bytes")]
    PacketTooBig {
        /// Size of the packet that was rejected.
        size: usize,
        /// The MTU ceiling that was exceeded.
        max_size: usize,
    },

    /// A reader ran off the end of the slice.
    #[error("packet too short: needed {needed} more bytes, {available} remained")]
    PacketTooShort {
        /// Number of bytes the reader needed to complete its read.
        needed: usize,
        /// Number of bytes actually remaining in the slice.
        available: usize,
    },

    /// Semantic validation failed: bad enum value, unknown version, trailing
    /// bytes after the declared fields, or invalid UTF-8 in a string.
    #[error("packet invalid data: {reason} (value: {value})")]
    PacketInvalidData {
        /// What was being validated.
        reason: &'static str,
        /// The offending value, widened to `u64`.
        value: u64,
    },

    /// The consumer observed the peer close the socket during a write.
    #[error("socket closed")]
    SocketClosed,
}

impl PacketError {
    /// Build a [`PacketError::PacketInvalidData`], widening the offending value to `u64`.
    pub fn invalid_data(reason: &'static str, value: u64) -> Self {
        Self::PacketInvalidData { reason, value }
    }
}
