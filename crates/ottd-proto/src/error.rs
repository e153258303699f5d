//! Schema-level error type.
//!
//! Every failure a family decoder can produce is already a member of the
//! `PacketInvalid` family from `ottd-wire` (bad enum value, unknown version,
//! trailing bytes — all `PacketInvalidData`; short reads are `PacketTooShort`).
//! This type exists as the schema layer's own error so call sites depend on
//! `ottd_proto::SchemaError` rather than reaching into `ottd_wire` directly,
//! without inventing variants that don't occur.

use ottd_wire::PacketError;
use thiserror::Error;

/// Failure decoding or encoding a family message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A wire-codec failure: malformed size, unknown tag, short read, or
    /// invalid semantic data.
    #[error(transparent)]
    Packet(#[from] PacketError),
}

impl SchemaError {
    /// Build a [`PacketError::PacketInvalidData`]-backed [`SchemaError`].
    pub fn invalid_data(reason: &'static str, value: u64) -> Self {
        Self::Packet(PacketError::invalid_data(reason, value))
    }
}
