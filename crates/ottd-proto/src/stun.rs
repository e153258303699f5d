//! The STUN family: a single client/server result packet used to coordinate
//! a STUN hole-punching attempt brokered by the coordinator.

use ottd_wire::Cursor;

use crate::{error::SchemaError, family::Family};

/// STUN family packet type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PacketStunType {
    /// Either peer reports its STUN-visible address.
    SercliStun = 0,
}

/// One past the highest valid tag in the STUN family.
pub const END: u8 = 1;

/// A decoded STUN family message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StunMessage {
    /// `SERCLI_STUN`.
    SercliStun {
        /// Negotiated protocol version, `3..=6`.
        protocol_version: u8,
        /// Connection attempt token shared with the coordinator.
        token: String,
        /// Which local interface this STUN attempt is for.
        interface_number: u8,
    },
}

/// Zero-sized marker binding the STUN family's tag space to its decoder.
#[derive(Debug, Clone, Copy)]
pub struct Stun;

impl Family for Stun {
    type Message = StunMessage;
    const END: u8 = END;

    fn decode(tag: u8, body: &[u8]) -> Result<Self::Message, SchemaError> {
        let mut cursor = Cursor::new(body);
        let message = match tag {
            t if t == PacketStunType::SercliStun as u8 => {
                let protocol_version = cursor.read_u8()?;
                if !(3..=6).contains(&protocol_version) {
                    return Err(SchemaError::invalid_data(
                        "unknown protocol version",
                        u64::from(protocol_version),
                    ));
                }
                let token = cursor.read_string()?;
                let interface_number = cursor.read_u8()?;
                StunMessage::SercliStun { protocol_version, token, interface_number }
            },
            _ => return Err(SchemaError::Packet(ottd_wire::PacketError::PacketInvalidType { tag })),
        };
        cursor.finish()?;
        Ok(message)
    }
}
